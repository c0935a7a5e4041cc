//! Set reconciliation between desired and current identifier collections
//!
//! Used for managed-policy attachments, inline-policy names and SNS
//! subscriber endpoints.

use std::collections::HashSet;
use std::hash::Hash;

/// Identifiers to add and remove to turn `current` into `desired`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDelta<T> {
    /// `desired − current`, in desired order
    pub to_add: Vec<T>,
    /// `current − desired`, in current order
    pub to_remove: Vec<T>,
}

impl<T> SetDelta<T> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

impl<T> Default for SetDelta<T> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_remove: Vec::new(),
        }
    }
}

/// Compute `(desired − current, current − desired)`.
///
/// Both inputs may contain duplicates; each identifier appears at most once
/// in the output.
pub fn reconcile<T, C, D>(current: C, desired: D) -> SetDelta<T>
where
    T: Eq + Hash + Clone,
    C: IntoIterator<Item = T>,
    D: IntoIterator<Item = T>,
{
    let current = dedup(current);
    let desired = dedup(desired);

    let current_set: HashSet<&T> = current.iter().collect();
    let desired_set: HashSet<&T> = desired.iter().collect();

    let to_add = desired
        .iter()
        .filter(|id| !current_set.contains(id))
        .cloned()
        .collect();
    let to_remove = current
        .iter()
        .filter(|id| !desired_set.contains(id))
        .cloned()
        .collect();

    SetDelta { to_add, to_remove }
}

fn dedup<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
