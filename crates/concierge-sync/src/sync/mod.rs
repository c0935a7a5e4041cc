//! Resource synchronizers
//!
//! One module per configuration section. Each takes the raw records of its
//! section plus the gateways it needs, and returns a [`SectionReport`].
//! Failures never cross a record boundary: a validation error becomes the
//! record's only entry, a service error is appended after whatever the
//! record already did.
//!
//! [`SectionReport`]: concierge_common::SectionReport

pub mod account;
pub mod alarms;
pub mod attachments;
pub mod buckets;
pub mod groups;
pub mod managed_policy;
pub mod roles;
pub mod topics;
pub mod trails;

use crate::aws::error::AwsError;
use concierge_common::{ActionReport, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Deserialize one raw record into its typed form.
pub(crate) fn parse_record<T: DeserializeOwned>(
    kind: &str,
    raw: &Value,
) -> Result<T, ValidationError> {
    serde_json::from_value(raw.clone())
        .map_err(|e| ValidationError::Invalid(format!("{kind} record {raw} is invalid: {e}")))
}

/// Append a service error to the record's report.
pub(crate) fn record_outcome(report: &mut ActionReport, subject: &str, result: Result<(), AwsError>) {
    if let Err(e) = result {
        warn!(subject = %subject, error = %e, "Service error, skipping rest of record");
        report.error(e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BucketRecord;
    use concierge_common::ActionKind;
    use serde_json::json;

    #[test]
    fn test_parse_record_reports_raw_record() {
        let raw = json!({"name": "b", "prefixes": "not-a-list"});
        let err = parse_record::<BucketRecord>("bucket", &raw).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid(_)));
        assert!(err.to_string().contains("not-a-list"));
    }

    #[test]
    fn test_record_outcome_keeps_earlier_actions() {
        let mut report = ActionReport::new();
        report.created("Created role");
        record_outcome(&mut report, "r", Err(AwsError::Throttled));

        assert_eq!(report.entries().len(), 2);
        assert_eq!(report.count(ActionKind::Error), 1);
        assert_eq!(report.render(), "Created role Rate limit exceeded");
    }
}
