//! Assume-role trust documents
//!
//! IAM stores a one-element principal list as a bare string. Documents built
//! here follow the same convention so that a freshly built document diffs
//! clean against what IAM hands back.

use crate::Document;
use serde_json::{Map, Value, json};

/// IAM policy language version used for every generated document
pub const POLICY_VERSION: &str = "2012-10-17";

const ASSUME_ROLE: &str = "sts:AssumeRole";

/// ARN of the account root principal
pub fn root_arn(account_number: &str) -> String {
    format!("arn:aws:iam::{account_number}:root")
}

/// Store a one-element list as its single value, any other list as an array.
pub fn collapse_singleton(items: &[String]) -> Value {
    match items {
        [only] => Value::String(only.clone()),
        many => Value::Array(many.iter().cloned().map(Value::String).collect()),
    }
}

/// Inverse of [`collapse_singleton`].
pub fn expand_singleton(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Build the trust document for a role.
///
/// The first statement trusts `principals` (the account root when empty),
/// optionally gated on MFA. A second statement trusting `services` is
/// appended only when `services` is non-empty.
pub fn build_trust_document(
    mfa_required: bool,
    principals: &[String],
    services: &[String],
    account_number: &str,
) -> Document {
    let principals = if principals.is_empty() {
        vec![root_arn(account_number)]
    } else {
        principals.to_vec()
    };

    let mut accounts = Map::new();
    accounts.insert("Effect".into(), json!("Allow"));
    accounts.insert("Action".into(), json!(ASSUME_ROLE));
    accounts.insert(
        "Principal".into(),
        json!({ "AWS": collapse_singleton(&principals) }),
    );
    if mfa_required {
        accounts.insert(
            "Condition".into(),
            json!({ "Bool": { "aws:MultiFactorAuthPresent": "true" } }),
        );
    }

    let mut statements = vec![Value::Object(accounts)];
    if !services.is_empty() {
        statements.push(json!({
            "Effect": "Allow",
            "Action": ASSUME_ROLE,
            "Principal": { "Service": collapse_singleton(services) }
        }));
    }

    json!({
        "Version": POLICY_VERSION,
        "Statement": statements
    })
}

/// Collapse one-element `Principal` lists in every statement, in place.
///
/// Applied to live trust documents before diffing so that a remote side
/// which returns `["arn"]` compares equal to a generated `"arn"`.
pub fn collapse_singleton_principals(doc: &mut Document) {
    let Some(statements) = doc.get_mut("Statement") else {
        return;
    };
    let statements: Vec<&mut Value> = match statements {
        Value::Array(items) => items.iter_mut().collect(),
        other if other.is_object() => vec![other],
        _ => return,
    };
    for statement in statements {
        let Some(Value::Object(principal)) = statement.get_mut("Principal") else {
            continue;
        };
        for value in principal.values_mut() {
            if let Value::Array(items) = value {
                if items.len() == 1 {
                    *value = items.remove(0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::documents_equal;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_trust_document_trusts_account_root() {
        let doc = build_trust_document(false, &[], &[], "123456789012");
        let expected: Value = serde_json::from_str(
            r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"sts:AssumeRole","Principal":{"AWS":"arn:aws:iam::123456789012:root"}}]}"#,
        )
        .unwrap();
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_mfa_condition_added() {
        let doc = build_trust_document(true, &[], &[], "1");
        assert_eq!(
            doc["Statement"][0]["Condition"]["Bool"]["aws:MultiFactorAuthPresent"],
            json!("true")
        );
    }

    #[test]
    fn test_multiple_principals_stay_a_list() {
        let principals = strings(&["arn:aws:iam::1:root", "arn:aws:iam::2:root"]);
        let doc = build_trust_document(false, &principals, &[], "1");
        assert_eq!(
            doc["Statement"][0]["Principal"]["AWS"],
            json!(["arn:aws:iam::1:root", "arn:aws:iam::2:root"])
        );
    }

    #[test]
    fn test_service_statement_only_when_services_present() {
        let doc = build_trust_document(false, &[], &strings(&["ec2.amazonaws.com"]), "1");
        let statements = doc["Statement"].as_array().unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1]["Principal"]["Service"], json!("ec2.amazonaws.com"));

        let without = build_trust_document(false, &[], &[], "1");
        assert_eq!(without["Statement"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_singleton_round_trip() {
        let one = strings(&["arn:aws:iam::1:role/x"]);
        let collapsed = collapse_singleton(&one);
        assert_eq!(collapsed, json!("arn:aws:iam::1:role/x"));
        assert_eq!(expand_singleton(&collapsed), one);

        let two = strings(&["a", "b"]);
        assert_eq!(expand_singleton(&collapse_singleton(&two)), two);
    }

    #[test]
    fn test_live_list_of_one_normalizes_to_generated_form() {
        let generated = build_trust_document(false, &strings(&["arn:aws:iam::7:root"]), &[], "7");
        let mut live = json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Action": "sts:AssumeRole",
                "Principal": {"AWS": ["arn:aws:iam::7:root"]}
            }]
        });
        assert!(!documents_equal(&live, &generated));

        collapse_singleton_principals(&mut live);
        assert!(documents_equal(&live, &generated));
    }
}
