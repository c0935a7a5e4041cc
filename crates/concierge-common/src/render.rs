//! Placeholder expansion for policy templates
//!
//! Templates carry literal tokens that must be resolved before a document is
//! used as the desired side of a diff.

use crate::Document;
use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;

/// Token replaced with the 12-digit account number
pub const ACCOUNT_NUMBER_TOKEN: &str = "ACCOUNTNUMBER";

/// Token replaced with the bucket name when one is supplied
pub const BUCKET_NAME_TOKEN: &str = "BUCKETNAME";

/// Values substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitutions {
    pub account_number: String,
    pub bucket_name: Option<String>,
}

impl Substitutions {
    pub fn new(account_number: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            bucket_name: None,
        }
    }

    pub fn with_bucket(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    fn apply(&self, text: &str) -> String {
        let text = text.replace(ACCOUNT_NUMBER_TOKEN, &self.account_number);
        match &self.bucket_name {
            Some(bucket) => text.replace(BUCKET_NAME_TOKEN, bucket),
            None => text,
        }
    }
}

/// Replace tokens inside every string value of `raw`.
///
/// Object keys are left untouched.
pub fn render(raw: Document, subs: &Substitutions) -> Document {
    match raw {
        Value::String(s) => Value::String(subs.apply(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| render(v, subs)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, render(v, subs)))
                .collect(),
        ),
        other => other,
    }
}

/// Parse `text` as JSON and render it.
pub fn render_str(text: &str, subs: &Substitutions) -> Result<Document, ConfigError> {
    let raw: Document =
        serde_json::from_str(text).map_err(|e| ConfigError::template("<inline>", e))?;
    Ok(render(raw, subs))
}

/// Read, parse and render a template file.
pub fn render_file(path: &Path, subs: &Substitutions) -> Result<Document, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
    let raw: Document = serde_json::from_str(&text)
        .map_err(|e| ConfigError::template(path.display().to_string(), e))?;
    Ok(render(raw, subs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BUCKET_POLICY: &str = r#"{
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": {"AWS": "arn:aws:iam::ACCOUNTNUMBER:root"},
            "Action": "s3:GetObject",
            "Resource": ["arn:aws:s3:::BUCKETNAME/*", "arn:aws:s3:::BUCKETNAME"]
        }]
    }"#;

    #[test]
    fn test_tokens_replaced_inside_strings() {
        let subs = Substitutions::new("123456789012").with_bucket("logs-bucket");
        let doc = render_str(BUCKET_POLICY, &subs).unwrap();

        assert_eq!(
            doc["Statement"][0]["Principal"]["AWS"],
            json!("arn:aws:iam::123456789012:root")
        );
        assert_eq!(
            doc["Statement"][0]["Resource"],
            json!(["arn:aws:s3:::logs-bucket/*", "arn:aws:s3:::logs-bucket"])
        );
    }

    #[test]
    fn test_bucket_token_left_when_no_bucket() {
        let subs = Substitutions::new("123456789012");
        let doc = render_str(BUCKET_POLICY, &subs).unwrap();
        assert_eq!(
            doc["Statement"][0]["Resource"][0],
            json!("arn:aws:s3:::BUCKETNAME/*")
        );
    }

    #[test]
    fn test_keys_and_scalars_untouched() {
        let subs = Substitutions::new("1");
        let doc = render(json!({"ACCOUNTNUMBER": 5, "flag": true}), &subs);
        assert_eq!(doc, json!({"ACCOUNTNUMBER": 5, "flag": true}));
    }

    #[test]
    fn test_render_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"PolicyName": "x", "arn": "arn:aws:iam::ACCOUNTNUMBER:policy/x"}}"#)
            .unwrap();

        let doc = render_file(file.path(), &Substitutions::new("999")).unwrap();
        assert_eq!(doc["arn"], json!("arn:aws:iam::999:policy/x"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = render_file(Path::new("/nonexistent/policy.json"), &Substitutions::new("1"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_json_is_template_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = render_file(file.path(), &Substitutions::new("1")).unwrap_err();
        assert!(matches!(err, ConfigError::Template { .. }));
    }
}
