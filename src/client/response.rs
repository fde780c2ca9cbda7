use serde_json::Value;

use super::error::CheckError;

/// Maximum body length quoted in error messages
const BODY_SNIPPET_LEN: usize = 200;

/// A fully-read HTTP response snapshot.
///
/// The body is read eagerly so that failure messages can always quote it,
/// and parsed as JSON opportunistically (error pages are often plain text).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub text: String,
    body: Option<Value>,
}

impl ApiResponse {
    pub fn from_parts(status: u16, text: String) -> Self {
        let body = serde_json::from_str(&text).ok();
        Self { status, text, body }
    }

    /// Assert the status code, consuming self so checks chain naturally.
    pub fn expect_status(self, expected: u16) -> Result<Self, CheckError> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(CheckError::UnexpectedStatus {
                expected,
                actual: self.status,
                body: snippet(&self.text),
            })
        }
    }

    /// The parsed JSON body, or an error quoting the raw text.
    pub fn json(&self) -> Result<&Value, CheckError> {
        self.body
            .as_ref()
            .ok_or_else(|| CheckError::NotJson(snippet(&self.text)))
    }

    /// The body as a JSON array.
    pub fn array(&self) -> Result<&Vec<Value>, CheckError> {
        self.json()?
            .as_array()
            .ok_or_else(|| CheckError::Assertion("response body is not an array".into()))
    }

    pub fn require(&self, field: &str) -> Result<&Value, CheckError> {
        require_field(self.json()?, field)
    }

    pub fn require_str(&self, field: &str) -> Result<&str, CheckError> {
        self.require(field)?
            .as_str()
            .ok_or_else(|| CheckError::BadField {
                field: field.to_string(),
                detail: "expected a string".into(),
            })
    }

    pub fn require_u64(&self, field: &str) -> Result<u64, CheckError> {
        self.require(field)?
            .as_u64()
            .ok_or_else(|| CheckError::BadField {
                field: field.to_string(),
                detail: "expected an integer".into(),
            })
    }

    /// Clone of the parsed body, for attaching to a case record.
    pub fn snapshot(&self) -> Option<Value> {
        self.body.clone()
    }
}

/// Field lookup on any JSON value (used when walking arrays of objects too).
pub fn require_field<'a>(value: &'a Value, field: &str) -> Result<&'a Value, CheckError> {
    value
        .get(field)
        .ok_or_else(|| CheckError::MissingField(field.to_string()))
}

/// String field lookup; yields the bare string, not its JSON rendering.
pub fn require_str_field<'a>(value: &'a Value, field: &str) -> Result<&'a str, CheckError> {
    require_field(value, field)?
        .as_str()
        .ok_or_else(|| CheckError::BadField {
            field: field.to_string(),
            detail: "expected a string".into(),
        })
}

fn snippet(text: &str) -> String {
    if text.len() <= BODY_SNIPPET_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(BODY_SNIPPET_LEN).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resp(status: u16, body: &str) -> ApiResponse {
        ApiResponse::from_parts(status, body.to_string())
    }

    #[test]
    fn test_expect_status_pass() {
        let r = resp(200, r#"{"message":"ok"}"#);
        assert!(r.expect_status(200).is_ok());
    }

    #[test]
    fn test_expect_status_mismatch_quotes_body() {
        let err = resp(500, "boom").expect_status(200).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expected status 200"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_require_str() {
        let r = resp(200, r#"{"message":"hello"}"#);
        assert_eq!(r.require_str("message").unwrap(), "hello");
    }

    #[test]
    fn test_missing_field() {
        let r = resp(200, r#"{"other":1}"#);
        assert!(matches!(
            r.require("message"),
            Err(CheckError::MissingField(_))
        ));
    }

    #[test]
    fn test_require_u64_wrong_type() {
        let r = resp(200, r#"{"count":"three"}"#);
        assert!(matches!(
            r.require_u64("count"),
            Err(CheckError::BadField { .. })
        ));
    }

    #[test]
    fn test_non_json_body() {
        let r = resp(200, "<html>not json</html>");
        assert!(matches!(r.json(), Err(CheckError::NotJson(_))));
    }

    #[test]
    fn test_str_field_is_unquoted() {
        let v = json!({"title": "Service Request Approved"});
        let title = require_str_field(&v, "title").unwrap();
        assert_eq!(title, "Service Request Approved");
        assert!(!format!("Found notification: {}", title).contains('"'));
    }

    #[test]
    fn test_array_body() {
        let r = resp(200, r#"[{"id":"a"},{"id":"b"}]"#);
        assert_eq!(r.array().unwrap().len(), 2);
        assert_eq!(
            require_field(&r.array().unwrap()[1], "id").unwrap(),
            &json!("b")
        );
    }
}
