//! Detection and pretty-printing of JSON error messages.

use serde_json::Value;

/// Parse `message` as JSON when it looks like a JSON document.
///
/// Accepts an object or array literal, or a JSON string whose decoded
/// contents is itself an object or array literal. Anything else, including
/// malformed JSON, returns `None`.
pub fn detect_json_message(message: &str) -> Option<Value> {
    if message.starts_with('{') || message.starts_with('[') {
        return serde_json::from_str(message).ok();
    }
    if message.starts_with('"') {
        let inner = match serde_json::from_str::<Value>(message).ok()? {
            Value::String(s) => s,
            _ => return None,
        };
        if inner.starts_with('{') || inner.starts_with('[') {
            return serde_json::from_str(&inner).ok();
        }
    }
    None
}

/// Two-space indented rendering of a detected JSON message, or `None` when
/// the message is not JSON.
pub fn pretty_print(message: &str) -> Option<String> {
    let value = detect_json_message(message)?;
    serde_json::to_string_pretty(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_literal() {
        assert_eq!(detect_json_message(r#"{"code":500}"#), Some(json!({"code": 500})));
    }

    #[test]
    fn test_array_literal() {
        assert_eq!(detect_json_message("[1,2]"), Some(json!([1, 2])));
    }

    #[test]
    fn test_string_encoded_object() {
        let message = r#""{\"error\":\"timeout\"}""#;
        assert_eq!(detect_json_message(message), Some(json!({"error": "timeout"})));
    }

    #[test]
    fn test_plain_and_malformed_are_not_json() {
        assert_eq!(detect_json_message("disk full"), None);
        assert_eq!(detect_json_message("{not json"), None);
        assert_eq!(detect_json_message(r#""just a string""#), None);
        assert_eq!(detect_json_message(r#""{broken""#), None);
        assert_eq!(detect_json_message(""), None);
    }

    #[test]
    fn test_pretty_print_uses_two_space_indent() {
        let pretty = pretty_print(r#"{"a":{"b":1}}"#).unwrap();
        assert_eq!(pretty, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
        assert_eq!(pretty_print("plain"), None);
    }

    #[test]
    fn test_pretty_print_keeps_source_key_order() {
        let pretty = pretty_print(r#"{"zeta":1,"alpha":2}"#).unwrap();
        assert_eq!(pretty, "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}");
    }

    #[test]
    fn test_string_encoded_object_keeps_key_order() {
        let value = detect_json_message(r#""{\"zeta\":1,\"alpha\":2}""#).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
