//! Assignee-list parsing
//!
//! The store serializes task assignees as a JSON string list of
//! email-like identities. The field is user-maintained, so malformed
//! payloads are treated as "no assignees" rather than an error.

/// Parse a serialized assignee list into trimmed, lowercased identities.
///
/// Returns an empty vec when the field is absent, not valid JSON, or not
/// a JSON array.
#[must_use]
pub fn parse_assignees(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry {
                serde_json::Value::String(s) => s.trim().to_lowercase(),
                other => other.to_string().trim().to_lowercase(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Case-insensitive containment check of `identity` in a serialized list.
///
/// `identity` is trimmed and lowercased before comparison; malformed list
/// data never matches.
#[must_use]
pub fn has_assignee(raw: Option<&str>, identity: &str) -> bool {
    let needle = identity.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    parse_assignees(raw).iter().any(|entry| *entry == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_entries() {
        let raw = r#"[" A@X.com ", "b@y.com"]"#;
        assert_eq!(parse_assignees(Some(raw)), vec!["a@x.com", "b@y.com"]);
    }

    #[test]
    fn matches_case_insensitively() {
        let raw = r#"["a@x.com"]"#;
        assert!(has_assignee(Some(raw), "A@X.COM"));
        assert!(has_assignee(Some(raw), "  a@x.com  "));
        assert!(!has_assignee(Some(raw), "c@z.com"));
    }

    #[test]
    fn malformed_list_never_matches() {
        assert!(!has_assignee(Some("not json"), "a@x.com"));
        assert!(!has_assignee(Some(r#"{"a": 1}"#), "a@x.com"));
        assert!(!has_assignee(None, "a@x.com"));
        assert_eq!(parse_assignees(Some("not json")), Vec::<String>::new());
    }

    #[test]
    fn empty_identity_never_matches() {
        assert!(!has_assignee(Some(r#"[""]"#), "   "));
    }
}
