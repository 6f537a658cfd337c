//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{ComplaintStatus, Error, Priority};

pub(crate) fn missing_field_error(field: &str) -> Error {
    Error::invalid_request(format!("missing required field: {field}"))
        .with_details(json!({ "field": field, "code": "missing_field" }))
}

pub(crate) fn invalid_number_error(field: &str, value: &str) -> Error {
    Error::invalid_request(format!("{field} must be a number")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_number",
    }))
}

pub(crate) fn parse_i32(value: &str, field: &str) -> Result<i32, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid_number_error(field, value))
}

pub(crate) fn invalid_status_error(value: &str) -> Error {
    Error::invalid_request("status must be pending, in-progress, resolved, or closed")
        .with_details(json!({
            "field": "status",
            "value": value,
            "code": "invalid_status",
        }))
}

pub(crate) fn parse_status(value: &str) -> Result<ComplaintStatus, Error> {
    value.parse().map_err(|_| invalid_status_error(value))
}

pub(crate) fn invalid_priority_error(value: &str) -> Error {
    Error::invalid_request("priority must be low, medium, or high").with_details(json!({
        "field": "priority",
        "value": value,
        "code": "invalid_priority",
    }))
}

pub(crate) fn parse_priority(value: &str) -> Result<Priority, Error> {
    value.parse().map_err(|_| invalid_priority_error(value))
}

/// Parse an optional list-filter value; `all` and the empty string mean
/// "no filter", matching the submitted form's wildcard option.
pub(crate) fn parse_status_filter(value: Option<&str>) -> Result<Option<ComplaintStatus>, Error> {
    match value {
        None | Some("" | "all") => Ok(None),
        Some(raw) => parse_status(raw).map(Some),
    }
}

/// Priority counterpart of [`parse_status_filter`].
pub(crate) fn parse_priority_filter(value: Option<&str>) -> Result<Option<Priority>, Error> {
    match value {
        None | Some("" | "all") => Ok(None),
        Some(raw) => parse_priority(raw).map(Some),
    }
}

/// Normalise a search term: blank input means "no search".
pub(crate) fn normalise_search(value: Option<String>) -> Option<String> {
    value.filter(|term| !term.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some("all"), None)]
    #[case(Some(""), None)]
    #[case(Some("resolved"), Some(ComplaintStatus::Resolved))]
    fn status_filter_treats_all_as_no_filter(
        #[case] raw: Option<&str>,
        #[case] expected: Option<ComplaintStatus>,
    ) {
        assert_eq!(parse_status_filter(raw).expect("valid"), expected);
    }

    #[test]
    fn status_filter_rejects_unknown_values() {
        let err = parse_status_filter(Some("escalated")).expect_err("unknown status");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(Some("high"), Some(Priority::High))]
    #[case(Some("all"), None)]
    fn priority_filter_parses(#[case] raw: Option<&str>, #[case] expected: Option<Priority>) {
        assert_eq!(parse_priority_filter(raw).expect("valid"), expected);
    }

    #[test]
    fn parse_i32_flags_the_field() {
        let err = parse_i32("two", "category_id").expect_err("not a number");
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some("category_id")
        );
    }

    #[rstest]
    #[case(Some("  ".to_owned()), None)]
    #[case(Some("pipe".to_owned()), Some("pipe".to_owned()))]
    #[case(None, None)]
    fn blank_search_is_dropped(#[case] raw: Option<String>, #[case] expected: Option<String>) {
        assert_eq!(normalise_search(raw), expected);
    }
}
