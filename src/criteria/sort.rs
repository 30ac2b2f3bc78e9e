//! Sort expression validation
//!
//! Clients sort with `?sort=field:asc,other:desc`. The expression is
//! validated against a per-resource list of available sort fields; each
//! public field name maps to an internal column path.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::problem::{codes, ApiError};

static SORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_-]+:(asc|desc)(,[a-z0-9_-]+:(asc|desc))*$").expect("valid regex")
});

/// Sort direction for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

/// Validate a raw sort expression against the available sort fields.
///
/// `available` maps public field names to internal column paths; the
/// returned list pairs each resolved internal path with its direction,
/// preserving the order of the expression. `None` in, `None` out.
///
/// The grammar is checked case-insensitively, but field names are looked
/// up exactly as written, so `available` keys keep their casing.
///
/// Failures map to `sort.malformed` (grammar) and `order.incorrect_order`
/// (unknown field), both 400s.
///
/// # Example
///
/// ```rust
/// use restkit::criteria::{validate_sort, SortDirection};
///
/// let available = [("name", "e.name"), ("owner", "owner.name")];
/// let sorts = validate_sort(&available, Some("owner:desc,name:asc"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(sorts[0], ("owner.name".to_string(), SortDirection::Desc));
/// ```
pub fn validate_sort(
    available: &[(&str, &str)],
    sort: Option<&str>,
) -> Result<Option<Vec<(String, SortDirection)>>, ApiError> {
    let Some(raw) = sort else {
        return Ok(None);
    };

    if !SORT_RE.is_match(&raw.to_ascii_lowercase()) {
        return Err(ApiError::bad_request(codes::RESULT_SORT_MALFORMED));
    }

    let mut resolved = Vec::new();
    for clause in raw.split(',') {
        // The grammar guarantees exactly one colon per clause.
        let (field, direction) = clause
            .split_once(':')
            .ok_or_else(|| ApiError::bad_request(codes::RESULT_SORT_MALFORMED))?;
        let path = available
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, path)| (*path).to_string())
            .ok_or_else(|| ApiError::bad_request(codes::RESULT_ORDER_INCORRECT))?;
        let direction: SortDirection = direction
            .parse()
            .map_err(|()| ApiError::bad_request(codes::RESULT_SORT_MALFORMED))?;
        resolved.push((path, direction));
    }

    Ok(Some(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AVAILABLE: &[(&str, &str)] = &[("name", "e.name"), ("owner", "owner.name")];

    #[test]
    fn test_absent_sort_is_none() {
        assert_eq!(validate_sort(AVAILABLE, None).unwrap(), None);
    }

    #[test]
    fn test_single_field() {
        let sorts = validate_sort(AVAILABLE, Some("name:asc")).unwrap().unwrap();
        assert_eq!(sorts, vec![("e.name".to_string(), SortDirection::Asc)]);
    }

    #[test]
    fn test_multiple_fields_preserve_order() {
        let sorts = validate_sort(AVAILABLE, Some("owner:desc,name:asc"))
            .unwrap()
            .unwrap();
        assert_eq!(
            sorts,
            vec![
                ("owner.name".to_string(), SortDirection::Desc),
                ("e.name".to_string(), SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn test_direction_case_insensitive() {
        let sorts = validate_sort(AVAILABLE, Some("name:DESC")).unwrap().unwrap();
        assert_eq!(sorts, vec![("e.name".to_string(), SortDirection::Desc)]);
    }

    #[test]
    fn test_camel_case_field_names_resolve() {
        let available = [("firstName", "e.first_name")];
        let sorts = validate_sort(&available, Some("firstName:asc"))
            .unwrap()
            .unwrap();
        assert_eq!(sorts, vec![("e.first_name".to_string(), SortDirection::Asc)]);
    }

    #[test]
    fn test_field_lookup_is_case_sensitive() {
        let err = validate_sort(AVAILABLE, Some("Name:asc")).unwrap_err();
        assert_eq!(err, ApiError::bad_request(codes::RESULT_ORDER_INCORRECT));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = validate_sort(AVAILABLE, Some("age:asc")).unwrap_err();
        assert_eq!(err, ApiError::bad_request(codes::RESULT_ORDER_INCORRECT));
    }

    #[test]
    fn test_malformed_expressions_rejected() {
        for raw in ["name", "name:", "name:up", "name:asc,", ",name:asc", ":asc", ""] {
            let err = validate_sort(AVAILABLE, Some(raw)).unwrap_err();
            assert_eq!(
                err,
                ApiError::bad_request(codes::RESULT_SORT_MALFORMED),
                "expression {raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_direction_display_and_sql() {
        assert_eq!(SortDirection::Asc.to_string(), "asc");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }
}
