//! Pagination parameter validation
//!
//! Raw `page`/`per_page` query values arrive as strings and are validated
//! before any query is built. A bad value rejects the whole request with a
//! 400 problem; nothing is silently clamped.

use std::sync::OnceLock;

use crate::problem::{codes, ApiError};

/// Page size used when `page` is given without `per_page` and no other
/// default has been installed.
pub const DEFAULT_PER_PAGE: u64 = 10;

static INSTALLED_DEFAULT: OnceLock<u64> = OnceLock::new();

/// Install the default page size from configuration. Call once at
/// startup; later calls are ignored.
pub fn install_default_per_page(per_page: u64) {
    let _ = INSTALLED_DEFAULT.set(per_page);
}

fn default_per_page() -> u64 {
    INSTALLED_DEFAULT.get().copied().unwrap_or(DEFAULT_PER_PAGE)
}

/// A validated offset/limit window.
///
/// `limit == 0` means no pagination was requested and the query runs
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Whether the window leaves the result set unbounded.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.limit == 0
    }
}

/// Validate raw pagination parameters into a [`PageWindow`], using the
/// installed default page size.
///
/// Both values must be positive integers in decimal notation. Failures
/// map to `pagination.incorrect_page_value` and
/// `pagination.incorrect_results_per_page_value`.
///
/// # Example
///
/// ```rust
/// use restkit::criteria::validate_pagination;
///
/// let window = validate_pagination(Some("3"), Some("20")).unwrap();
/// assert_eq!((window.offset, window.limit), (40, 20));
///
/// let window = validate_pagination(None, None).unwrap();
/// assert!(window.is_unbounded());
/// ```
pub fn validate_pagination(
    page: Option<&str>,
    per_page: Option<&str>,
) -> Result<PageWindow, ApiError> {
    validate_pagination_with(page, per_page, default_per_page())
}

/// Like [`validate_pagination`] with an explicit default page size.
pub fn validate_pagination_with(
    page: Option<&str>,
    per_page: Option<&str>,
    default_per_page: u64,
) -> Result<PageWindow, ApiError> {
    let page = match page {
        Some(raw) => Some(
            parse_positive(raw)
                .ok_or_else(|| ApiError::bad_request(codes::PAGINATION_INCORRECT_PAGE_VALUE))?,
        ),
        None => None,
    };
    let per_page = match per_page {
        Some(raw) => Some(parse_positive(raw).ok_or_else(|| {
            ApiError::bad_request(codes::PAGINATION_INCORRECT_RESULTS_PER_PAGE_VALUE)
        })?),
        None => None,
    };

    let limit = match (page, per_page) {
        (_, Some(limit)) => limit,
        (Some(_), None) => default_per_page,
        (None, None) => 0,
    };
    // A page so large the offset leaves u64 can never name a real page.
    let offset = match page {
        Some(page) => page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(limit))
            .ok_or_else(|| ApiError::bad_request(codes::PAGINATION_INCORRECT_PAGE_VALUE))?,
        None => 0,
    };

    Ok(PageWindow { offset, limit })
}

/// Parse a decimal string as a strictly positive integer. Leading zeros
/// are accepted as long as the value is nonzero.
fn parse_positive(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}
