//! Type-name normalization for error codes
//!
//! Error codes derived from type names follow a dotted snake-case shape:
//! path separators become dots, camel-case segments become snake-case.
//!
//! # Example
//!
//! ```rust
//! use restkit::problem::normalize_type_name;
//!
//! assert_eq!(normalize_type_name("One::Two::ThreeFour"), "one.two.three_four");
//! ```

/// Normalize a type path into a dotted snake-case error-code segment.
///
/// Path separators (`::` and `\`) become dots. Each path part is split on
/// camel-case boundaries and lowercased; an acronym run stays a single
/// segment (`HTTPServer` -> `http_server`).
///
/// # Example
///
/// ```rust
/// use restkit::problem::normalize_type_name;
///
/// assert_eq!(normalize_type_name("Users::User"), "users.user");
/// assert_eq!(normalize_type_name("HTTPServer"), "http_server");
/// ```
#[must_use]
pub fn normalize_type_name(name: &str) -> String {
    name.replace('\\', "::")
        .split("::")
        .filter(|part| !part.is_empty())
        .map(snake_case)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split one path part on camel-case boundaries and join with underscores.
fn snake_case(part: &str) -> String {
    let chars: Vec<char> = part.chars().collect();
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !current.is_empty() && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars
                .get(i + 1)
                .is_some_and(|n| n.is_ascii_lowercase() || n.is_ascii_digit());
            // Boundary after a lowercase/digit run, or between an acronym
            // run and the start of the next word (HTTPServer -> HTTP|Server).
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower)
            {
                segments.push(current.clone());
                current.clear();
            }
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_camel_case() {
        assert_eq!(normalize_type_name("ThreeFour"), "three_four");
        assert_eq!(normalize_type_name("User"), "user");
    }

    #[test]
    fn test_path_separators_become_dots() {
        assert_eq!(normalize_type_name("One::Two::ThreeFour"), "one.two.three_four");
        assert_eq!(normalize_type_name("Users::User"), "users.user");
    }

    #[test]
    fn test_backslash_separators() {
        assert_eq!(normalize_type_name(r"Users\User"), "users.user");
        assert_eq!(normalize_type_name(r"One\Two\ThreeFour"), "one.two.three_four");
    }

    #[test]
    fn test_acronym_runs() {
        assert_eq!(normalize_type_name("HTTPServer"), "http_server");
        assert_eq!(normalize_type_name("APIKey"), "api_key");
        assert_eq!(normalize_type_name("JWT"), "jwt");
    }

    #[test]
    fn test_digits_inside_segments() {
        assert_eq!(normalize_type_name("OAuth2Client"), "o_auth2_client");
        assert_eq!(normalize_type_name("Sha256Digest"), "sha256_digest");
    }

    #[test]
    fn test_already_lowercase() {
        assert_eq!(normalize_type_name("user"), "user");
        assert_eq!(normalize_type_name("users::user"), "users.user");
    }
}
