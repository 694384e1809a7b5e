//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Name of the variable that could not be resolved.
struct Unset(String);

/// Expand environment variable references in `value`.
///
/// Only the braced forms are recognized; strings without `${` are returned
/// as-is, so a literal `$` in a URL path survives.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| -> Result<Option<String>, Unset> {
        std::env::var(name)
            .map(Some)
            .map_err(|_| Unset(name.to_owned()))
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SCONE_TEST_DOCS_HOST", "docs.example.com");
        }
        let result = expand_env("https://${SCONE_TEST_DOCS_HOST}/site", "source.origin").unwrap();
        assert_eq!(result, "https://docs.example.com/site");
        unsafe {
            std::env::remove_var("SCONE_TEST_DOCS_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SCONE_TEST_UNSET_TITLE");
        }
        let result = expand_env("${SCONE_TEST_UNSET_TITLE:-Handbook}", "site.title").unwrap();
        assert_eq!(result, "Handbook");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SCONE_TEST_MISSING");
        }
        let err = expand_env("${SCONE_TEST_MISSING}", "source.origin").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("SCONE_TEST_MISSING"));
        assert!(msg.contains("source.origin"));
    }

    #[test]
    fn test_literal_dollar_unchanged() {
        assert_eq!(
            expand_env("https://example.com/$docs", "source.origin").unwrap(),
            "https://example.com/$docs"
        );
    }
}
