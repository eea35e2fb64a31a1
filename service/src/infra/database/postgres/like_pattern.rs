//! [`LikePattern`] definition.

use derive_more::{AsRef, Display};
use postgres_types::{FromSql, ToSql};

/// `ILIKE` pattern matching any value containing the provided text.
///
/// Wildcards of the text itself are escaped, so they match literally.
#[derive(AsRef, Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[as_ref(str)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] searching for the given `needle`.
    #[must_use]
    pub fn containing(needle: &str) -> Self {
        let mut pattern = String::with_capacity(needle.len() + 2);
        pattern.push('%');
        for c in needle.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }
}

#[cfg(test)]
mod spec {
    use super::LikePattern;

    #[test]
    fn wraps_with_wildcards() {
        assert_eq!(LikePattern::containing("Mwiki").to_string(), "%Mwiki%");
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(
            LikePattern::containing(r"50%_off\").to_string(),
            r"%50\%\_off\\%",
        );
    }
}
