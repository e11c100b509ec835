//! Query value object

use std::fmt;

use super::DomainError;

/// An immutable user query with its normalized form.
///
/// The normalized form trims the text and collapses whitespace runs to a
/// single space. It is what the exact layer hashes and what the vector layers
/// embed, so `"What is  Python?\n"` and `"What is Python?"` share an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: String,
    normalized: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let normalized = normalize(&raw);

        if normalized.is_empty() {
            return Err(DomainError::validation("Query cannot be empty"));
        }

        Ok(Self { raw, normalized })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_whitespace() {
        let query = Query::new("  What   is\tPython?\n").unwrap();

        assert_eq!(query.raw(), "  What   is\tPython?\n");
        assert_eq!(query.normalized(), "What is Python?");
    }

    #[test]
    fn test_preserves_case() {
        let query = Query::new("What is Python?").unwrap();
        assert_ne!(query.normalized(), "what is python?");
    }

    #[test]
    fn test_rejects_blank_query() {
        assert!(matches!(
            Query::new("   \n"),
            Err(DomainError::Validation { .. })
        ));
        assert!(Query::new("").is_err());
    }
}
