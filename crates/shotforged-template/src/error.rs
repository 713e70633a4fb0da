//! Template errors.

/// Errors raised while parsing or strictly rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Required tokens had no value in the anatomy data.
    #[error("Template '{template}' is missing keys: {}", keys.join(", "))]
    MissingKeys { template: String, keys: Vec<String> },

    /// Tokens resolved to objects or lists instead of scalars.
    #[error("Template '{template}' has keys with invalid types: {}", keys.join(", "))]
    InvalidTypes { template: String, keys: Vec<String> },

    /// An optional `<` segment was never closed.
    #[error("Unbalanced optional segment in template '{0}'")]
    Unbalanced(String),

    /// A `{` token was never closed.
    #[error("Unclosed token in template '{0}'")]
    UnclosedToken(String),

    /// The format spec after `:` is not supported.
    #[error("Invalid format spec '{spec}' for key '{key}'")]
    InvalidFormat { key: String, spec: String },
}

/// Result type alias using [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_display() {
        let err = TemplateError::MissingKeys {
            template: "{a}/{b}".to_string(),
            keys: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Template '{a}/{b}' is missing keys: a, b");
    }

    #[test]
    fn test_invalid_format_display() {
        let err = TemplateError::InvalidFormat {
            key: "version".to_string(),
            spec: "x".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid format spec 'x' for key 'version'");
    }
}
