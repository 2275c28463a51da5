use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Type mismatch in '{column}': expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Row count changed by {strategy}: {before} rows in, {after} rows out")]
    RowCountChanged {
        strategy: String,
        before: usize,
        after: usize,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeriveError>;

impl DeriveError {
    pub fn display_friendly(&self) -> String {
        match self {
            DeriveError::ColumnNotFound(col) => {
                format!(
                    "Column '{}' not found.\nThe dataset needs 'column' and 'othercolumn'.",
                    col
                )
            }
            DeriveError::TypeMismatch { column, expected, got } => {
                format!(
                    "Column '{}' has type {}, but {} is required.",
                    column, got, expected
                )
            }
            DeriveError::InvalidConfig(msg) => {
                format!("{}\nSee dcol --help for the accepted values", msg)
            }
            _ => self.to_string(),
        }
    }

    /// Configuration errors abort the run instead of being reported per strategy.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DeriveError::ColumnNotFound(_)
                | DeriveError::TypeMismatch { .. }
                | DeriveError::InvalidRule(_)
                | DeriveError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendly_column_not_found() {
        let err = DeriveError::ColumnNotFound("othercolumn".to_string());
        let msg = err.display_friendly();
        assert!(msg.contains("'othercolumn'"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_polars_error_is_not_config() {
        let err = DeriveError::from(polars::error::PolarsError::NoData("empty".into()));
        assert!(!err.is_config_error());
    }
}
