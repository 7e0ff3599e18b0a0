use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid query encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid WHERE clause: {0}")]
    InvalidWhereClause(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
