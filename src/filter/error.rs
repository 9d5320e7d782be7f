use thiserror::Error;

/// Rejections raised while compiling a list query; surfaced as 400s.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Invalid filter: {0}")]
    InvalidWhereClause(String),

    #[error("Unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid value for filter operator: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid paging: {0}")]
    InvalidPaging(String),
}
