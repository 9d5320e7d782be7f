use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$ne")] Ne,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,

    #[serde(rename = "$like")] Like,
    #[serde(rename = "$ilike")] ILike,

    #[serde(rename = "$in")] In,
    #[serde(rename = "$between")] Between,

    /// Pre-rendered SQL from a nested logical operator
    #[serde(skip)]
    Group,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub select: Option<Vec<String>>,
    #[serde(rename = "where")]
    pub where_clause: Option<Value>,
    pub order: Option<Value>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl FilterData {
    /// Starts a filter from a set of WHERE conditions; empty maps mean "no WHERE".
    pub fn conditions(conditions: Map<String, Value>) -> Self {
        Self {
            where_clause: if conditions.is_empty() { None } else { Some(Value::Object(conditions)) },
            ..Default::default()
        }
    }

    /// Unpaged variant for bounded child collections (rosters, statements).
    pub fn ordered(mut self, order: &str) -> Self {
        self.order = Some(Value::String(order.to_string()));
        self
    }

    /// Applies caller paging and ordering, falling back to the given default order.
    pub fn paged(mut self, order: Option<&str>, default_order: &str, limit: Option<i32>, offset: Option<i32>) -> Self {
        let order = order.map(str::trim).filter(|o| !o.is_empty()).unwrap_or(default_order);
        self.order = Some(Value::String(order.to_string()));
        self.limit = Some(limit.unwrap_or(crate::config::CONFIG.api.default_list_limit));
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Identifier rule shared by table, column and order validation.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
