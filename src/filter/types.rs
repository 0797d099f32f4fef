use serde::{Deserialize, Serialize};

/// Comparison operators accepted in WHERE objects
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
    #[serde(rename = "$null")] Null,
}

impl FilterOp {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "$eq" => Some(FilterOp::Eq),
            "$ne" => Some(FilterOp::Ne),
            "$gt" => Some(FilterOp::Gt),
            "$gte" => Some(FilterOp::Gte),
            "$lt" => Some(FilterOp::Lt),
            "$lte" => Some(FilterOp::Lte),
            "$like" => Some(FilterOp::Like),
            "$ilike" => Some(FilterOp::ILike),
            "$in" => Some(FilterOp::In),
            "$null" => Some(FilterOp::Null),
            _ => None,
        }
    }
}

/// Filter input supplied by the admin layer alongside a request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub where_clause: Option<serde_json::Value>,
    pub order: Option<serde_json::Value>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Soft-delete visibility: an independent predicate composed alongside the
/// scope predicate. Normal queries always exclude deleted rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionVisibility {
    #[default]
    Exclude,
    Include,
}

impl DeletionVisibility {
    pub fn to_sql(&self) -> Option<&'static str> {
        match self {
            DeletionVisibility::Exclude => Some("\"deleted_at\" IS NULL"),
            DeletionVisibility::Include => None,
        }
    }
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

/// Rendered SQL plus its bind parameters. Scope parameters (always UUIDs)
/// bind before the JSON-typed filter parameters; placeholder numbering in
/// `query` follows that order.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub scope_params: Vec<uuid::Uuid>,
    pub params: Vec<serde_json::Value>,
}
