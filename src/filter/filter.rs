use serde_json::Value;

use crate::access::ScopePredicate;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{DeletionVisibility, FilterData, FilterOrderInfo, SqlResult};

/// Composes a SELECT for one table from three independent predicates:
/// soft-delete visibility, the caller's scope predicate, and the admin
/// layer's filters. The fragments are AND-ed at the SQL level so scoping
/// composes with search, ordering, and pagination.
pub struct Filter {
    table_name: String,
    scope: ScopePredicate,
    deletion: DeletionVisibility,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            scope: ScopePredicate::Unrestricted,
            deletion: DeletionVisibility::default(),
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    /// AND the computed scope predicate into every query this filter renders
    pub fn scope(&mut self, scope: ScopePredicate) -> &mut Self {
        self.scope = scope;
        self
    }

    pub fn deletion(&mut self, deletion: DeletionVisibility) -> &mut Self {
        self.deletion = deletion;
        self
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause {
            self.where_clause(where_clause)?;
        }
        if let Some(order) = data.order {
            self.order(order)?;
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn order_by(&mut self, column: &str, ascending: bool) -> Result<&mut Self, FilterError> {
        self.order(Value::String(format!(
            "{} {}",
            column,
            if ascending { "asc" } else { "desc" }
        )))
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        let max_limit = crate::config::CONFIG.api.max_page_size;
        let applied_limit = if limit > max_limit {
            tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, scope_params, params) = self.build_where()?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT * FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, scope_params, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, scope_params, params) = self.build_where()?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) as count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) as count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, scope_params, params })
    }

    /// Fragment order: soft-delete, scope, caller filters. Scope params bind
    /// first, so their placeholders number from $1.
    fn build_where(&self) -> Result<(String, Vec<uuid::Uuid>, Vec<Value>), FilterError> {
        let mut fragments: Vec<String> = vec![];
        let mut scope_params = vec![];

        if let Some(deletion) = self.deletion.to_sql() {
            fragments.push(deletion.to_string());
        }

        if let Some((clause, params)) = self.scope.to_sql(0) {
            fragments.push(clause);
            scope_params = params;
        }

        let mut params = vec![];
        if let Some(ref where_data) = self.where_data {
            let (clause, where_params) = FilterWhere::generate(where_data, scope_params.len())?;
            if let Some(clause) = clause {
                fragments.push(clause);
            }
            params = where_params;
        }

        Ok((fragments.join(" AND "), scope_params, params))
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string()));
        }
        let first = name.chars().next().unwrap();
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') || (!first.is_alphabetic() && first != '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }
}
