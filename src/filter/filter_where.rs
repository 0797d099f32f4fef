use serde_json::Value;

use super::error::FilterError;
use super::types::FilterOp;

/// Builds the caller-supplied part of a WHERE clause from a flat JSON object:
/// `{ "state": "ACTIVE", "max_usage": { "$gte": 100 }, "zone_id": { "$in": [...] } }`.
/// Conditions are AND-ed; the scope and soft-delete fragments are composed
/// by `Filter`, not here.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Render to (clause, params). `$N` placeholders start at
    /// `starting_param_index + 1`. An empty object renders no clause.
    pub fn generate(
        where_data: &Value,
        starting_param_index: usize,
    ) -> Result<(Option<String>, Vec<Value>), FilterError> {
        let mut builder = Self::new(starting_param_index);
        let clause = builder.build(where_data)?;
        Ok((clause, builder.param_values))
    }

    /// Full structural validation: shape, column names, and operators. Runs
    /// at assignment time so malformed filters are rejected as bad input
    /// before any query is built.
    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        let obj = match where_data {
            Value::Null => return Ok(()),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        };

        for (field, value) in obj {
            Self::validate_column(field)?;
            if let Value::Object(ops) = value {
                for (op_key, op_val) in ops {
                    let op = FilterOp::parse(op_key)
                        .ok_or_else(|| FilterError::UnsupportedOperator(op_key.to_string()))?;
                    match op {
                        FilterOp::In if !op_val.is_array() => {
                            return Err(FilterError::InvalidOperatorData(
                                "$in requires an array".to_string(),
                            ))
                        }
                        FilterOp::Null if !op_val.is_boolean() => {
                            return Err(FilterError::InvalidOperatorData(
                                "$null requires a boolean".to_string(),
                            ))
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn build(&mut self, where_data: &Value) -> Result<Option<String>, FilterError> {
        let obj = match where_data {
            Value::Object(obj) => obj,
            Value::Null => return Ok(None),
            _ => return Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        };

        let mut sql_conditions = vec![];
        for (field, value) in obj {
            Self::validate_column(field)?;
            if let Value::Object(ops) = value {
                for (op_key, op_val) in ops {
                    let op = FilterOp::parse(op_key)
                        .ok_or_else(|| FilterError::UnsupportedOperator(op_key.to_string()))?;
                    sql_conditions.push(self.build_sql_condition(field, op, op_val)?);
                }
            } else {
                // Implicit equality: { field: value }
                sql_conditions.push(self.build_sql_condition(field, FilterOp::Eq, value)?);
            }
        }

        if sql_conditions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(sql_conditions.join(" AND ")))
        }
    }

    fn build_sql_condition(&mut self, column: &str, op: FilterOp, data: &Value) -> Result<String, FilterError> {
        let quoted = format!("\"{}\"", column);
        let sql = match op {
            FilterOp::Eq => {
                if data.is_null() {
                    format!("{} IS NULL", quoted)
                } else {
                    format!("{} = {}", quoted, self.param(data.clone()))
                }
            }
            FilterOp::Ne => {
                if data.is_null() {
                    format!("{} IS NOT NULL", quoted)
                } else {
                    format!("{} <> {}", quoted, self.param(data.clone()))
                }
            }
            FilterOp::Gt => format!("{} > {}", quoted, self.param(data.clone())),
            FilterOp::Gte => format!("{} >= {}", quoted, self.param(data.clone())),
            FilterOp::Lt => format!("{} < {}", quoted, self.param(data.clone())),
            FilterOp::Lte => format!("{} <= {}", quoted, self.param(data.clone())),
            FilterOp::Like => format!("{} LIKE {}", quoted, self.param(data.clone())),
            FilterOp::ILike => format!("{} ILIKE {}", quoted, self.param(data.clone())),
            FilterOp::In => {
                let values = data.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData("$in requires an array".to_string())
                })?;
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} IN ({})", quoted, params.join(", "))
            }
            FilterOp::Null => match data.as_bool() {
                Some(true) => format!("{} IS NULL", quoted),
                Some(false) => format!("{} IS NOT NULL", quoted),
                None => {
                    return Err(FilterError::InvalidOperatorData("$null requires a boolean".to_string()))
                }
            },
        };
        Ok(sql)
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    pub(super) fn validate_column(column: &str) -> Result<(), FilterError> {
        if column.is_empty() {
            return Err(FilterError::InvalidColumn("Column name cannot be empty".to_string()));
        }
        let first = column.chars().next().unwrap();
        if !column.chars().all(|c| c.is_alphanumeric() || c == '_') || (!first.is_alphabetic() && first != '_') {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn implicit_equality_and_operators() {
        // serde_json objects iterate keys alphabetically, so max_usage binds first
        let (clause, params) = FilterWhere::generate(
            &json!({ "state": "ACTIVE", "max_usage": { "$gte": 100 } }),
            0,
        )
        .unwrap();
        let clause = clause.unwrap();
        assert!(clause.contains("\"max_usage\" >= $1"));
        assert!(clause.contains("\"state\" = $2"));
        assert_eq!(params, vec![json!(100), json!("ACTIVE")]);
    }

    #[test]
    fn param_numbering_respects_offset() {
        let (clause, _) = FilterWhere::generate(&json!({ "name": "meter" }), 3).unwrap();
        assert_eq!(clause.unwrap(), "\"name\" = $4");
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (clause, params) = FilterWhere::generate(&json!({ "id": { "$in": [] } }), 0).unwrap();
        assert_eq!(clause.unwrap(), "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_bad_columns_and_operators() {
        assert!(FilterWhere::generate(&json!({ "na me": 1 }), 0).is_err());
        assert!(FilterWhere::generate(&json!({ "1name": 1 }), 0).is_err());
        assert!(FilterWhere::generate(&json!({ "name": { "$regex": "x" } }), 0).is_err());
    }
}
