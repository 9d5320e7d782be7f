use serde_json::Value;

use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOp, FilterWhereInfo};

/// Compiles a JSON WHERE object into a parameterised SQL predicate.
///
/// `{ "status": "active", "amount": { "$gte": 10 }, "$or": [ {...}, {...} ] }`
/// Keys starting with `$` are logical operators; other keys are columns.
/// String operands are compared against the column's text form so that dates,
/// times and enumerations stored as TEXT can all be filtered with strings.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Returns the predicate (empty when there are no conditions) and its bound values.
    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(where_data)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        self.parse_where_data(where_data)?;

        let mut sql_conditions = vec![];
        let conditions = std::mem::take(&mut self.conditions);
        for condition in &conditions {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        Ok((sql_conditions.join(" AND "), std::mem::take(&mut self.param_values)))
    }

    fn parse_where_data(&mut self, where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null => Ok(()),
            Value::Object(obj) => {
                for (key, value) in obj {
                    if key.starts_with('$') {
                        self.parse_logical_operator(key, value)?;
                    } else {
                        self.parse_field_condition(key, value)?;
                    }
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn parse_logical_operator(&mut self, op: &str, value: &Value) -> Result<(), FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let mut sql_parts = Vec::new();
                for v in arr {
                    let (sql, params) = Self::generate(v, self.param_index)?;
                    if sql.is_empty() {
                        continue;
                    }
                    self.param_index += params.len();
                    self.param_values.extend(params);
                    sql_parts.push(format!("({})", sql));
                }
                if sql_parts.is_empty() {
                    return Ok(());
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                self.conditions.push(FilterWhereInfo {
                    column: format!("({})", sql_parts.join(joiner)),
                    operator: FilterOp::Group,
                    data: Value::Null,
                });
                Ok(())
            }
            "$not" => {
                let (sql, params) = Self::generate(value, self.param_index)?;
                if sql.is_empty() {
                    return Ok(());
                }
                self.param_index += params.len();
                self.param_values.extend(params);
                self.conditions.push(FilterWhereInfo {
                    column: format!("NOT ({})", sql),
                    operator: FilterOp::Group,
                    data: Value::Null,
                });
                Ok(())
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        if !is_valid_identifier(field) {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", field)));
        }
        match value {
            Value::Object(obj) => {
                for (op_key, op_val) in obj {
                    let operator = Self::map_operator(op_key)?;
                    self.conditions.push(FilterWhereInfo {
                        column: field.to_string(),
                        operator,
                        data: op_val.clone(),
                    });
                }
            }
            // Implicit membership: { field: [a, b] }
            Value::Array(_) => self.conditions.push(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::In,
                data: value.clone(),
            }),
            // Implicit equality: { field: value }
            _ => self.conditions.push(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            }),
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$between" => FilterOp::Between,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        if condition.operator == FilterOp::Group {
            return Ok(condition.column.clone());
        }

        let column = column_expr(&condition.column, &condition.data);
        let data = condition.data.clone();
        match condition.operator {
            FilterOp::Eq => {
                if data.is_null() {
                    Ok(format!("\"{}\" IS NULL", condition.column))
                } else {
                    Ok(format!("{} = {}", column, self.param(data)))
                }
            }
            FilterOp::Ne => {
                if data.is_null() {
                    Ok(format!("\"{}\" IS NOT NULL", condition.column))
                } else {
                    Ok(format!("{} <> {}", column, self.param(data)))
                }
            }
            FilterOp::Gt => Ok(format!("{} > {}", column, self.scalar_param(data, ">")?)),
            FilterOp::Gte => Ok(format!("{} >= {}", column, self.scalar_param(data, ">=")?)),
            FilterOp::Lt => Ok(format!("{} < {}", column, self.scalar_param(data, "<")?)),
            FilterOp::Lte => Ok(format!("{} <= {}", column, self.scalar_param(data, "<=")?)),
            FilterOp::Like | FilterOp::ILike => {
                if !data.is_string() {
                    return Err(FilterError::InvalidOperatorData("$like/$ilike require a string pattern".to_string()));
                }
                let keyword = if condition.operator == FilterOp::Like { "LIKE" } else { "ILIKE" };
                Ok(format!("\"{}\"::text {} {}", condition.column, keyword, self.param(data)))
            }
            FilterOp::In => match data {
                Value::Array(values) => {
                    if values.is_empty() {
                        return Ok("1=0".to_string());
                    }
                    let column = column_expr(&condition.column, &values[0]);
                    let params: Vec<String> = values.into_iter().map(|v| self.param(v)).collect();
                    Ok(format!("{} IN ({})", column, params.join(", ")))
                }
                other => Ok(format!("{} = {}", column, self.param(other))),
            },
            FilterOp::Between => match data {
                Value::Array(mut values) if values.len() == 2 => {
                    let column = column_expr(&condition.column, &values[0]);
                    let high = values.pop().unwrap_or(Value::Null);
                    let low = values.pop().unwrap_or(Value::Null);
                    Ok(format!("{} BETWEEN {} AND {}", column, self.param(low), self.param(high)))
                }
                _ => Err(FilterError::InvalidOperatorData("$between requires array with 2 values".to_string())),
            },
            FilterOp::Group => Ok(condition.column.clone()),
        }
    }

    fn scalar_param(&mut self, value: Value, op: &str) -> Result<String, FilterError> {
        match value {
            Value::Null | Value::Array(_) | Value::Object(_) => Err(FilterError::InvalidOperatorData(format!(
                "{} requires a string, number or boolean",
                op
            ))),
            v => Ok(self.param(v)),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

fn column_expr(column: &str, sample: &Value) -> String {
    if sample.is_string() {
        format!("\"{}\"::text", column)
    } else {
        format!("\"{}\"", column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn implicit_equality_and_operators() {
        let (sql, params) = FilterWhere::generate(&json!({ "amount": { "$gte": 10 }, "status": "active" }), 0).unwrap();
        assert_eq!(sql, "\"amount\" >= $1 AND \"status\"::text = $2");
        assert_eq!(params, vec![json!(10), json!("active")]);
    }

    #[test]
    fn nested_or_keeps_parameter_numbering() {
        let where_data = json!({
            "$or": [
                { "first_name": { "$ilike": "%ana%" } },
                { "last_name": { "$ilike": "%ana%" } }
            ],
            "status": "active"
        });
        let (sql, params) = FilterWhere::generate(&where_data, 0).unwrap();
        assert_eq!(
            sql,
            "((\"first_name\"::text ILIKE $1) OR (\"last_name\"::text ILIKE $2)) AND \"status\"::text = $3"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn null_equality_uses_is_null() {
        let (sql, params) = FilterWhere::generate(&json!({ "member_id": null }), 0).unwrap();
        assert_eq!(sql, "\"member_id\" IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn empty_in_matches_nothing() {
        let (sql, _) = FilterWhere::generate(&json!({ "id": { "$in": [] } }), 0).unwrap();
        assert_eq!(sql, "1=0");
    }

    #[test]
    fn between_dates_compares_text() {
        let (sql, params) = FilterWhere::generate(
            &json!({ "transaction_date": { "$between": ["2024-01-01", "2024-12-31"] } }),
            0,
        )
        .unwrap();
        assert_eq!(sql, "\"transaction_date\"::text BETWEEN $1 AND $2");
        assert_eq!(params, vec![json!("2024-01-01"), json!("2024-12-31")]);
    }

    #[test]
    fn rejects_injection_in_column_names() {
        let err = FilterWhere::generate(&json!({ "status\" OR 1=1 --": "x" }), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }

    #[test]
    fn rejects_unknown_operators() {
        assert!(FilterWhere::generate(&json!({ "name": { "$regex": ".*" } }), 0).is_err());
        assert!(FilterWhere::generate(&json!({ "$xor": [] }), 0).is_err());
    }

    #[test]
    fn empty_where_is_empty_predicate() {
        let (sql, params) = FilterWhere::generate(&json!({}), 0).unwrap();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }
}
