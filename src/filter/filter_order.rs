use serde_json::Value;

use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Expect array of strings like ["transaction_date desc", "id asc"]
                let mut out = Vec::new();
                for v in arr {
                    match v {
                        Value::String(s) => out.extend(Self::parse_order_string(s)?),
                        other => {
                            return Err(FilterError::InvalidOperatorData(format!(
                                "order entries must be strings, got {}",
                                other
                            )))
                        }
                    }
                }
                Ok(out)
            }
            Value::Object(obj) => {
                // { "transaction_date": "desc", "id": "asc" }
                let mut out = Vec::new();
                for (k, v) in obj {
                    let sort = Self::parse_direction(v.as_str().unwrap_or("asc"))?;
                    out.push(Self::info(k, sort)?);
                }
                Ok(out)
            }
            _ => Err(FilterError::InvalidOperatorData("order must be a string, array or object".to_string())),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let sort = Self::parse_direction(it.next().unwrap_or("asc"))?;
                if let Some(extra) = it.next() {
                    return Err(FilterError::InvalidOperatorData(format!("unexpected '{}' in order", extra)));
                }
                out.push(Self::info(col, sort)?);
            }
        }
        Ok(out)
    }

    fn parse_direction(dir: &str) -> Result<SortDirection, FilterError> {
        if dir.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if dir.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidOperatorData(format!("invalid sort direction '{}'", dir)))
        }
    }

    fn info(column: &str, sort: SortDirection) -> Result<FilterOrderInfo, FilterError> {
        if !is_valid_identifier(column) {
            return Err(FilterError::InvalidColumn(format!("Invalid order column: {}", column)));
        }
        Ok(FilterOrderInfo { column: column.to_string(), sort })
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_forms() {
        let infos = FilterOrder::validate_and_parse(&json!("transaction_date desc, id")).unwrap();
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"transaction_date\" DESC, \"id\" ASC");
    }

    #[test]
    fn rejects_injection() {
        assert!(FilterOrder::validate_and_parse(&json!("id; DROP TABLE members")).is_err());
        assert!(FilterOrder::validate_and_parse(&json!("id sideways")).is_err());
    }
}
