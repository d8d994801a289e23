use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Kinds of non-null values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Number,
    String,
    List,
}

impl DataType {
    /// Rank used to order values of different kinds against each other
    fn rank(self) -> u8 {
        match self {
            DataType::Boolean => 1,
            DataType::Number => 2,
            DataType::String => 3,
            DataType::List => 4,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Number => "number",
            DataType::String => "string",
            DataType::List => "list",
        };
        f.write_str(name)
    }
}

/// Values that can be stored in a table cell or produced by an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Number(_) => Some(DataType::Number),
            Value::String(_) => Some(DataType::String),
            Value::List(_) => Some(DataType::List),
        }
    }

    /// Name of the value's kind, `"null"` for Null
    pub fn type_name(&self) -> String {
        self.data_type()
            .map_or_else(|| "null".to_string(), |t| t.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truth value of this value in a condition. Null has no truth value.
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            Value::Null => None,
            Value::Boolean(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0 && !n.is_nan()),
            Value::String(s) => Some(!s.is_empty()),
            Value::List(_) => Some(true),
        }
    }

    /// Equality between two non-null values. Values of different kinds are
    /// never equal.
    pub fn sql_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.sql_eq(y))
            }
            _ => false,
        }
    }

    /// Ordering of two values of the same kind, `None` when the kinds differ
    /// or either side is Null.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting and merge joins.
    ///
    /// Null sorts before every other value. Values of different kinds are
    /// ordered by kind; NaN sorts after every other number.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Number(a), Value::Number(b)) => a
                .partial_cmp(b)
                .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    let cmp = x.sort_cmp(y);
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => match a.partial_compare(b) {
                Some(cmp) => cmp,
                None => match (a.data_type(), b.data_type()) {
                    (Some(x), Some(y)) => x.rank().cmp(&y.rank()),
                    _ => Ordering::Equal,
                },
            },
        }
    }

    /// Display label of this value when it appears as a literal in a query.
    /// Strings are JSON quoted so that `'1'` and `1` get distinct labels.
    pub fn literal_label(&self) -> String {
        match self {
            Value::String(s) => {
                serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
            }
            other => other.to_string(),
        }
    }
}

/// Formats a number the way it is printed back to users: integral values
/// without a fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == n.trunc() && n.abs() < 1e21 {
        // -0.0 prints as 0
        format!("{:.0}", n + 0.0)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_null() {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type() {
        assert_eq!(Value::Null.data_type(), None);
        assert_eq!(Value::from(1).data_type(), Some(DataType::Number));
        assert_eq!(Value::from("a").data_type(), Some(DataType::String));
        assert_eq!(Value::from(true).type_name(), "boolean");
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(Value::Null.truthiness(), None);
        assert_eq!(Value::from(0).truthiness(), Some(false));
        assert_eq!(Value::from(2.5).truthiness(), Some(true));
        assert_eq!(Value::from("").truthiness(), Some(false));
        assert_eq!(Value::from("x").truthiness(), Some(true));
        assert_eq!(Value::Number(f64::NAN).truthiness(), Some(false));
    }

    #[test]
    fn test_sort_cmp_null_first() {
        assert_eq!(Value::Null.sort_cmp(&Value::from(1)), Ordering::Less);
        assert_eq!(Value::from(1).sort_cmp(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Null.sort_cmp(&Value::Null), Ordering::Equal);
        assert_eq!(Value::from(1).sort_cmp(&Value::from(2)), Ordering::Less);
        assert_eq!(Value::from("b").sort_cmp(&Value::from("a")), Ordering::Greater);
        // numbers before strings
        assert_eq!(Value::from(9).sort_cmp(&Value::from("1")), Ordering::Less);
    }

    #[test]
    fn test_sort_cmp_nan_last_among_numbers() {
        let nan = Value::Number(f64::NAN);
        assert_eq!(nan.sort_cmp(&Value::from(1e300)), Ordering::Greater);
        assert_eq!(Value::from(-1).sort_cmp(&nan), Ordering::Less);
        assert_eq!(nan.sort_cmp(&Value::Number(f64::NAN)), Ordering::Equal);
        assert_eq!(nan.sort_cmp(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::Null.sort_cmp(&nan), Ordering::Less);
    }

    #[test]
    fn test_sql_eq() {
        assert!(Value::from(1).sql_eq(&Value::from(1.0)));
        assert!(!Value::from(1).sql_eq(&Value::from("1")));
        assert!(Value::List(vec![Value::from("a")]).sql_eq(&Value::List(vec![Value::from("a")])));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(
            Value::List(vec![Value::from("a"), Value::from(1)]).to_string(),
            "a,1"
        );
    }

    #[test]
    fn test_literal_label() {
        assert_eq!(Value::from("北京").literal_label(), "\"北京\"");
        assert_eq!(Value::from("a'b").literal_label(), "\"a'b\"");
        assert_eq!(Value::from(90).literal_label(), "90");
        assert_eq!(Value::Null.literal_label(), "null");
    }

    #[test]
    fn test_json_round_trip_shape() -> anyhow::Result<()> {
        let value: Value = serde_json::from_str(r#"[1, "a", null, true]"#)?;
        assert_eq!(
            value,
            Value::List(vec![
                Value::from(1),
                Value::from("a"),
                Value::Null,
                Value::from(true)
            ])
        );
        Ok(())
    }
}
