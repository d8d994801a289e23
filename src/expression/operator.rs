//! Operator definitions and their value-level semantics.
//!
//! Every operator here works on already evaluated values. Null handling:
//! - arithmetic and comparison operators return Null if either side is Null
//! - `and`/`or`/`not` follow three-valued logic

use crate::access::{DataType, Value};
use crate::expression::error::{ExpressionError, ExpressionResult};
use std::cmp::Ordering;
use std::fmt;

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    /// Symbol used in canonical labels
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    /// Applies the operator to two evaluated operands
    pub fn apply(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        match self {
            BinaryOperator::And => Ok(logical_and(left, right)),
            BinaryOperator::Or => Ok(logical_or(left, right)),
            _ if left.is_null() || right.is_null() => Ok(Value::Null),
            BinaryOperator::Add => Ok(add(left, right)),
            BinaryOperator::Sub => self.arithmetic(left, right, |a, b| Ok(a - b)),
            BinaryOperator::Mul => self.arithmetic(left, right, |a, b| Ok(a * b)),
            BinaryOperator::Div => self.arithmetic(left, right, |a, b| {
                if b == 0.0 {
                    Err(ExpressionError::DivisionByZero)
                } else {
                    Ok(a / b)
                }
            }),
            BinaryOperator::Mod => self.arithmetic(left, right, |a, b| {
                if b == 0.0 {
                    Err(ExpressionError::DivisionByZero)
                } else {
                    Ok(a % b)
                }
            }),
            BinaryOperator::Eq => Ok(Value::Boolean(left.sql_eq(right))),
            BinaryOperator::Ne => Ok(Value::Boolean(!left.sql_eq(right))),
            BinaryOperator::Lt => self.compare(left, right, |o| o == Ordering::Less),
            BinaryOperator::Le => self.compare(left, right, |o| o != Ordering::Greater),
            BinaryOperator::Gt => self.compare(left, right, |o| o == Ordering::Greater),
            BinaryOperator::Ge => self.compare(left, right, |o| o != Ordering::Less),
        }
    }

    fn arithmetic<F>(&self, left: &Value, right: &Value, op: F) -> ExpressionResult<Value>
    where
        F: FnOnce(f64, f64) -> ExpressionResult<f64>,
    {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b)?)),
            _ => Err(self.invalid_operands(left, right)),
        }
    }

    fn compare<F>(&self, left: &Value, right: &Value, test: F) -> ExpressionResult<Value>
    where
        F: FnOnce(Ordering) -> bool,
    {
        match left.partial_compare(right) {
            Some(ordering) => Ok(Value::Boolean(test(ordering))),
            // NaN against a number
            None if left.data_type() == right.data_type() => Ok(Value::Boolean(false)),
            None => Err(self.invalid_operands(left, right)),
        }
    }

    fn invalid_operands(&self, left: &Value, right: &Value) -> ExpressionError {
        ExpressionError::InvalidOperandTypes {
            operator: self.symbol().to_string(),
            left: left.type_name(),
            right: right.type_name(),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Minus,
}

impl UnaryOperator {
    pub fn apply(&self, operand: &Value) -> ExpressionResult<Value> {
        match self {
            UnaryOperator::Not => Ok(operand
                .truthiness()
                .map_or(Value::Null, |b| Value::Boolean(!b))),
            UnaryOperator::Minus => match operand {
                Value::Null => Ok(Value::Null),
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(ExpressionError::TypeMismatch {
                    expected: DataType::Number,
                    actual: other.type_name(),
                    context: "unary -".to_string(),
                }),
            },
        }
    }
}

/// `+` adds numbers and concatenates anything else
fn add(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        (a, b) => Value::String(format!("{}{}", a, b)),
    }
}

/// Three-valued AND: false wins over Null
fn logical_and(left: &Value, right: &Value) -> Value {
    match (left.truthiness(), right.truthiness()) {
        (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
        (Some(true), Some(true)) => Value::Boolean(true),
        _ => Value::Null,
    }
}

/// Three-valued OR: true wins over Null
fn logical_or(left: &Value, right: &Value) -> Value {
    match (left.truthiness(), right.truthiness()) {
        (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
        (Some(false), Some(false)) => Value::Boolean(false),
        _ => Value::Null,
    }
}

/// Target types of `CAST`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    String,
    Number,
    Boolean,
}

impl CastType {
    /// Parses a type name as written in a query
    pub fn from_name(name: &str) -> Option<CastType> {
        match name.to_lowercase().as_str() {
            "string" | "varchar" | "text" | "char" => Some(CastType::String),
            "number" | "int" | "integer" | "bigint" | "float" | "double" | "decimal"
            | "numeric" | "real" => Some(CastType::Number),
            "boolean" | "bool" => Some(CastType::Boolean),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CastType::String => "string",
            CastType::Number => "number",
            CastType::Boolean => "boolean",
        }
    }

    /// Converts a value to this type. Null stays Null.
    pub fn apply(&self, value: &Value) -> ExpressionResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            CastType::String => Ok(Value::String(value.to_string())),
            CastType::Boolean => Ok(value.truthiness().map_or(Value::Null, Value::Boolean)),
            CastType::Number => match value {
                Value::Number(n) => Ok(Value::Number(*n)),
                Value::Boolean(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
                Value::String(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        Ok(Value::Number(0.0))
                    } else {
                        Ok(trimmed.parse::<f64>().map_or(Value::Null, Value::Number))
                    }
                }
                other => Err(ExpressionError::InvalidCast {
                    value: other.to_string(),
                    target: self.name().to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
