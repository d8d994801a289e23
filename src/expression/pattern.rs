//! LIKE and RLIKE pattern matching.
//!
//! LIKE patterns are translated into anchored regular expressions:
//! `%` matches any run of characters, `_` any single character and a
//! backslash makes the next character literal. RLIKE patterns are regular
//! expressions searched anywhere in the subject.
//!
//! Compiled patterns are cached per statement in a [`PatternCache`].

use crate::access::{DataType, Value};
use crate::expression::error::{ExpressionError, ExpressionResult};
use regex::{escape, Regex};
use std::collections::HashMap;

/// Flavour of a pattern match expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Like,
    Rlike,
}

impl PatternKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            PatternKind::Like => "like",
            PatternKind::Rlike => "rlike",
        }
    }
}

/// Converts a LIKE pattern into an anchored regular expression
pub fn like_pattern_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push_str("(?s)^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => regex.push_str(&escape(&escaped.to_string())),
                None => regex.push_str(&escape("\\")),
            },
            other => regex.push_str(&escape(&other.to_string())),
        }
    }
    regex.push('$');
    regex
}

/// Compiled patterns keyed by kind and pattern text
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<(PatternKind, String), Regex>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches `subject` against `pattern`. Null on either side yields Null;
    /// any other non-string operand is a type error.
    pub fn matches(
        &mut self,
        kind: PatternKind,
        subject: &Value,
        pattern: &Value,
    ) -> ExpressionResult<Value> {
        let (subject, pattern) = match (subject, pattern) {
            (Value::Null, _) | (_, Value::Null) => return Ok(Value::Null),
            (Value::String(s), Value::String(p)) => (s, p),
            (Value::String(_), other) | (other, _) => {
                return Err(ExpressionError::TypeMismatch {
                    expected: DataType::String,
                    actual: other.type_name(),
                    context: kind.keyword().to_string(),
                })
            }
        };

        let key = (kind, pattern.clone());
        if !self.compiled.contains_key(&key) {
            let source = match kind {
                PatternKind::Like => like_pattern_to_regex(pattern),
                PatternKind::Rlike => pattern.clone(),
            };
            let regex = Regex::new(&source).map_err(|e| ExpressionError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            self.compiled.insert(key.clone(), regex);
        }

        Ok(Value::Boolean(
            self.compiled
                .get(&key)
                .map_or(false, |regex| regex.is_match(subject)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(cache: &mut PatternCache, subject: &str, pattern: &str) -> Value {
        cache
            .matches(PatternKind::Like, &Value::from(subject), &Value::from(pattern))
            .unwrap()
    }

    #[test]
    fn test_like_to_regex() {
        assert_eq!(like_pattern_to_regex("%三"), "(?s)^.*三$");
        assert_eq!(like_pattern_to_regex("a_c"), "(?s)^a.c$");
        assert_eq!(like_pattern_to_regex("50\\%"), "(?s)^50%$");
        assert_eq!(like_pattern_to_regex("a.b"), "(?s)^a\\.b$");
    }

    #[test]
    fn test_like_matching() {
        let mut cache = PatternCache::new();
        assert_eq!(like(&mut cache, "张三", "%三"), Value::Boolean(true));
        assert_eq!(like(&mut cache, "张三丰", "%三"), Value::Boolean(false));
        assert_eq!(like(&mut cache, "abc", "a_c"), Value::Boolean(true));
        assert_eq!(like(&mut cache, "a.c", "a.c"), Value::Boolean(true));
        assert_eq!(like(&mut cache, "abc", "a.c"), Value::Boolean(false));
        assert_eq!(like(&mut cache, "50%", "50\\%"), Value::Boolean(true));
        assert_eq!(like(&mut cache, "500", "50\\%"), Value::Boolean(false));
    }

    #[test]
    fn test_rlike_is_unanchored() {
        let mut cache = PatternCache::new();
        let result = cache
            .matches(PatternKind::Rlike, &Value::from("order-42"), &Value::from("[0-9]+"))
            .unwrap();
        assert_eq!(result, Value::Boolean(true));
    }

    #[test]
    fn test_null_and_type_errors() {
        let mut cache = PatternCache::new();
        assert_eq!(
            cache
                .matches(PatternKind::Like, &Value::Null, &Value::from("%"))
                .unwrap(),
            Value::Null
        );
        assert!(matches!(
            cache.matches(PatternKind::Like, &Value::from(1), &Value::from("%")),
            Err(ExpressionError::TypeMismatch { .. })
        ));
        assert!(matches!(
            cache.matches(PatternKind::Rlike, &Value::from("a"), &Value::from("(")),
            Err(ExpressionError::InvalidPattern { .. })
        ));
    }
}
