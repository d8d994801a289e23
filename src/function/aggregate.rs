//! Built-in aggregate functions.
//!
//! All of them read the first column of the argument tuples, skip Nulls and
//! honour `DISTINCT`. Over an empty group `count` yields 0 and the others
//! yield Null.

use super::{Function, FunctionRegistry};
use crate::access::Value;
use crate::expression::SetQuantifier;
use anyhow::{bail, Result};
use std::cmp::Ordering;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("count", Function::aggregate(count));
    registry.register("sum", Function::aggregate(sum));
    registry.register("avg", Function::aggregate(avg));
    registry.register("max", Function::aggregate(max));
    registry.register("min", Function::aggregate(min));
}

/// Non-null values of the first argument column, deduplicated under DISTINCT
fn column(
    name: &str,
    tuples: &[Vec<Value>],
    quantifier: Option<SetQuantifier>,
) -> Result<Vec<Value>> {
    if tuples.first().map_or(false, Vec::is_empty) {
        bail!("{} requires an argument", name);
    }
    let values = tuples
        .iter()
        .filter_map(|tuple| tuple.first())
        .filter(|v| !v.is_null())
        .cloned();
    match quantifier {
        None => Ok(values.collect()),
        Some(SetQuantifier::Distinct) => {
            let mut distinct: Vec<Value> = Vec::new();
            for value in values {
                if !distinct.iter().any(|seen| seen.sql_eq(&value)) {
                    distinct.push(value);
                }
            }
            Ok(distinct)
        }
        Some(SetQuantifier::All) => bail!("{} does not support the ALL modifier", name),
    }
}

fn numbers(name: &str, values: &[Value]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|v| match v {
            Value::Number(n) => Ok(*n),
            other => bail!("{} expects numbers, got {}", name, other.type_name()),
        })
        .collect()
}

fn count(tuples: &[Vec<Value>], is_empty: bool, quantifier: Option<SetQuantifier>) -> Result<Value> {
    if is_empty {
        return Ok(Value::Number(0.0));
    }
    let values = column("count", tuples, quantifier)?;
    Ok(Value::Number(values.len() as f64))
}

fn sum(tuples: &[Vec<Value>], is_empty: bool, quantifier: Option<SetQuantifier>) -> Result<Value> {
    if is_empty {
        return Ok(Value::Null);
    }
    let values = numbers("sum", &column("sum", tuples, quantifier)?)?;
    if values.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::Number(values.iter().sum()))
}

fn avg(tuples: &[Vec<Value>], is_empty: bool, quantifier: Option<SetQuantifier>) -> Result<Value> {
    if is_empty {
        return Ok(Value::Null);
    }
    let values = numbers("avg", &column("avg", tuples, quantifier)?)?;
    if values.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::Number(values.iter().sum::<f64>() / values.len() as f64))
}

fn extreme(
    name: &str,
    tuples: &[Vec<Value>],
    is_empty: bool,
    quantifier: Option<SetQuantifier>,
    wanted: Ordering,
) -> Result<Value> {
    if is_empty {
        return Ok(Value::Null);
    }
    let mut best: Option<Value> = None;
    for value in column(name, tuples, quantifier)? {
        best = match best {
            None => Some(value),
            Some(current) => match value.partial_compare(&current) {
                Some(ordering) if ordering == wanted => Some(value),
                Some(_) => Some(current),
                None if value.data_type() == current.data_type() => Some(current),
                None => bail!(
                    "{} cannot compare {} with {}",
                    name,
                    value.type_name(),
                    current.type_name()
                ),
            },
        };
    }
    Ok(best.unwrap_or(Value::Null))
}

fn max(tuples: &[Vec<Value>], is_empty: bool, quantifier: Option<SetQuantifier>) -> Result<Value> {
    extreme("max", tuples, is_empty, quantifier, Ordering::Greater)
}

fn min(tuples: &[Vec<Value>], is_empty: bool, quantifier: Option<SetQuantifier>) -> Result<Value> {
    extreme("min", tuples, is_empty, quantifier, Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuples(values: &[Value]) -> Vec<Vec<Value>> {
        values.iter().map(|v| vec![v.clone()]).collect()
    }

    fn scores() -> Vec<Vec<Value>> {
        tuples(&[
            Value::from(95),
            Value::from(91),
            Value::Null,
            Value::from(91),
            Value::from(77),
        ])
    }

    #[test]
    fn test_count() -> Result<()> {
        assert_eq!(count(&scores(), false, None)?, Value::from(4));
        assert_eq!(count(&scores(), false, Some(SetQuantifier::Distinct))?, Value::from(3));
        assert_eq!(count(&[], true, None)?, Value::from(0));
        assert_eq!(count(&tuples(&[Value::Null]), false, None)?, Value::from(0));
        Ok(())
    }

    #[test]
    fn test_sum_and_avg() -> Result<()> {
        assert_eq!(sum(&scores(), false, None)?, Value::from(354));
        assert_eq!(sum(&scores(), false, Some(SetQuantifier::Distinct))?, Value::from(263));
        assert_eq!(avg(&scores(), false, None)?, Value::from(88.5));
        assert_eq!(sum(&[], true, None)?, Value::Null);
        assert_eq!(avg(&tuples(&[Value::Null]), false, None)?, Value::Null);
        assert!(sum(&tuples(&[Value::from("x")]), false, None).is_err());
        Ok(())
    }

    #[test]
    fn test_max_min() -> Result<()> {
        assert_eq!(max(&scores(), false, None)?, Value::from(95));
        assert_eq!(min(&scores(), false, None)?, Value::from(77));
        assert_eq!(max(&tuples(&[Value::from("a"), Value::from("c")]), false, None)?, Value::from("c"));
        assert_eq!(min(&[], true, None)?, Value::Null);
        assert!(max(&tuples(&[Value::from("a"), Value::from(1)]), false, None).is_err());
        Ok(())
    }

    #[test]
    fn test_argument_checks() {
        assert!(count(&[vec![]], false, None).is_err());
        assert!(count(&scores(), false, Some(SetQuantifier::All)).is_err());
    }
}
