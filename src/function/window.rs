//! Built-in ranking window functions.

use super::{Function, FunctionRegistry, WindowFrame};
use crate::access::Value;
use anyhow::{bail, Result};
use std::cmp::Ordering;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("row_number", Function::window(row_number));
    registry.register("rank", Function::window(rank));
}

fn reject_arguments(name: &str, tuples: &[Vec<Value>]) -> Result<()> {
    if tuples.first().map_or(false, |tuple| !tuple.is_empty()) {
        bail!("{} takes no arguments", name);
    }
    Ok(())
}

/// Numbers the rows of the ordered partition from 1
fn row_number(tuples: &[Vec<Value>], _frame: &WindowFrame<'_>) -> Result<Vec<Value>> {
    reject_arguments("row_number", tuples)?;
    Ok((1..=tuples.len()).map(|n| Value::Number(n as f64)).collect())
}

/// Rank with gaps: ties share a rank, the next distinct key gets its 1-based
/// position.
fn rank(tuples: &[Vec<Value>], frame: &WindowFrame<'_>) -> Result<Vec<Value>> {
    reject_arguments("rank", tuples)?;
    if frame.spec.order.is_empty() {
        bail!("rank requires an ORDER BY in its window");
    }

    let keys = frame.order_keys;
    let mut ranks = Vec::with_capacity(keys.len());
    let mut current = 1;
    for i in 0..keys.len() {
        if i > 0 && !same_key(&keys[i - 1], &keys[i]) {
            current = i + 1;
        }
        ranks.push(Value::Number(current as f64));
    }
    Ok(ranks)
}

fn same_key(a: &[Value], b: &[Value]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| x.sort_cmp(y) == Ordering::Equal)
}
