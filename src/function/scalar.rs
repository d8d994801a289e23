//! Built-in scalar functions.

use super::{Function, FunctionRegistry};
use crate::access::value::format_number;
use crate::access::Value;
use anyhow::{bail, Result};

/// Most decimals `round(x, d)` renders
const MAX_ROUND_DIGITS: f64 = 100.0;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("round", Function::scalar(round));
    registry.register("concat", Function::scalar(concat));
    registry.register("split", Function::scalar(split));
}

/// `round(x)` rounds half up to an integer; `round(x, d)` renders `x` with
/// `d` decimals as a string.
fn round(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Null] | [Value::Null, _] | [_, Value::Null] => Ok(Value::Null),
        [Value::Number(x)] => Ok(Value::Number((x + 0.5).floor())),
        [Value::Number(x), Value::Number(digits)] => {
            if *digits < 0.0 || digits.fract() != 0.0 {
                bail!("round digits must be a non-negative integer, got {}", format_number(*digits));
            }
            if *digits > MAX_ROUND_DIGITS {
                bail!("round digits must be at most 100, got {}", format_number(*digits));
            }
            Ok(Value::String(format!("{:.*}", *digits as usize, x)))
        }
        [Value::Number(_), other] => {
            bail!("round digits must be a number, got {}", other.type_name())
        }
        [other] | [other, _] => bail!("round expects a number, got {}", other.type_name()),
        _ => bail!("round expects 1 or 2 arguments, got {}", args.len()),
    }
}

/// Concatenates the display form of every argument; Null if any is Null
fn concat(args: &[Value]) -> Result<Value> {
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    Ok(Value::String(args.iter().map(|v| v.to_string()).collect()))
}

/// `split(s, separator)` returns the list of pieces
fn split(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Null, _] | [_, Value::Null] => Ok(Value::Null),
        [Value::String(s), Value::String(separator)] => Ok(Value::List(
            s.split(separator.as_str())
                .map(|piece| Value::String(piece.to_string()))
                .collect(),
        )),
        [a, b] => bail!(
            "split expects (string, string), got ({}, {})",
            a.type_name(),
            b.type_name()
        ),
        _ => bail!("split expects 2 arguments, got {}", args.len()),
    }
}
