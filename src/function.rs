//! User-defined and built-in functions.
//!
//! A function is registered under a name with one of three shapes:
//!
//! - **Scalar**: positional arguments of one row to one value
//! - **Aggregate**: one argument tuple per row of a group, plus whether the
//!   group is empty and the optional set quantifier, to one value
//! - **Window**: one argument tuple per row of an ordered partition, plus the
//!   window specification and the resolved ORDER BY keys, to one value per row
//!
//! Handlers report failures through `anyhow`; the executor wraps them into an
//! execution error naming the function.

pub mod aggregate;
pub mod scalar;
pub mod window;

use crate::access::Value;
use crate::expression::{SetQuantifier, WindowSpec};
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type ScalarHandler = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;
pub type AggregateHandler =
    Arc<dyn Fn(&[Vec<Value>], bool, Option<SetQuantifier>) -> Result<Value> + Send + Sync>;
pub type WindowHandler = Arc<dyn Fn(&[Vec<Value>], &WindowFrame<'_>) -> Result<Vec<Value>> + Send + Sync>;

/// Partition information handed to window handlers
pub struct WindowFrame<'a> {
    pub spec: &'a WindowSpec,
    /// ORDER BY key tuple of every partition row, in sorted order
    pub order_keys: &'a [Vec<Value>],
}

/// Shape of a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Scalar,
    Aggregate,
    Window,
}

#[derive(Clone)]
pub enum Function {
    Scalar(ScalarHandler),
    Aggregate(AggregateHandler),
    Window(WindowHandler),
}

impl Function {
    pub fn scalar<F>(handler: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Function::Scalar(Arc::new(handler))
    }

    pub fn aggregate<F>(handler: F) -> Self
    where
        F: Fn(&[Vec<Value>], bool, Option<SetQuantifier>) -> Result<Value> + Send + Sync + 'static,
    {
        Function::Aggregate(Arc::new(handler))
    }

    pub fn window<F>(handler: F) -> Self
    where
        F: Fn(&[Vec<Value>], &WindowFrame<'_>) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        Function::Window(Arc::new(handler))
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Function::Scalar(_) => FunctionKind::Scalar,
            Function::Aggregate(_) => FunctionKind::Aggregate,
            Function::Window(_) => FunctionKind::Window,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function::{:?}", self.kind())
    }
}

/// Functions by case-insensitive name
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in library
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        scalar::register(&mut registry);
        aggregate::register(&mut registry);
        window::register(&mut registry);
        registry
    }

    /// Registers `function` under `name`, returning the function it replaced
    pub fn register(&mut self, name: &str, function: Function) -> Option<Function> {
        self.functions.insert(name.to_lowercase(), function)
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::with_builtins();
        for name in [
            "round", "concat", "split", "count", "sum", "avg", "max", "min", "row_number", "rank",
        ] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
        assert_eq!(registry.get("COUNT").map(Function::kind), Some(FunctionKind::Aggregate));
        assert_eq!(registry.get("rank").map(Function::kind), Some(FunctionKind::Window));
        assert_eq!(registry.get("round").map(Function::kind), Some(FunctionKind::Scalar));
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = FunctionRegistry::with_builtins();
        let replaced = registry.register("round", Function::scalar(|_| Ok(Value::Null)));
        assert!(replaced.is_some());
        let function = registry.get("round").cloned();
        match function {
            Some(Function::Scalar(handler)) => {
                assert_eq!(handler(&[Value::from(1.5)]).unwrap(), Value::Null)
            }
            other => panic!("Expected scalar function, got {:?}", other),
        }
        assert!(registry.register("twice", Function::scalar(|_| Ok(Value::Null))).is_none());
    }
}
