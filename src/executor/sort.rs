//! ORDER BY.
//!
//! Sorting is stable and uses [`Value::sort_cmp`] per key, so Null is the
//! smallest value: first when ascending, last when descending.

use super::context::ExecutionContext;
use super::error::ExecutionResult;
use crate::access::Value;
use crate::expression::{OrderItem, SortOrder};
use std::cmp::Ordering;

/// Result of sorting a context
#[derive(Debug, Clone, Default)]
pub struct SortOutcome {
    /// `permutation[i]` is the pre-sort index of the row now at `i`
    pub permutation: Vec<usize>,
    /// Sort key tuple of every row, in sorted order
    pub keys: Vec<Vec<Value>>,
}

fn compare_keys(items: &[OrderItem], a: &[Value], b: &[Value]) -> Ordering {
    for ((item, x), y) in items.iter().zip(a).zip(b) {
        let ordering = match item.order {
            SortOrder::Asc => x.sort_cmp(y),
            SortOrder::Desc => y.sort_cmp(x),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl<'a> ExecutionContext<'a> {
    pub fn order_by(&mut self, items: &[OrderItem]) -> ExecutionResult<SortOutcome> {
        for item in items {
            if let Some((spec, label)) = item.expr.window_spec() {
                self.window_function(spec, label)?;
            }
        }

        let mut keys = Vec::with_capacity(self.row_size());
        let mut row = 0;
        while row < self.row_size() {
            let key = items
                .iter()
                .map(|item| self.evaluate(&item.expr, row, false))
                .collect::<ExecutionResult<Vec<_>>>()?;
            keys.push(key);
            row += 1;
        }
        // An implicit aggregate may have collapsed the rows meanwhile
        keys.truncate(self.row_size());

        let mut permutation: Vec<usize> = (0..keys.len()).collect();
        permutation.sort_by(|&a, &b| compare_keys(items, &keys[a], &keys[b]));

        let mut slots: Vec<Option<Vec<Value>>> = keys.into_iter().map(Some).collect();
        let keys = permutation
            .iter()
            .map(|&i| slots[i].take().unwrap_or_default())
            .collect();
        self.reorder(&permutation);
        self.saw_plain_column = false;
        Ok(SortOutcome { permutation, keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::users;
    use crate::expression::Expr;
    use crate::function::FunctionRegistry;

    fn names(context: &mut ExecutionContext<'_>) -> ExecutionResult<Vec<Value>> {
        (0..context.row_size())
            .map(|row| context.evaluate(&Expr::field("name"), row, false))
            .collect()
    }

    #[test]
    fn test_order_desc_is_stable() -> ExecutionResult<()> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("users", users())?;

        let outcome = context.order_by(&[OrderItem::desc(Expr::field("score"))])?;
        assert_eq!(outcome.permutation, vec![0, 2, 1, 4, 5, 3]);
        assert_eq!(outcome.keys[0], vec![Value::from(95)]);
        assert_eq!(
            names(&mut context)?,
            ["张三", "王五", "李四", "tom", "赵六", "lucy"]
                .iter()
                .map(|&n| Value::from(n))
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_nulls_are_smallest() -> ExecutionResult<()> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("users", users())?;

        let asc = context.order_by(&[OrderItem::asc(Expr::field("city"))])?;
        assert_eq!(asc.keys[0], vec![Value::Null]);
        let desc = context.order_by(&[OrderItem::desc(Expr::field("city"))])?;
        assert_eq!(desc.keys.last(), Some(&vec![Value::Null]));
        Ok(())
    }

    #[test]
    fn test_multiple_keys() -> ExecutionResult<()> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("users", users())?;

        let outcome = context.order_by(&[
            OrderItem::asc(Expr::field("age")),
            OrderItem::desc(Expr::field("score")),
        ])?;
        assert_eq!(outcome.permutation, vec![0, 4, 2, 1, 3, 5]);
        Ok(())
    }

    #[test]
    fn test_memo_follows_rows() -> ExecutionResult<()> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("users", users())?;

        context.memo_put(3, "tag", &Value::from("lucy"));
        context.order_by(&[OrderItem::asc(Expr::field("score"))])?;
        assert_eq!(context.memo_get(0, "tag"), Some(Value::from("lucy")));
        Ok(())
    }
}
