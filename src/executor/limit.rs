//! LIMIT and OFFSET.

use super::context::ExecutionContext;
use crate::expression::LimitClause;

impl<'a> ExecutionContext<'a> {
    /// Keeps `count` rows starting at `offset`. Memo entries stay with
    /// their rows.
    pub fn limit(&mut self, limit: &LimitClause) {
        let len = self.row_size();
        let start = limit.offset.min(len);
        let end = match limit.count {
            Some(count) => start.saturating_add(count).min(len),
            None => len,
        };
        let kept: Vec<usize> = (start..end).collect();
        self.reorder(&kept);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Value;
    use crate::executor::error::ExecutionResult;
    use crate::executor::testing::users;
    use crate::expression::Expr;
    use crate::function::FunctionRegistry;

    fn ids_after(limit: LimitClause) -> ExecutionResult<Vec<Value>> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("users", users())?;
        context.limit(&limit);
        (0..context.row_size())
            .map(|row| context.evaluate(&Expr::field("id"), row, false))
            .collect()
    }

    #[test]
    fn test_limit_and_offset() -> ExecutionResult<()> {
        assert_eq!(
            ids_after(LimitClause::new(0, Some(3)))?,
            vec![Value::from(1), Value::from(2), Value::from(3)]
        );
        assert_eq!(
            ids_after(LimitClause::new(4, Some(10)))?,
            vec![Value::from(5), Value::from(6)]
        );
        assert!(ids_after(LimitClause::new(9, Some(1)))?.is_empty());
        assert_eq!(ids_after(LimitClause::new(5, None))?, vec![Value::from(6)]);
        assert!(ids_after(LimitClause::new(0, Some(0)))?.is_empty());
        Ok(())
    }
}
