//! Memoized evaluation of one expression node against one row.
//!
//! Results of every node other than literals, field accesses and aliases are
//! stored in the row's memo under the node label. The memo is consulted
//! before evaluating, followed by the group keys saved by GROUP BY, so an
//! expression that was already computed by an earlier clause (a grouping
//! expression, a selected alias referenced by ORDER BY) is not recomputed.

use super::context::{ExecutionContext, Frame};
use super::error::{ExecutionError, ExecutionResult};
use crate::access::{DataType, Value};
use crate::expression::{Expr, ExprKind, ExpressionError, SetQuantifier};
use crate::function::{AggregateHandler, Function};
use std::sync::Arc;

pub(crate) fn function_error(name: &str, error: anyhow::Error) -> ExecutionError {
    ExecutionError::Function {
        name: name.to_string(),
        message: error.to_string(),
    }
}

impl<'a> ExecutionContext<'a> {
    /// Evaluates `expr` at `row`. `in_aggregate` is set while computing the
    /// arguments of an aggregate call, where plain columns are allowed.
    pub fn evaluate(&mut self, expr: &Expr, row: usize, in_aggregate: bool) -> ExecutionResult<Value> {
        let memoized = expr.is_memoized() && !matches!(expr.kind, ExprKind::Alias { .. });
        if memoized {
            if let Some(value) = self.memo_get(row, &expr.label) {
                return Ok(value);
            }
        }
        let value = self.evaluate_node(expr, row, in_aggregate)?;
        if memoized {
            self.memo_put(row, &expr.label, &value);
        }
        Ok(value)
    }

    fn evaluate_node(&mut self, expr: &Expr, row: usize, in_aggregate: bool) -> ExecutionResult<Value> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Field(name) => {
                let alias = self.resolve_field(name)?;
                let value = self
                    .frame
                    .view(alias)
                    .map_or(Value::Null, |view| view.value(row, name));
                if !in_aggregate {
                    self.saw_plain_column = true;
                }
                Ok(value)
            }
            ExprKind::QualifiedField { table, field } => {
                let value = match self.frame.view(table) {
                    Some(view) if view.has_field(field) => view.value(row, field),
                    Some(_) => {
                        return Err(ExecutionError::UnknownTableField {
                            table: table.clone(),
                            field: field.clone(),
                        })
                    }
                    None if self.aggregate_bootstrapped => {
                        return Err(ExecutionError::MixedAggregate)
                    }
                    None => return Err(ExecutionError::UnknownTable(table.clone())),
                };
                if !in_aggregate {
                    self.saw_plain_column = true;
                }
                Ok(value)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.evaluate(left, row, in_aggregate)?;
                let right = self.evaluate(right, row, in_aggregate)?;
                Ok(op.apply(&left, &right)?)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand, row, in_aggregate)?;
                Ok(op.apply(&value)?)
            }
            ExprKind::IsNull { operand, negated } => {
                let value = self.evaluate(operand, row, in_aggregate)?;
                Ok(Value::Boolean(value.is_null() != *negated))
            }
            ExprKind::InList {
                operand,
                list,
                negated,
            } => {
                let probe = self.evaluate(operand, row, in_aggregate)?;
                if probe.is_null() {
                    return Ok(Value::Null);
                }
                let mut saw_null = false;
                for candidate in list {
                    let candidate = self.evaluate(candidate, row, in_aggregate)?;
                    if candidate.is_null() {
                        saw_null = true;
                    } else if probe.sql_eq(&candidate) {
                        return Ok(Value::Boolean(!*negated));
                    }
                }
                if saw_null {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Boolean(*negated))
                }
            }
            ExprKind::Pattern {
                kind,
                operand,
                pattern,
                negated,
            } => {
                let subject = self.evaluate(operand, row, in_aggregate)?;
                let pattern = self.evaluate(pattern, row, in_aggregate)?;
                match self.patterns.matches(*kind, &subject, &pattern)? {
                    Value::Boolean(matched) => Ok(Value::Boolean(matched != *negated)),
                    other => Ok(other),
                }
            }
            ExprKind::Cast { operand, target } => {
                let value = self.evaluate(operand, row, in_aggregate)?;
                Ok(target.apply(&value)?)
            }
            ExprKind::Case {
                operand,
                branches,
                else_result,
            } => {
                let base = match operand {
                    Some(operand) => Some(self.evaluate(operand, row, in_aggregate)?),
                    None => None,
                };
                for (when, then) in branches {
                    let condition = self.evaluate(when, row, in_aggregate)?;
                    let taken = match &base {
                        // Null never matches in the simple form
                        Some(base) => base.sql_eq(&condition),
                        None => condition == Value::Boolean(true),
                    };
                    if taken {
                        return self.evaluate(then, row, in_aggregate);
                    }
                }
                match else_result {
                    Some(else_result) => self.evaluate(else_result, row, in_aggregate),
                    None => Ok(Value::Null),
                }
            }
            ExprKind::Index { base, index } => {
                let base = self.evaluate(base, row, in_aggregate)?;
                let index = self.evaluate(index, row, in_aggregate)?;
                index_value(&base, &index)
            }
            ExprKind::Alias { inner, .. } => self.evaluate(inner, row, in_aggregate),
            // an empty source never computes windows; its placeholder row is dropped
            ExprKind::Window(_) if self.source_empty => Ok(Value::Null),
            ExprKind::Window(_) => self
                .frame
                .window_results
                .get(row)
                .and_then(|results| results.get(&expr.label))
                .cloned()
                .ok_or_else(|| ExecutionError::MissingWindowResult(expr.label.clone())),
            ExprKind::Call {
                name,
                args,
                quantifier,
            } => self.evaluate_call(name, args, *quantifier, row, in_aggregate),
        }
    }

    fn evaluate_call(
        &mut self,
        name: &str,
        args: &[Expr],
        quantifier: Option<SetQuantifier>,
        row: usize,
        in_aggregate: bool,
    ) -> ExecutionResult<Value> {
        if quantifier == Some(SetQuantifier::All) {
            return Err(ExecutionError::AllNotSupported);
        }
        let functions = self.functions();
        let function = functions
            .get(name)
            .ok_or_else(|| ExecutionError::UnknownFunction(name.to_string()))?;

        match function {
            Function::Scalar(handler) => {
                if let Some(quantifier) = quantifier {
                    return Err(ExecutionError::UnsupportedModifier {
                        function: name.to_string(),
                        modifier: quantifier.to_string(),
                    });
                }
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg, row, in_aggregate))
                    .collect::<ExecutionResult<Vec<_>>>()?;
                handler(&values).map_err(|e| function_error(name, e))
            }
            Function::Aggregate(handler) => {
                let group = self.current_group(row)?;
                self.aggregate_over(name, handler, args, quantifier, &group)
            }
            Function::Window(_) => Err(ExecutionError::MissingOver(name.to_string())),
        }
    }

    /// Group of `row`. Without GROUP BY the first aggregate call turns the
    /// whole input into one implicit group and collapses the context to a
    /// single row.
    pub(crate) fn current_group(&mut self, row: usize) -> ExecutionResult<Arc<Frame>> {
        if let Some(group) = self.frame.groups.get(row).cloned().flatten() {
            self.aggregated = true;
            return Ok(group);
        }
        if self.saw_plain_column {
            return Err(ExecutionError::MixedAggregate);
        }

        let group = if self.source_empty {
            self.frame.empty_like()
        } else {
            self.frame.clone()
        };
        let group = Arc::new(group);

        let len = self.frame.len().min(1);
        let kept: Vec<usize> = (0..len).collect();
        let mut frame = self.frame.take(&kept);
        frame.views.clear();
        frame.groups = vec![Some(Arc::clone(&group)); len];
        self.frame = frame;
        self.memo.truncate(len);
        self.rebuild_field_tables();
        self.aggregate_bootstrapped = true;
        self.aggregated = true;
        Ok(group)
    }

    /// Runs an aggregate handler over every row of `group`
    pub(crate) fn aggregate_over(
        &self,
        name: &str,
        handler: &AggregateHandler,
        args: &[Expr],
        quantifier: Option<SetQuantifier>,
        group: &Frame,
    ) -> ExecutionResult<Value> {
        let mut sub = ExecutionContext::from_frame(self.functions(), group.clone());
        let mut tuples = Vec::with_capacity(sub.row_size());
        let mut i = 0;
        while i < sub.row_size() {
            let tuple = args
                .iter()
                .map(|arg| sub.evaluate(arg, i, true))
                .collect::<ExecutionResult<Vec<_>>>()?;
            tuples.push(tuple);
            i += 1;
        }
        handler(&tuples, group.is_empty(), quantifier).map_err(|e| function_error(name, e))
    }
}

fn index_value(base: &Value, index: &Value) -> ExecutionResult<Value> {
    let position = match index {
        Value::Null => return Ok(Value::Null),
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => *n as usize,
        Value::Number(_) => return Ok(Value::Null),
        other => {
            return Err(ExpressionError::TypeMismatch {
                expected: DataType::Number,
                actual: other.type_name(),
                context: "index".to_string(),
            }
            .into())
        }
    };
    match base {
        Value::Null => Ok(Value::Null),
        Value::List(items) => Ok(items.get(position).cloned().unwrap_or(Value::Null)),
        Value::String(s) => Ok(s
            .chars()
            .nth(position)
            .map_or(Value::Null, |c| Value::String(c.to_string()))),
        other => Err(ExpressionError::TypeMismatch {
            expected: DataType::List,
            actual: other.type_name(),
            context: "index".to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Row, TableView};
    use crate::expression::{BinaryOperator, CastType, PatternKind, UnaryOperator};
    use crate::function::FunctionRegistry;

    fn users() -> TableView {
        let rows: Vec<Row> = [
            (1, "张三", Some("北京"), 95),
            (2, "李四", None, 82),
            (3, "王五", Some("北京"), 91),
        ]
        .iter()
        .map(|(id, name, city, score)| {
            let mut row = Row::new();
            row.insert("id".to_string(), Value::from(*id));
            row.insert("name".to_string(), Value::from(*name));
            row.insert("city".to_string(), Value::from(*city));
            row.insert("score".to_string(), Value::from(*score));
            row
        })
        .collect();
        TableView::new(rows, None)
    }

    fn lit(value: impl Into<Value>) -> Expr {
        Expr::literal(value.into())
    }

    #[test]
    fn test_fields_and_arithmetic() -> ExecutionResult<()> {
        let functions = FunctionRegistry::with_builtins();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        let expr = Expr::binary(BinaryOperator::Add, Expr::field("score"), lit(5));
        assert_eq!(context.evaluate(&expr, 0, false)?, Value::from(100));
        assert_eq!(
            context.evaluate(&Expr::qualified_field("u", "name"), 2, false)?,
            Value::from("王五")
        );
        assert!(matches!(
            context.evaluate(&Expr::qualified_field("u", "nope"), 0, false),
            Err(ExecutionError::UnknownTableField { .. })
        ));
        assert!(matches!(
            context.evaluate(&Expr::qualified_field("x", "id"), 0, false),
            Err(ExecutionError::UnknownTable(_))
        ));
        assert!(context.saw_plain_column);
        Ok(())
    }

    #[test]
    fn test_memo_short_circuits_evaluation() -> ExecutionResult<()> {
        let functions = FunctionRegistry::with_builtins();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        let expr = Expr::binary(BinaryOperator::Mul, Expr::field("score"), lit(2));
        context.memo_put(1, &expr.label, &Value::from(-1));
        assert_eq!(context.evaluate(&expr, 1, false)?, Value::from(-1));
        assert_eq!(context.evaluate(&expr, 0, false)?, Value::from(190));
        assert_eq!(context.memo_get(0, &expr.label), Some(Value::from(190)));
        Ok(())
    }

    #[test]
    fn test_in_list_with_nulls() -> ExecutionResult<()> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        let with_null = vec![lit(2), Expr::literal(Value::Null)];
        let in_expr = Expr::in_list(Expr::field("id"), with_null.clone(), false);
        let not_in = Expr::in_list(Expr::field("id"), with_null, true);
        assert_eq!(context.evaluate(&in_expr, 0, false)?, Value::Null);
        assert_eq!(context.evaluate(&not_in, 0, false)?, Value::Null);
        assert_eq!(context.evaluate(&in_expr, 1, false)?, Value::Boolean(true));
        assert_eq!(context.evaluate(&not_in, 1, false)?, Value::Boolean(false));

        let plain = Expr::in_list(Expr::field("id"), vec![lit(7)], true);
        assert_eq!(context.evaluate(&plain, 0, false)?, Value::Boolean(true));
        let probe_null = Expr::in_list(Expr::field("city"), vec![lit("北京")], false);
        assert_eq!(context.evaluate(&probe_null, 1, false)?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_null_logic_and_predicates() -> ExecutionResult<()> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        let city_is_beijing = Expr::binary(BinaryOperator::Eq, Expr::field("city"), lit("北京"));
        let and_false = Expr::binary(BinaryOperator::And, city_is_beijing.clone(), lit(false));
        let or_true = Expr::binary(BinaryOperator::Or, city_is_beijing.clone(), lit(true));
        assert_eq!(context.evaluate(&city_is_beijing, 1, false)?, Value::Null);
        assert_eq!(context.evaluate(&and_false, 1, false)?, Value::Boolean(false));
        assert_eq!(context.evaluate(&or_true, 1, false)?, Value::Boolean(true));
        assert_eq!(
            context.evaluate(&Expr::unary(UnaryOperator::Not, city_is_beijing), 1, false)?,
            Value::Null
        );
        assert_eq!(
            context.evaluate(&Expr::is_null(Expr::field("city"), false), 1, false)?,
            Value::Boolean(true)
        );

        let like = Expr::pattern(PatternKind::Like, Expr::field("name"), lit("%三"), false);
        let not_like = Expr::pattern(PatternKind::Like, Expr::field("name"), lit("%三"), true);
        assert_eq!(context.evaluate(&like, 0, false)?, Value::Boolean(true));
        assert_eq!(context.evaluate(&not_like, 0, false)?, Value::Boolean(false));
        let like_number = Expr::pattern(PatternKind::Like, Expr::field("id"), lit("1"), false);
        assert!(context.evaluate(&like_number, 0, false).is_err());
        Ok(())
    }

    #[test]
    fn test_case_cast_and_index() -> ExecutionResult<()> {
        let functions = FunctionRegistry::new();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        let searched = Expr::case(
            None,
            vec![(
                Expr::binary(BinaryOperator::Gt, Expr::field("score"), lit(90)),
                lit("A"),
            )],
            Some(lit("B")),
        );
        assert_eq!(context.evaluate(&searched, 0, false)?, Value::from("A"));
        assert_eq!(context.evaluate(&searched, 1, false)?, Value::from("B"));

        let simple = Expr::case(
            Some(Expr::field("city")),
            vec![(lit("北京"), lit(1)), (Expr::literal(Value::Null), lit(2))],
            None,
        );
        assert_eq!(context.evaluate(&simple, 0, false)?, Value::from(1));
        assert_eq!(context.evaluate(&simple, 1, false)?, Value::Null);

        let cast = Expr::cast(Expr::field("id"), CastType::String);
        assert_eq!(context.evaluate(&cast, 0, false)?, Value::from("1"));

        let index = Expr::index(Expr::field("name"), lit(1));
        assert_eq!(context.evaluate(&index, 0, false)?, Value::from("三"));
        let out_of_range = Expr::index(Expr::field("name"), lit(5));
        assert_eq!(context.evaluate(&out_of_range, 0, false)?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_calls() -> ExecutionResult<()> {
        let functions = FunctionRegistry::with_builtins();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        let round = Expr::call("round", vec![lit(2.5)], None);
        assert_eq!(context.evaluate(&round, 0, false)?, Value::from(3));
        assert!(matches!(
            context.evaluate(&Expr::call("nope", vec![], None), 0, false),
            Err(ExecutionError::UnknownFunction(_))
        ));
        assert!(matches!(
            context.evaluate(
                &Expr::call("round", vec![lit(1)], Some(SetQuantifier::Distinct)),
                0,
                false
            ),
            Err(ExecutionError::UnsupportedModifier { .. })
        ));
        assert!(matches!(
            context.evaluate(&Expr::call("rank", vec![], None), 0, false),
            Err(ExecutionError::MissingOver(_))
        ));
        assert!(matches!(
            context.evaluate(&Expr::call("concat", vec![lit(1)], Some(SetQuantifier::All)), 0, false),
            Err(ExecutionError::AllNotSupported)
        ));
        Ok(())
    }

    #[test]
    fn test_implicit_aggregate_group() -> ExecutionResult<()> {
        let functions = FunctionRegistry::with_builtins();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        let max = Expr::call("max", vec![Expr::field("score")], None);
        assert_eq!(context.evaluate(&max, 0, false)?, Value::from(95));
        assert!(context.aggregate_bootstrapped);
        assert_eq!(context.row_size(), 1);
        assert_eq!(
            context.evaluate(&Expr::call_star("count"), 0, false)?,
            Value::from(3)
        );
        assert!(matches!(
            context.evaluate(&Expr::field("name"), 0, false),
            Err(ExecutionError::MixedAggregate)
        ));
        Ok(())
    }

    #[test]
    fn test_plain_column_then_aggregate_is_rejected() -> ExecutionResult<()> {
        let functions = FunctionRegistry::with_builtins();
        let mut context = ExecutionContext::new(&functions);
        context.add_view("u", users())?;

        context.evaluate(&Expr::field("name"), 0, false)?;
        assert!(matches!(
            context.evaluate(&Expr::call_star("count"), 0, false),
            Err(ExecutionError::MixedAggregate)
        ));
        Ok(())
    }
}
