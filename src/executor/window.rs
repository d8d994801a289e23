//! Window functions.
//!
//! Rows are partitioned with [`GroupMode::Frame`], every partition is sorted
//! in its own context and the function is evaluated there. Results are
//! written back to the frame's window result channel of the row they belong
//! to, so the row order of the calling context is left untouched. Rows are
//! not regathered partition by partition; a caller that wants that order
//! sorts on the partition and order keys itself.
//!
//! Over an empty row set nothing is computed and window expressions
//! evaluate to Null on the placeholder row of the projection.
//!
//! Aggregate functions are evaluated over the ROWS frame of each row. Both
//! bounds are inclusive and clamped into the partition; a frame whose start
//! lies past its end after clamping is rejected, one that is merely empty
//! aggregates an empty group.

use super::aggregate::GroupMode;
use super::context::ExecutionContext;
use super::error::{ExecutionError, ExecutionResult};
use super::evaluate::function_error;
use crate::expression::{ExprKind, SetQuantifier, WindowSpec};
use crate::function::{Function, WindowFrame};
use log::debug;

impl<'a> ExecutionContext<'a> {
    /// Computes the window `spec` for every row under `label`. Does nothing
    /// when the result is already present.
    pub fn window_function(&mut self, spec: &WindowSpec, label: &str) -> ExecutionResult<()> {
        if self.row_size() == 0 {
            return Ok(());
        }
        if self
            .frame
            .window_results
            .first()
            .map_or(false, |results| results.contains_key(label))
        {
            return Ok(());
        }

        let ExprKind::Call {
            name,
            args,
            quantifier,
        } = &spec.call.kind
        else {
            return Err(ExecutionError::NotWindowFunction(spec.call.label.clone()));
        };
        if *quantifier == Some(SetQuantifier::All) {
            return Err(ExecutionError::AllNotSupported);
        }
        let functions = self.functions();
        let function = functions
            .get(name)
            .ok_or_else(|| ExecutionError::UnknownFunction(name.clone()))?;
        match function {
            Function::Scalar(_) => return Err(ExecutionError::NotWindowFunction(name.clone())),
            Function::Window(_) => {
                if let Some(quantifier) = quantifier {
                    return Err(ExecutionError::UnsupportedModifier {
                        function: name.clone(),
                        modifier: quantifier.to_string(),
                    });
                }
            }
            Function::Aggregate(_) => {}
        }

        let partitions = self.group_by(&spec.partition, GroupMode::Frame)?;
        debug!("window {} over {} partitions", label, partitions.len());

        for partition in &partitions {
            let mut sub = ExecutionContext::from_frame(functions, partition.frame.as_ref().clone());
            let len = sub.row_size();
            let (permutation, order_keys) = if spec.order.is_empty() {
                ((0..len).collect(), vec![Vec::new(); len])
            } else {
                let outcome = sub.order_by(&spec.order)?;
                (outcome.permutation, outcome.keys)
            };

            let values = match function {
                Function::Aggregate(handler) => {
                    if spec.frame.is_whole_partition() {
                        let value = sub.aggregate_over(name, handler, args, *quantifier, &sub.frame)?;
                        vec![value; len]
                    } else {
                        let mut values = Vec::with_capacity(len);
                        for position in 0..len {
                            let start = spec.frame.start.position(position, len).max(0);
                            let end = spec.frame.end.position(position, len).min(len as i64 - 1) + 1;
                            if start > end {
                                return Err(ExecutionError::InvalidFrame { start, end });
                            }
                            let rows: Vec<usize> = (start as usize..end as usize).collect();
                            let slice = sub.frame.take(&rows);
                            values.push(sub.aggregate_over(name, handler, args, *quantifier, &slice)?);
                        }
                        values
                    }
                }
                Function::Window(handler) => {
                    let mut tuples = Vec::with_capacity(len);
                    for row in 0..len {
                        tuples.push(
                            args.iter()
                                .map(|arg| sub.evaluate(arg, row, false))
                                .collect::<ExecutionResult<Vec<_>>>()?,
                        );
                    }
                    let frame = WindowFrame {
                        spec,
                        order_keys: &order_keys,
                    };
                    let values = handler(&tuples, &frame).map_err(|e| function_error(name, e))?;
                    if values.len() != len {
                        return Err(ExecutionError::Function {
                            name: name.clone(),
                            message: format!("returned {} values for {} rows", values.len(), len),
                        });
                    }
                    values
                }
                Function::Scalar(_) => Vec::new(),
            };

            for (position, value) in values.into_iter().enumerate() {
                let member = permutation
                    .get(position)
                    .and_then(|&p| partition.members.get(p))
                    .copied();
                if let Some(results) = member.and_then(|m| self.frame.window_results.get_mut(m)) {
                    results.insert(label.to_string(), value);
                }
            }
        }
        Ok(())
    }
}
