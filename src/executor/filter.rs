//! WHERE and HAVING.
//!
//! Keeps the rows whose predicate is true; false and Null both drop the row.
//! Every view and channel is reindexed together.

use super::context::ExecutionContext;
use super::error::ExecutionResult;
use crate::expression::Expr;
use log::debug;

impl<'a> ExecutionContext<'a> {
    pub fn filter(&mut self, predicate: &Expr) -> ExecutionResult<()> {
        let mut kept = Vec::new();
        let mut row = 0;
        // An implicit aggregate may collapse the frame while scanning
        while row < self.row_size() {
            if self.evaluate(predicate, row, false)?.truthiness() == Some(true) {
                kept.push(row);
            }
            row += 1;
        }
        debug!(
            "filter {} kept {} of {} rows",
            predicate,
            kept.len(),
            self.row_size()
        );

        let frame = self.frame.take(&kept);
        self.replace_frame(frame);
        self.saw_plain_column = false;
        Ok(())
    }
}
