use crate::{context::Context, error::Error, scanner::Scannable, value::Value};
use std::collections::BTreeMap;

///
/// MockIterator
///
/// Produces rows from a slice of column maps. Cells are located by
/// lowercased column name; a missing cell scans as `Null`, which lands
/// as the target field's zero value. Cancellation is observed between
/// rows.
///

#[derive(Debug, Default)]
pub struct MockIterator {
    rows: Vec<BTreeMap<String, Value>>,
    columns: Vec<String>,
    cursor: usize,
    started: bool,
    context: Context,
    error: Option<Error>,
}

impl MockIterator {
    #[must_use]
    pub fn new(rows: Vec<BTreeMap<String, Value>>, columns: Vec<String>) -> Self {
        Self {
            rows,
            columns,
            cursor: 0,
            started: false,
            context: Context::default(),
            error: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Zero-based index of the current row; meaningless before the
    /// first `next`.
    #[must_use]
    pub const fn current_row_index(&self) -> usize {
        self.cursor
    }

    /// Rewind to before the first row.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.started = false;
        self.error = None;
    }
}

impl Scannable for MockIterator {
    fn next(&mut self) -> bool {
        if self.context.is_cancelled() {
            self.error = Some(Error::Cancelled);
            return false;
        }

        if !self.started {
            self.started = true;
            return !self.rows.is_empty();
        }
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
            return true;
        }
        false
    }

    fn scan(&mut self, out: &mut [Value]) -> Result<(), Error> {
        if out.len() != self.columns.len() {
            return Err(Error::scan(format!(
                "expected {} scan targets, got {}",
                self.columns.len(),
                out.len()
            )));
        }

        let Some(row) = self.rows.get(self.cursor) else {
            return Err(Error::scan("scan called before next"));
        };

        for (slot, column) in out.iter_mut().zip(self.columns.iter()) {
            *slot = row
                .get(&column.to_lowercase())
                .cloned()
                .unwrap_or(Value::Null);
        }
        Ok(())
    }

    fn err(&self) -> Option<Error> {
        self.error.clone()
    }
}
