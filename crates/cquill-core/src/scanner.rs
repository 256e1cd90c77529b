use crate::{
    error::Error,
    record::Record,
    statement::{strip_sentinel, SelectStatement},
    value::Value,
};

///
/// Scannable
///
/// Row iterator surface the scanner consumes: the wire driver's
/// iterator adapter and the mock iterator both implement it. `scan`
/// fills one slot per selected column for the current row.
///

pub trait Scannable {
    fn next(&mut self) -> bool;

    fn scan(&mut self, out: &mut [Value]) -> Result<(), Error>;

    /// Terminal iterator error, if any, observed after `next` returns
    /// false.
    fn err(&self) -> Option<Error>;
}

///
/// RowScanner
///
/// Object-safe scanning surface handed to executors, which know the
/// statement but not the target record type.
///

pub trait RowScanner {
    /// Bind all rows of `iter` into the target. Returns the number of
    /// rows scanned by this call.
    fn scan_iter(
        &mut self,
        statement: &SelectStatement,
        iter: &mut dyn Scannable,
    ) -> Result<usize, Error>;
}

enum ScanTarget<'a, T> {
    One(&'a mut T),
    List(&'a mut Vec<T>),
}

///
/// Scanner
///
/// Binds result rows into a single record or a vector of records.
///
/// - single target: at most one row is read; zero rows is
///   `Error::RowNotFound`, surplus rows are left unread.
/// - vector target: the vector is replaced, never appended to.
///
/// Clustering sentinels are stripped from every cell before it reaches
/// the record, and null collections land as empty ones.
///

pub struct Scanner<'a, T: Record> {
    target: ScanTarget<'a, T>,
    rows_scanned: usize,
}

impl<'a, T: Record> Scanner<'a, T> {
    pub fn one(target: &'a mut T) -> Self {
        Self {
            target: ScanTarget::One(target),
            rows_scanned: 0,
        }
    }

    pub fn list(target: &'a mut Vec<T>) -> Self {
        Self {
            target: ScanTarget::List(target),
            rows_scanned: 0,
        }
    }

    /// Total rows scanned across all `scan_iter` calls.
    #[must_use]
    pub const fn rows_scanned(&self) -> usize {
        self.rows_scanned
    }

    fn bind_row(
        fields: &[String],
        row: Vec<Value>,
        record: &mut T,
    ) -> Result<(), Error> {
        for (field, cell) in fields.iter().zip(row) {
            let cell = strip_sentinel(&cell);
            // Ok(false) = no matching record field; the cell is swallowed.
            record.put(field, &cell)?;
        }
        Ok(())
    }
}

impl<T: Record> RowScanner for Scanner<'_, T> {
    fn scan_iter(
        &mut self,
        statement: &SelectStatement,
        iter: &mut dyn Scannable,
    ) -> Result<usize, Error> {
        let fields = statement.fields();

        match &mut self.target {
            ScanTarget::One(target) => {
                if !iter.next() {
                    return Err(iter.err().unwrap_or(Error::RowNotFound));
                }
                let mut row = vec![Value::Null; fields.len()];
                iter.scan(&mut row)?;

                let mut record = T::default();
                Self::bind_row(fields, row, &mut record)?;
                **target = record;

                self.rows_scanned += 1;
                Ok(1)
            }
            ScanTarget::List(target) => {
                target.clear();

                let mut scanned = 0;
                while iter.next() {
                    let mut row = vec![Value::Null; fields.len()];
                    iter.scan(&mut row)?;

                    let mut record = T::default();
                    Self::bind_row(fields, row, &mut record)?;
                    target.push(record);
                    scanned += 1;
                }
                if let Some(err) = iter.err() {
                    return Err(err);
                }

                self.rows_scanned += scanned;
                Ok(scanned)
            }
        }
    }
}
