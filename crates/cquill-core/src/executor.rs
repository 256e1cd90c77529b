use crate::{
    error::Error, options::Options, scanner::RowScanner, statement::SelectStatement,
    statement::Statement,
};

///
/// QueryExecutor
///
/// Execution surface the recipes talk to. The in-memory mock implements
/// it directly; a wire driver adapter implements the same two calls.
///

pub trait QueryExecutor: Send + Sync {
    /// Run a write statement.
    fn execute(&self, options: &Options, statement: &Statement) -> Result<(), Error>;

    /// Run a read statement and hand its row iterator to the scanner.
    fn query(
        &self,
        options: &Options,
        statement: &SelectStatement,
        scanner: &mut dyn RowScanner,
    ) -> Result<(), Error>;
}
