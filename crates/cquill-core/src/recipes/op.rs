use crate::{
    context::Context,
    error::Error,
    options::Options,
    recipes::TableSpec,
    relation::Relation,
    scanner::RowScanner,
    statement::{
        DeleteStatement, InsertStatement, SelectStatement, SetMap, Statement, UpdateStatement,
    },
    value::Value,
};

///
/// Op
///
/// A lazy database operation: nothing executes until `run`. Ops fold
/// together with [`add`](Self::add); a folded op is a sequence that
/// executes in order against the same executor snapshot and aborts at
/// the first error without rollback. The batch-labeled runners execute
/// the same sequence.
///

pub struct Op<'a> {
    steps: Vec<Step<'a>>,
}

/// The empty operation. Adding ops to it builds a batch from nothing.
#[must_use]
pub fn noop() -> Op<'static> {
    Op { steps: Vec::new() }
}

pub(crate) enum Action<'a> {
    Read(Box<dyn RowScanner + 'a>),
    Insert(Vec<(String, Value)>),
    Update(SetMap),
    Delete,
    /// Construction-time failure deferred to run time.
    Fail(Error),
}

pub(crate) struct Step<'a> {
    pub spec: TableSpec,
    pub relations: Vec<Relation>,
    pub action: Action<'a>,
    pub options: Options,
}

impl<'a> Op<'a> {
    pub(crate) fn single(spec: TableSpec, relations: Vec<Relation>, action: Action<'a>) -> Self {
        Self {
            steps: vec![Step {
                spec,
                relations,
                action,
                options: Options::default(),
            }],
        }
    }

    pub(crate) fn fail(spec: TableSpec, error: Error) -> Self {
        Self::single(spec, Vec::new(), Action::Fail(error))
    }

    /// Append the steps of `other`, preserving order.
    #[must_use]
    pub fn add(mut self, other: Op<'a>) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// Merge per-operation options into every step.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        for step in &mut self.steps {
            step.options = step.options.merge(&options);
        }
        self
    }

    pub fn run(self) -> Result<(), Error> {
        self.run_with_context(Context::new())
    }

    pub fn run_with_context(mut self, context: Context) -> Result<(), Error> {
        for (index, step) in self.steps.iter_mut().enumerate() {
            context.check_cancelled()?;
            if let Some(injector) = context.injector() {
                if let Some(error) = injector.inject(index) {
                    return Err(error);
                }
            }
            step.run(&context)?;
        }
        Ok(())
    }

    /// The interface accepts batch-labeled calls but executes the same
    /// in-order sequence; there is no atomicity.
    pub fn run_logged_batch(self) -> Result<(), Error> {
        self.run()
    }

    pub fn run_logged_batch_with_context(self, context: Context) -> Result<(), Error> {
        self.run_with_context(context)
    }

    pub fn run_atomically(self) -> Result<(), Error> {
        self.run()
    }

    pub fn run_atomically_with_context(self, context: Context) -> Result<(), Error> {
        self.run_with_context(context)
    }

    /// The statements this op would execute, with table defaults and
    /// per-op options merged. Useful for logging and inspection.
    pub fn statements(&self) -> Result<Vec<Statement>, Error> {
        self.steps.iter().map(Step::statement).collect()
    }
}

impl Step<'_> {
    fn merged_options(&self, context: &Context) -> Options {
        self.spec
            .options
            .merge(&self.options)
            .with_context(context.clone())
    }

    fn run(&mut self, context: &Context) -> Result<(), Error> {
        let options = self.merged_options(context);
        match &mut self.action {
            Action::Read(scanner) => {
                let stmt = self.spec.select_statement(&self.relations, &options)?;
                self.spec.executor.query(&options, &stmt, scanner.as_mut())
            }
            Action::Insert(cells) => {
                let stmt = self.spec.insert_statement(cells.clone(), &options)?;
                self.spec.executor.execute(&options, &stmt.into())
            }
            Action::Update(set_map) => {
                let stmt = self
                    .spec
                    .update_statement(set_map.clone(), &self.relations, &options)?;
                self.spec.executor.execute(&options, &stmt.into())
            }
            Action::Delete => {
                let stmt = self.spec.delete_statement(&self.relations)?;
                self.spec.executor.execute(&options, &stmt.into())
            }
            Action::Fail(error) => Err(error.clone()),
        }
    }

    fn statement(&self) -> Result<Statement, Error> {
        let options = self.spec.options.merge(&self.options);
        match &self.action {
            Action::Read(_) => Ok(self.spec.select_statement(&self.relations, &options)?.into()),
            Action::Insert(cells) => Ok(self
                .spec
                .insert_statement(cells.clone(), &options)?
                .into()),
            Action::Update(set_map) => Ok(self
                .spec
                .update_statement(set_map.clone(), &self.relations, &options)?
                .into()),
            Action::Delete => Ok(self.spec.delete_statement(&self.relations)?.into()),
            Action::Fail(error) => Err(error.clone()),
        }
    }
}

impl TableSpec {
    pub(crate) fn select_statement(
        &self,
        relations: &[Relation],
        options: &Options,
    ) -> Result<SelectStatement, Error> {
        let fields = if options.select.is_empty() {
            self.columns.clone()
        } else {
            options.select.clone()
        };
        Ok(SelectStatement::new(
            self.keyspace.clone(),
            self.table.clone(),
            fields,
            relations.to_vec(),
            self.keys.clone(),
        )?
        .with_order_by(options.clustering_order.clone())
        .with_limit(options.limit)
        .with_allow_filtering(options.allow_filtering)
        .with_clustering_sentinel(self.sentinels))
    }

    pub(crate) fn insert_statement(
        &self,
        cells: Vec<(String, Value)>,
        options: &Options,
    ) -> Result<InsertStatement, Error> {
        let mut stmt = InsertStatement::new(
            self.keyspace.clone(),
            self.table.clone(),
            cells,
            self.keys.clone(),
        )?
        .with_clustering_sentinel(self.sentinels);
        if let Some(ttl) = options.ttl {
            stmt = stmt.with_ttl(ttl);
        }
        Ok(stmt)
    }

    pub(crate) fn update_statement(
        &self,
        set_map: SetMap,
        relations: &[Relation],
        options: &Options,
    ) -> Result<UpdateStatement, Error> {
        let mut stmt = UpdateStatement::new(
            self.keyspace.clone(),
            self.table.clone(),
            set_map,
            relations.to_vec(),
            self.keys.clone(),
        )?
        .with_clustering_sentinel(self.sentinels);
        if let Some(ttl) = options.ttl {
            stmt = stmt.with_ttl(ttl);
        }
        Ok(stmt)
    }

    pub(crate) fn delete_statement(&self, relations: &[Relation]) -> Result<DeleteStatement, Error> {
        Ok(DeleteStatement::new(
            self.keyspace.clone(),
            self.table.clone(),
            relations.to_vec(),
            self.keys.clone(),
        )?
        .with_clustering_sentinel(self.sentinels))
    }
}
