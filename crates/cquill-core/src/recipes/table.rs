use crate::{
    executor::QueryExecutor,
    keys::Keys,
    options::Options,
    record::Record,
    recipes::op::{Action, Op},
    relation::Relation,
    scanner::Scanner,
    statement::SetMap,
};
use std::marker::PhantomData;
use std::sync::Arc;

///
/// TableSpec
///
/// Shared, type-erased table description captured by every recipe:
/// keyspace and physical table name, the record's column list, the key
/// layout, default options, and the executor handle.
///

#[derive(Clone)]
pub(crate) struct TableSpec {
    pub keyspace: String,
    pub table: String,
    pub columns: Vec<String>,
    pub keys: Keys,
    pub options: Options,
    pub sentinels: bool,
    pub executor: Arc<dyn QueryExecutor>,
}

///
/// Table
///
/// The raw recipe: caller-declared keys, relation-based filtering.
/// Everything else wraps this.
///

pub struct Table<T: Record> {
    spec: TableSpec,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Table<T> {
    pub(crate) fn new(
        keyspace: String,
        table: String,
        keys: Keys,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        Self {
            spec: TableSpec {
                keyspace,
                table,
                columns: T::column_names(),
                keys,
                options: Options::default(),
                sentinels: false,
                executor,
            },
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.table
    }

    #[must_use]
    pub fn keys(&self) -> &Keys {
        &self.spec.keys
    }

    /// Merge default options applied to every operation of this table.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.spec.options = self.spec.options.merge(&options);
        self
    }

    /// Enable clustering-sentinel substitution on the statements this
    /// table generates.
    #[must_use]
    pub fn with_clustering_sentinel(mut self, enabled: bool) -> Self {
        self.spec.sentinels = enabled;
        self
    }

    /// Filter rows by relations; all partition keys must be constrained.
    #[must_use]
    pub fn where_(&self, relations: Vec<Relation>) -> Filter<T> {
        Filter {
            spec: self.spec.clone(),
            relations,
            _record: PhantomData,
        }
    }

    /// Upsert the full record by primary key.
    #[must_use]
    pub fn set(&self, record: &T) -> Op<'static> {
        Op::single(self.spec.clone(), Vec::new(), Action::Insert(record.to_cells()))
    }

    pub(crate) fn spec(&self) -> &TableSpec {
        &self.spec
    }
}

///
/// Filter
///
/// A table plus WHERE relations; terminal methods produce lazy ops.
///

pub struct Filter<T: Record> {
    spec: TableSpec,
    relations: Vec<Relation>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Filter<T> {
    /// Read every matching row into `out`, replacing its contents.
    #[must_use]
    pub fn read<'a>(&self, out: &'a mut Vec<T>) -> Op<'a> {
        Op::single(
            self.spec.clone(),
            self.relations.clone(),
            Action::Read(Box::new(Scanner::list(out))),
        )
    }

    /// Read exactly one row; running the op fails with
    /// `Error::RowNotFound` when nothing matches.
    #[must_use]
    pub fn read_one<'a>(&self, out: &'a mut T) -> Op<'a> {
        Op::single(
            self.spec.clone(),
            self.relations.clone(),
            Action::Read(Box::new(Scanner::one(out))),
        )
    }

    /// Update matching rows with literal values and modifiers.
    #[must_use]
    pub fn update(&self, set_map: SetMap) -> Op<'static> {
        Op::single(
            self.spec.clone(),
            self.relations.clone(),
            Action::Update(set_map),
        )
    }

    /// Delete matching rows.
    #[must_use]
    pub fn delete(&self) -> Op<'static> {
        Op::single(self.spec.clone(), self.relations.clone(), Action::Delete)
    }
}
