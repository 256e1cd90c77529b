use crate::{
    error::Error,
    mock::{clock::Clock, iterator::MockIterator, store::RowStore},
    options::Options,
    recipes::KeySpace,
    scanner::RowScanner,
    statement::{SelectStatement, Statement},
    types::{Duration, Timestamp},
    value::Value,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

///
/// MockKeySpace
///
/// In-memory executor implementing the same surface as the wire driver.
/// All tables of the keyspace live behind one mutex; concurrent readers
/// and writers serialize. Rows handed out are defensive copies.
///
/// The clock can be frozen (`freeze_time`) so TTL expiry is
/// deterministic in tests.
///

#[derive(Clone)]
pub struct MockKeySpace {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    tables: BTreeMap<String, RowStore>,
    clock: Clock,
}

impl MockKeySpace {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                state: Mutex::new(State::default()),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Recipe constructor surface bound to this executor.
    #[must_use]
    pub fn keyspace(&self) -> KeySpace {
        KeySpace::new(self.inner.name.clone(), Arc::new(self.clone()))
    }

    /// Pin the keyspace clock to a fixed instant.
    pub fn freeze_time(&self, at: Timestamp) {
        self.lock().clock = Clock::Frozen(at);
    }

    /// Move a frozen clock forward; freezes the clock at now + `by`
    /// when it was still following the system clock.
    pub fn advance_time(&self, by: Duration) {
        let mut state = self.lock();
        let now = state.clock.now();
        state.clock = Clock::Frozen(now.saturating_add(by));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner.state.lock().expect("keyspace lock")
    }
}

impl State {
    fn table_mut(
        &mut self,
        table: &str,
        keys: &crate::keys::Keys,
        declared_order: &[crate::keys::ClusteringOrderColumn],
    ) -> &mut RowStore {
        let store = self
            .tables
            .entry(table.to_lowercase())
            .or_insert_with(|| RowStore::new(keys.clone(), declared_order.to_vec()));
        store.set_order(declared_order);
        store
    }
}

impl crate::executor::QueryExecutor for MockKeySpace {
    fn execute(&self, options: &Options, statement: &Statement) -> Result<(), Error> {
        options.context.check_cancelled()?;

        let mut state = self.lock();
        let now = state.clock.now();

        match statement {
            Statement::Insert(stmt) => {
                let deadline = stmt
                    .ttl()
                    .or(options.ttl)
                    .map(|ttl| now.saturating_add(ttl));
                let store = state.table_mut(stmt.table(), stmt.keys(), &options.clustering_order);
                store.purge_expired(now);
                store.insert(stmt.effective_field_map(), deadline)
            }
            Statement::Update(stmt) => {
                let deadline = stmt
                    .ttl()
                    .or(options.ttl)
                    .map(|ttl| now.saturating_add(ttl));
                let store = state.table_mut(stmt.table(), stmt.keys(), &options.clustering_order);
                store.purge_expired(now);
                store.update(
                    &stmt.effective_relations(),
                    &stmt.effective_field_map(),
                    deadline,
                )
            }
            Statement::Delete(stmt) => {
                let store = state.table_mut(stmt.table(), stmt.keys(), &options.clustering_order);
                store.purge_expired(now);
                store.delete(&stmt.effective_relations())
            }
            Statement::Select(_) => Err(Error::unsupported(
                "select statements run through the query surface",
            )),
            Statement::Noop => Ok(()),
        }
    }

    fn query(
        &self,
        options: &Options,
        statement: &SelectStatement,
        scanner: &mut dyn RowScanner,
    ) -> Result<(), Error> {
        options.context.check_cancelled()?;

        let rows: Vec<BTreeMap<String, Value>> = {
            let mut state = self.lock();
            let now = state.clock.now();
            match state.tables.get_mut(&statement.table().to_lowercase()) {
                Some(store) => {
                    store.purge_expired(now);
                    store.select(
                        &statement.effective_relations(),
                        statement.order(),
                        statement.limit(),
                    )?
                }
                None => Vec::new(),
            }
        };

        let mut iter = MockIterator::new(rows, statement.fields().to_vec())
            .with_context(options.context.clone());
        scanner.scan_iter(statement, &mut iter)?;
        Ok(())
    }
}
