use crate::{context::Context, keys::ClusteringOrderColumn, types::Duration};

///
/// Options
///
/// Per-call knobs merged from table defaults and per-operation
/// overrides. Executors ignore the fields they do not recognize.
///

#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Cancellation / error-injection carrier for this run.
    pub context: Context,
    /// Row TTL applied by insert and update statements.
    pub ttl: Option<Duration>,
    /// Row limit for selects; zero or negative means unlimited.
    pub limit: i32,
    /// Declared clustering order of the table, also used as the ORDER BY
    /// clause on reads.
    pub clustering_order: Vec<ClusteringOrderColumn>,
    /// Emit ALLOW FILTERING on selects.
    pub allow_filtering: bool,
    /// Projected field list; empty means every record column.
    pub select: Vec<String>,
}

impl Options {
    /// Merge two option sets; fields set on `other` win.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        if !other.context.is_default() {
            merged.context = other.context.clone();
        }
        if other.ttl.is_some() {
            merged.ttl = other.ttl;
        }
        if other.limit != 0 {
            merged.limit = other.limit;
        }
        if !other.clustering_order.is_empty() {
            merged.clustering_order = other.clustering_order.clone();
        }
        if other.allow_filtering {
            merged.allow_filtering = true;
        }
        if !other.select.is_empty() {
            merged.select = other.select.clone();
        }
        merged
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }
}
