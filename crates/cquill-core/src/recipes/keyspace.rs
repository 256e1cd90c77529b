use crate::{
    executor::QueryExecutor,
    keys::Keys,
    record::Record,
    recipes::{
        MapTable, MultiKeyTimeSeriesTable, MultiTimeSeriesTable, MultimapMkTable, MultimapTable,
        Table, TimeSeriesTable,
    },
    types::Duration,
};
use std::sync::Arc;

///
/// KeySpace
///
/// Recipe constructor surface bound to a keyspace name and an executor.
/// Each recipe derives a physical table name from the base name plus
/// its key layout, so different recipes over one logical name do not
/// collide.
///

#[derive(Clone)]
pub struct KeySpace {
    name: String,
    executor: Arc<dyn QueryExecutor>,
}

impl KeySpace {
    #[must_use]
    pub fn new(name: impl Into<String>, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            name: name.into(),
            executor,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw table with caller-declared keys.
    #[must_use]
    pub fn table<T: Record>(&self, name: &str, keys: Keys) -> Table<T> {
        Table::new(
            self.name.clone(),
            name.to_string(),
            keys,
            Arc::clone(&self.executor),
        )
    }

    pub(crate) fn raw_table<T: Record>(&self, physical_name: String, keys: Keys) -> Table<T> {
        Table::new(
            self.name.clone(),
            physical_name,
            keys,
            Arc::clone(&self.executor),
        )
    }

    /// Key-value style access: one row per partition key.
    #[must_use]
    pub fn map_table<T: Record>(&self, name: &str, id_field: &str) -> MapTable<T> {
        MapTable::new(self, name, id_field)
    }

    /// Rows grouped under a partition field, ordered by an id column.
    #[must_use]
    pub fn multimap_table<T: Record>(&self, name: &str, field: &str, id_field: &str) -> MultimapTable<T> {
        MultimapTable::new(self, name, field, id_field)
    }

    /// Multimap with several partition fields and several id columns.
    #[must_use]
    pub fn multimap_multikey_table<T: Record>(
        &self,
        name: &str,
        fields: Vec<String>,
        id_fields: Vec<String>,
    ) -> MultimapMkTable<T> {
        MultimapMkTable::new(self, name, fields, id_fields)
    }

    /// Time-bucketed series keyed by a time column and an id column.
    #[must_use]
    pub fn time_series_table<T: Record>(
        &self,
        name: &str,
        time_field: &str,
        id_field: &str,
        bucket_size: Duration,
    ) -> TimeSeriesTable<T> {
        TimeSeriesTable::new(self, name, time_field, id_field, bucket_size)
    }

    /// Time series partitioned by an index field plus the time bucket.
    #[must_use]
    pub fn multi_time_series_table<T: Record>(
        &self,
        name: &str,
        index_field: &str,
        time_field: &str,
        id_field: &str,
        bucket_size: Duration,
    ) -> MultiTimeSeriesTable<T> {
        MultiTimeSeriesTable::new(self, name, index_field, time_field, id_field, bucket_size)
    }

    /// Time series partitioned by several index fields plus the time
    /// bucket, with several id columns.
    #[must_use]
    pub fn multi_key_time_series_table<T: Record>(
        &self,
        name: &str,
        fields: Vec<String>,
        time_field: &str,
        id_fields: Vec<String>,
        bucket_size: Duration,
    ) -> MultiKeyTimeSeriesTable<T> {
        MultiKeyTimeSeriesTable::new(self, name, fields, time_field, id_fields, bucket_size)
    }
}
