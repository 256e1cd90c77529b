use crate::{
    keys::Keys,
    options::Options,
    record::Record,
    recipes::{
        op::Action,
        time_series::{bucket_for, buckets_between, record_time, BUCKET_COLUMN},
        KeySpace, Op, Table,
    },
    relation::Relation,
    statement::SetMap,
    types::{Duration, Timestamp},
    value::Value,
};

///
/// MultiTimeSeriesTable
///
/// Time series partitioned by an index field plus the time bucket, so
/// each index value has its own series.
///

pub struct MultiTimeSeriesTable<T: Record> {
    table: Table<T>,
    index_field: String,
    time_field: String,
    id_field: String,
    bucket_size: Duration,
}

impl<T: Record> Clone for MultiTimeSeriesTable<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            index_field: self.index_field.clone(),
            time_field: self.time_field.clone(),
            id_field: self.id_field.clone(),
            bucket_size: self.bucket_size,
        }
    }
}

impl<T: Record> MultiTimeSeriesTable<T> {
    pub(crate) fn new(
        keyspace: &KeySpace,
        name: &str,
        index_field: &str,
        time_field: &str,
        id_field: &str,
        bucket_size: Duration,
    ) -> Self {
        let physical = format!(
            "{}_multitimeseries_{}_{}_{}_{}",
            name,
            index_field.to_lowercase(),
            time_field.to_lowercase(),
            id_field.to_lowercase(),
            bucket_size.secs().max(1)
        );
        let keys = Keys {
            partition_keys: vec![index_field.to_string(), BUCKET_COLUMN.to_string()],
            clustering_columns: vec![time_field.to_string(), id_field.to_string()],
        };
        Self {
            table: keyspace.raw_table(physical, keys),
            index_field: index_field.to_string(),
            time_field: time_field.to_string(),
            id_field: id_field.to_string(),
            bucket_size,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.table.name()
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.table = self.table.with_options(options);
        self
    }

    /// Upsert the record, deriving its bucket from the time field.
    #[must_use]
    pub fn set(&self, record: &T) -> Op<'static> {
        let time = match record_time(record, &self.time_field) {
            Ok(time) => time,
            Err(err) => return Op::fail(self.table.spec().clone(), err),
        };
        let mut cells = record.to_cells();
        cells.push((
            BUCKET_COLUMN.to_string(),
            Value::Timestamp(bucket_for(time, self.bucket_size)),
        ));
        Op::single(self.table.spec().clone(), Vec::new(), Action::Insert(cells))
    }

    #[must_use]
    pub fn read<'a>(
        &self,
        index: impl Into<Value>,
        time: Timestamp,
        id: impl Into<Value>,
        out: &'a mut T,
    ) -> Op<'a> {
        self.table
            .where_(self.row_relations(index, time, id))
            .read_one(out)
    }

    /// List one index value's rows between two instants, inclusive.
    #[must_use]
    pub fn list<'a>(
        &self,
        index: impl Into<Value>,
        from: Timestamp,
        to: Timestamp,
        out: &'a mut Vec<T>,
    ) -> Op<'a> {
        self.table
            .where_(vec![
                Relation::eq(self.index_field.clone(), index),
                Relation::is_in(
                    BUCKET_COLUMN,
                    buckets_between(from, to, self.bucket_size),
                ),
                Relation::gte(self.time_field.clone(), from),
                Relation::lte(self.time_field.clone(), to),
            ])
            .read(out)
    }

    #[must_use]
    pub fn update(
        &self,
        index: impl Into<Value>,
        time: Timestamp,
        id: impl Into<Value>,
        set_map: SetMap,
    ) -> Op<'static> {
        self.table
            .where_(self.row_relations(index, time, id))
            .update(set_map)
    }

    #[must_use]
    pub fn delete(
        &self,
        index: impl Into<Value>,
        time: Timestamp,
        id: impl Into<Value>,
    ) -> Op<'static> {
        self.table
            .where_(self.row_relations(index, time, id))
            .delete()
    }

    fn row_relations(
        &self,
        index: impl Into<Value>,
        time: Timestamp,
        id: impl Into<Value>,
    ) -> Vec<Relation> {
        vec![
            Relation::eq(self.index_field.clone(), index),
            Relation::eq(BUCKET_COLUMN, bucket_for(time, self.bucket_size)),
            Relation::eq(self.time_field.clone(), time),
            Relation::eq(self.id_field.clone(), id),
        ]
    }
}
