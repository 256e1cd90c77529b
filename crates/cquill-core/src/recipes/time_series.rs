use crate::{
    error::Error,
    keys::Keys,
    options::Options,
    record::Record,
    recipes::{op::Action, KeySpace, Op, Table},
    relation::Relation,
    statement::SetMap,
    types::{Duration, Timestamp},
    value::Value,
};

/// Synthetic partition column carrying the time bucket of a row.
pub(crate) const BUCKET_COLUMN: &str = "bucket";

/// Floor a row time onto its bucket start.
pub(crate) fn bucket_for(time: Timestamp, bucket_size: Duration) -> Timestamp {
    let size = bucket_size.secs().max(1);
    Timestamp::from_secs(time.secs().div_euclid(size) * size)
}

/// Every bucket start between `from` and `to`, inclusive of both
/// endpoints' buckets.
pub(crate) fn buckets_between(from: Timestamp, to: Timestamp, bucket_size: Duration) -> Vec<Value> {
    let size = bucket_size.secs().max(1);
    let first = bucket_for(from, bucket_size).secs();
    let last = bucket_for(to, bucket_size).secs();

    let mut buckets = Vec::new();
    let mut secs = first;
    while secs <= last {
        buckets.push(Value::Timestamp(Timestamp::from_secs(secs)));
        secs += size;
    }
    buckets
}

/// Read the row time out of a record, for deriving the bucket on write.
pub(crate) fn record_time<T: Record>(record: &T, time_field: &str) -> Result<Timestamp, Error> {
    match record.get(time_field) {
        Some(Value::Timestamp(t)) => Ok(t),
        Some(other) => Err(Error::validation(format!(
            "time field {time_field} holds non-timestamp value {other:?}"
        ))),
        None => Err(Error::validation(format!(
            "record has no time field {time_field}"
        ))),
    }
}

///
/// TimeSeriesTable
///
/// Rows partitioned by time bucket, clustered by `(time, id)`. The
/// bucket column is derived from the row time on write and never
/// surfaces in read results.
///

pub struct TimeSeriesTable<T: Record> {
    table: Table<T>,
    time_field: String,
    id_field: String,
    bucket_size: Duration,
}

impl<T: Record> Clone for TimeSeriesTable<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            time_field: self.time_field.clone(),
            id_field: self.id_field.clone(),
            bucket_size: self.bucket_size,
        }
    }
}

impl<T: Record> TimeSeriesTable<T> {
    pub(crate) fn new(
        keyspace: &KeySpace,
        name: &str,
        time_field: &str,
        id_field: &str,
        bucket_size: Duration,
    ) -> Self {
        let physical = format!(
            "{}_timeseries_{}_{}_{}",
            name,
            time_field.to_lowercase(),
            id_field.to_lowercase(),
            bucket_size.secs().max(1)
        );
        let keys = Keys {
            partition_keys: vec![BUCKET_COLUMN.to_string()],
            clustering_columns: vec![time_field.to_string(), id_field.to_string()],
        };
        Self {
            table: keyspace.raw_table(physical, keys),
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
    pub fn read<'a>(&self, time: Timestamp, id: impl Into<Value>, out: &'a mut T) -> Op<'a> {
        self.table
            .where_(self.row_relations(time, id))
            .read_one(out)
    }

    /// List rows between two instants, inclusive of both endpoints.
    #[must_use]
    pub fn list<'a>(&self, from: Timestamp, to: Timestamp, out: &'a mut Vec<T>) -> Op<'a> {
        self.table
            .where_(vec![
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
    pub fn update(&self, time: Timestamp, id: impl Into<Value>, set_map: SetMap) -> Op<'static> {
        self.table
            .where_(self.row_relations(time, id))
            .update(set_map)
    }

    #[must_use]
    pub fn delete(&self, time: Timestamp, id: impl Into<Value>) -> Op<'static> {
        self.table.where_(self.row_relations(time, id)).delete()
    }

    fn row_relations(&self, time: Timestamp, id: impl Into<Value>) -> Vec<Relation> {
        vec![
            Relation::eq(BUCKET_COLUMN, bucket_for(time, self.bucket_size)),
            Relation::eq(self.time_field.clone(), time),
            Relation::eq(self.id_field.clone(), id),
        ]
    }
}
