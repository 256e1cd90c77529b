use crate::{
    keys::Keys,
    options::Options,
    record::Record,
    recipes::{
        multimap_mk::join_lower,
        op::Action,
        time_series::{bucket_for, buckets_between, record_time, BUCKET_COLUMN},
        KeySpace, Op, Table,
    },
    relation::Relation,
    statement::SetMap,
    types::{Duration, Timestamp},
    value::Value,
};
use std::collections::BTreeMap;

///
/// MultiKeyTimeSeriesTable
///
/// Time series partitioned by several index fields plus the time
/// bucket, clustered by the time column and several id columns. Index
/// and id values are supplied as name → value maps.
///

pub struct MultiKeyTimeSeriesTable<T: Record> {
    table: Table<T>,
    fields: Vec<String>,
    time_field: String,
    id_fields: Vec<String>,
    bucket_size: Duration,
}

impl<T: Record> Clone for MultiKeyTimeSeriesTable<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            fields: self.fields.clone(),
            time_field: self.time_field.clone(),
            id_fields: self.id_fields.clone(),
            bucket_size: self.bucket_size,
        }
    }
}

impl<T: Record> MultiKeyTimeSeriesTable<T> {
    pub(crate) fn new(
        keyspace: &KeySpace,
        name: &str,
        fields: Vec<String>,
        time_field: &str,
        id_fields: Vec<String>,
        bucket_size: Duration,
    ) -> Self {
        let physical = format!(
            "{}_multikeytimeseries_{}_{}_{}_{}",
            name,
            join_lower(&fields),
            time_field.to_lowercase(),
            join_lower(&id_fields),
            bucket_size.secs().max(1)
        );

        let mut partition_keys = fields.clone();
        partition_keys.push(BUCKET_COLUMN.to_string());
        let mut clustering_columns = vec![time_field.to_string()];
        clustering_columns.extend(id_fields.iter().cloned());

        let keys = Keys {
            partition_keys,
            clustering_columns,
        };
        Self {
            table: keyspace.raw_table(physical, keys),
            fields,
            time_field: time_field.to_string(),
            id_fields,
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
        field_values: BTreeMap<String, Value>,
        time: Timestamp,
        id_values: BTreeMap<String, Value>,
        out: &'a mut T,
    ) -> Op<'a> {
        self.table
            .where_(self.row_relations(&field_values, time, &id_values))
            .read_one(out)
    }

    /// List one partition's rows between two instants, inclusive.
    #[must_use]
    pub fn list<'a>(
        &self,
        field_values: BTreeMap<String, Value>,
        from: Timestamp,
        to: Timestamp,
        out: &'a mut Vec<T>,
    ) -> Op<'a> {
        let mut relations = eq_relations(&field_values);
        relations.push(Relation::is_in(
            BUCKET_COLUMN,
            buckets_between(from, to, self.bucket_size),
        ));
        relations.push(Relation::gte(self.time_field.clone(), from));
        relations.push(Relation::lte(self.time_field.clone(), to));
        self.table.where_(relations).read(out)
    }

    #[must_use]
    pub fn update(
        &self,
        field_values: BTreeMap<String, Value>,
        time: Timestamp,
        id_values: BTreeMap<String, Value>,
        set_map: SetMap,
    ) -> Op<'static> {
        self.table
            .where_(self.row_relations(&field_values, time, &id_values))
            .update(set_map)
    }

    #[must_use]
    pub fn delete(
        &self,
        field_values: BTreeMap<String, Value>,
        time: Timestamp,
        id_values: BTreeMap<String, Value>,
    ) -> Op<'static> {
        self.table
            .where_(self.row_relations(&field_values, time, &id_values))
            .delete()
    }

    fn row_relations(
        &self,
        field_values: &BTreeMap<String, Value>,
        time: Timestamp,
        id_values: &BTreeMap<String, Value>,
    ) -> Vec<Relation> {
        let mut relations = eq_relations(field_values);
        relations.push(Relation::eq(
            BUCKET_COLUMN,
            bucket_for(time, self.bucket_size),
        ));
        relations.push(Relation::eq(self.time_field.clone(), time));
        relations.extend(eq_relations(id_values));
        relations
    }
}

fn eq_relations(values: &BTreeMap<String, Value>) -> Vec<Relation> {
    values
        .iter()
        .map(|(column, value)| Relation::eq(column.clone(), value.clone()))
        .collect()
}
