use crate::{
    keys::Keys,
    options::Options,
    record::Record,
    recipes::{KeySpace, Op, Table},
    relation::Relation,
    statement::SetMap,
    value::Value,
};
use std::collections::BTreeMap;

///
/// MultimapMkTable
///
/// Multimap over several partition fields and several id clustering
/// columns. Field and id values are supplied as name → value maps.
///

pub struct MultimapMkTable<T: Record> {
    table: Table<T>,
    fields: Vec<String>,
    id_fields: Vec<String>,
}

impl<T: Record> Clone for MultimapMkTable<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            fields: self.fields.clone(),
            id_fields: self.id_fields.clone(),
        }
    }
}

impl<T: Record> MultimapMkTable<T> {
    pub(crate) fn new(
        keyspace: &KeySpace,
        name: &str,
        fields: Vec<String>,
        id_fields: Vec<String>,
    ) -> Self {
        let physical = format!(
            "{}_multimapmk_{}_{}",
            name,
            join_lower(&fields),
            join_lower(&id_fields)
        );
        let keys = Keys {
            partition_keys: fields.clone(),
            clustering_columns: id_fields.clone(),
        };
        Self {
            table: keyspace.raw_table(physical, keys),
            fields,
            id_fields,
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

    #[must_use]
    pub fn set(&self, record: &T) -> Op<'static> {
        self.table.set(record)
    }

    #[must_use]
    pub fn read<'a>(
        &self,
        field_values: BTreeMap<String, Value>,
        id_values: BTreeMap<String, Value>,
        out: &'a mut T,
    ) -> Op<'a> {
        let mut relations = eq_relations(&field_values);
        relations.extend(eq_relations(&id_values));
        self.table.where_(relations).read_one(out)
    }

    /// List rows under the partition named by `field_values`, starting
    /// from the id lower bounds in `start_ids` (inclusive).
    #[must_use]
    pub fn list<'a>(
        &self,
        field_values: BTreeMap<String, Value>,
        start_ids: BTreeMap<String, Value>,
        limit: i32,
        out: &'a mut Vec<T>,
    ) -> Op<'a> {
        let mut relations = eq_relations(&field_values);
        for (column, value) in start_ids {
            relations.push(Relation::gte(column, value));
        }
        self.table
            .where_(relations)
            .read(out)
            .with_options(Options {
                limit,
                ..Options::default()
            })
    }

    #[must_use]
    pub fn update(
        &self,
        field_values: BTreeMap<String, Value>,
        id_values: BTreeMap<String, Value>,
        set_map: SetMap,
    ) -> Op<'static> {
        let mut relations = eq_relations(&field_values);
        relations.extend(eq_relations(&id_values));
        self.table.where_(relations).update(set_map)
    }

    #[must_use]
    pub fn delete(
        &self,
        field_values: BTreeMap<String, Value>,
        id_values: BTreeMap<String, Value>,
    ) -> Op<'static> {
        let mut relations = eq_relations(&field_values);
        relations.extend(eq_relations(&id_values));
        self.table.where_(relations).delete()
    }

    /// Delete the whole partition.
    #[must_use]
    pub fn delete_all(&self, field_values: BTreeMap<String, Value>) -> Op<'static> {
        self.table.where_(eq_relations(&field_values)).delete()
    }
}

fn eq_relations(values: &BTreeMap<String, Value>) -> Vec<Relation> {
    values
        .iter()
        .map(|(column, value)| Relation::eq(column.clone(), value.clone()))
        .collect()
}

pub(crate) fn join_lower(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| c.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}
