use crate::{
    keys::Keys,
    options::Options,
    record::Record,
    recipes::{KeySpace, Op, Table},
    relation::Relation,
    statement::SetMap,
    value::Value,
};

///
/// MultimapTable
///
/// Rows grouped under one partition field and ordered by an id
/// clustering column.
///

pub struct MultimapTable<T: Record> {
    table: Table<T>,
    field: String,
    id_field: String,
}

impl<T: Record> Clone for MultimapTable<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            field: self.field.clone(),
            id_field: self.id_field.clone(),
        }
    }
}

impl<T: Record> MultimapTable<T> {
    pub(crate) fn new(keyspace: &KeySpace, name: &str, field: &str, id_field: &str) -> Self {
        let physical = format!(
            "{}_multimap_{}_{}",
            name,
            field.to_lowercase(),
            id_field.to_lowercase()
        );
        let keys = Keys {
            partition_keys: vec![field.to_string()],
            clustering_columns: vec![id_field.to_string()],
        };
        Self {
            table: keyspace.raw_table(physical, keys),
            field: field.to_string(),
            id_field: id_field.to_string(),
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
    pub fn read<'a>(&self, field: impl Into<Value>, id: impl Into<Value>, out: &'a mut T) -> Op<'a> {
        self.table
            .where_(vec![
                Relation::eq(self.field.clone(), field),
                Relation::eq(self.id_field.clone(), id),
            ])
            .read_one(out)
    }

    /// List rows under a partition starting from `start_id` (inclusive
    /// lower bound on the id column), up to `limit` rows.
    #[must_use]
    pub fn list<'a>(
        &self,
        field: impl Into<Value>,
        start_id: impl Into<Value>,
        limit: i32,
        out: &'a mut Vec<T>,
    ) -> Op<'a> {
        self.table
            .where_(vec![
                Relation::eq(self.field.clone(), field),
                Relation::gte(self.id_field.clone(), start_id),
            ])
            .read(out)
            .with_options(Options {
                limit,
                ..Options::default()
            })
    }

    #[must_use]
    pub fn update(
        &self,
        field: impl Into<Value>,
        id: impl Into<Value>,
        set_map: SetMap,
    ) -> Op<'static> {
        self.table
            .where_(vec![
                Relation::eq(self.field.clone(), field),
                Relation::eq(self.id_field.clone(), id),
            ])
            .update(set_map)
    }

    #[must_use]
    pub fn delete(&self, field: impl Into<Value>, id: impl Into<Value>) -> Op<'static> {
        self.table
            .where_(vec![
                Relation::eq(self.field.clone(), field),
                Relation::eq(self.id_field.clone(), id),
            ])
            .delete()
    }

    /// Delete the whole partition.
    #[must_use]
    pub fn delete_all(&self, field: impl Into<Value>) -> Op<'static> {
        self.table
            .where_(vec![Relation::eq(self.field.clone(), field)])
            .delete()
    }
}
