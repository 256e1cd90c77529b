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
/// MapTable
///
/// One row per id: the id field is the sole partition key and the whole
/// primary key.
///

pub struct MapTable<T: Record> {
    table: Table<T>,
    id_field: String,
}

impl<T: Record> Clone for MapTable<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            id_field: self.id_field.clone(),
        }
    }
}

impl<T: Record> MapTable<T> {
    pub(crate) fn new(keyspace: &KeySpace, name: &str, id_field: &str) -> Self {
        let physical = format!("{}_map_{}", name, id_field.to_lowercase());
        let keys = Keys {
            partition_keys: vec![id_field.to_string()],
            clustering_columns: vec![],
        };
        Self {
            table: keyspace.raw_table(physical, keys),
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
    pub fn read<'a>(&self, id: impl Into<Value>, out: &'a mut T) -> Op<'a> {
        self.table
            .where_(vec![Relation::eq(self.id_field.clone(), id)])
            .read_one(out)
    }

    /// Read several ids at once; missing ids simply do not appear in the
    /// result.
    #[must_use]
    pub fn multi_read<'a, I, V>(&self, ids: I, out: &'a mut Vec<T>) -> Op<'a>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.table
            .where_(vec![Relation::is_in(self.id_field.clone(), ids)])
            .read(out)
    }

    #[must_use]
    pub fn update(&self, id: impl Into<Value>, set_map: SetMap) -> Op<'static> {
        self.table
            .where_(vec![Relation::eq(self.id_field.clone(), id)])
            .update(set_map)
    }

    #[must_use]
    pub fn delete(&self, id: impl Into<Value>) -> Op<'static> {
        self.table
            .where_(vec![Relation::eq(self.id_field.clone(), id)])
            .delete()
    }
}
