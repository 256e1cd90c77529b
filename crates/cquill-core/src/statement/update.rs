use crate::{
    error::Error,
    keys::Keys,
    modifier::Modifier,
    relation::Relation,
    statement::{render_where, substitute_cell, substitute_relations, validate_keys,
        validate_table, RenderedStatement},
    types::{Blob, Duration, Timestamp},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// SetValue
///
/// One entry of an UPDATE SET map: either a literal cell value or a
/// list/map/counter modifier.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SetValue {
    Literal(Value),
    Modify(Modifier),
}

/// SET map for update statements and recipe update calls.
pub type SetMap = BTreeMap<String, SetValue>;

impl From<Modifier> for SetValue {
    fn from(modifier: Modifier) -> Self {
        Self::Modify(modifier)
    }
}

impl From<Value> for SetValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

macro_rules! impl_set_value_from {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl From<$type> for SetValue {
                fn from(v: $type) -> Self {
                    Self::Literal(v.into())
                }
            }
        )*
    };
}

impl_set_value_from!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, &str, String, Timestamp,
    Duration, Blob);

///
/// UpdateStatement
///
/// SET clauses render in ascending order of their lowercased column
/// names. A modifier entry can contribute several bind values (e.g. a
/// list plus an index).
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    keyspace: String,
    table: String,
    field_map: SetMap,
    relations: Vec<Relation>,
    ttl: Option<Duration>,
    keys: Keys,
    sentinels_enabled: bool,
}

impl UpdateStatement {
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        field_map: SetMap,
        relations: Vec<Relation>,
        keys: Keys,
    ) -> Result<Self, Error> {
        let keyspace = keyspace.into();
        let table = table.into();
        validate_table(&keyspace, &table)?;
        validate_keys(&keys)?;
        if field_map.is_empty() {
            return Err(Error::validation(
                "update statement must set at least one field",
            ));
        }
        if relations.is_empty() {
            return Err(Error::validation(
                "update statement must have at least one relation",
            ));
        }

        Ok(Self {
            keyspace,
            table,
            field_map,
            relations,
            ttl: None,
            keys,
            sentinels_enabled: false,
        })
    }

    ///
    /// MUTATORS
    ///

    /// A zero TTL means no USING TTL clause.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    #[must_use]
    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.relations = relations;
        self
    }

    #[must_use]
    pub const fn with_clustering_sentinel(mut self, enabled: bool) -> Self {
        self.sentinels_enabled = enabled;
        self
    }

    ///
    /// READERS
    ///

    #[must_use]
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn field_map(&self) -> &SetMap {
        &self.field_map
    }

    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    #[must_use]
    pub const fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    #[must_use]
    pub const fn keys(&self) -> &Keys {
        &self.keys
    }

    #[must_use]
    pub const fn clustering_sentinels_enabled(&self) -> bool {
        self.sentinels_enabled
    }

    /// Relations with sentinel substitution applied.
    #[must_use]
    pub fn effective_relations(&self) -> Vec<Relation> {
        substitute_relations(&self.relations, &self.keys, self.sentinels_enabled)
    }

    /// SET entries with sentinel substitution applied to literal values
    /// on clustering columns, sorted the way the statement renders.
    #[must_use]
    pub fn effective_field_map(&self) -> Vec<(String, SetValue)> {
        let mut entries: Vec<(String, SetValue)> = self
            .field_map
            .iter()
            .map(|(column, set)| {
                let set = match set {
                    SetValue::Literal(value) => SetValue::Literal(substitute_cell(
                        column,
                        value,
                        &self.keys,
                        self.sentinels_enabled,
                    )),
                    SetValue::Modify(modifier) => SetValue::Modify(modifier.clone()),
                };
                (column.clone(), set)
            })
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()));
        entries
    }

    ///
    /// RENDERING
    ///

    #[must_use]
    pub fn render(&self) -> RenderedStatement {
        let mut query = format!("UPDATE {}.{}", self.keyspace, self.table);
        let mut values: Vec<Value> = Vec::new();

        if let Some(ttl) = self.ttl {
            query.push_str(" USING TTL ?");
            values.push(Value::Int(ttl.secs()));
        }

        let mut set_fragments = Vec::with_capacity(self.field_map.len());
        for (column, set) in self.effective_field_map() {
            let column = column.to_lowercase();
            match set {
                SetValue::Literal(value) => {
                    set_fragments.push(format!("{column} = ?"));
                    values.push(value);
                }
                SetValue::Modify(modifier) => {
                    let (fragment, mut binds) = modifier.cql(&column);
                    set_fragments.push(fragment);
                    values.append(&mut binds);
                }
            }
        }
        query.push_str(" SET ");
        query.push_str(&set_fragments.join(", "));

        let (where_body, mut where_values) = render_where(&self.effective_relations());
        query.push_str(" WHERE ");
        query.push_str(&where_body);
        values.append(&mut where_values);

        RenderedStatement::new(query, values)
    }
}
