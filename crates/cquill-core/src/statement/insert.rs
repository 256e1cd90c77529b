use crate::{
    error::Error,
    keys::Keys,
    statement::{substitute_cell, validate_keys, validate_table, RenderedStatement},
    types::Duration,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// InsertStatement
///
/// Columns render in ascending order of their lowercased names, with
/// bind values aligned, so an insert for a given field map is always
/// bit-identical.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    keyspace: String,
    table: String,
    field_map: Vec<(String, Value)>,
    ttl: Option<Duration>,
    keys: Keys,
    sentinels_enabled: bool,
}

impl InsertStatement {
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        field_map: Vec<(String, Value)>,
        keys: Keys,
    ) -> Result<Self, Error> {
        let keyspace = keyspace.into();
        let table = table.into();
        validate_table(&keyspace, &table)?;
        validate_keys(&keys)?;
        if field_map.is_empty() {
            return Err(Error::validation(
                "insert statement must set at least one field",
            ));
        }

        Ok(Self {
            keyspace,
            table,
            field_map,
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
    pub fn field_map(&self) -> &[(String, Value)] {
        &self.field_map
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

    /// Field map with sentinel substitution applied to clustering
    /// columns, sorted the way the statement renders.
    #[must_use]
    pub fn effective_field_map(&self) -> Vec<(String, Value)> {
        let mut cells: Vec<(String, Value)> = self
            .field_map
            .iter()
            .map(|(column, value)| {
                let value = substitute_cell(column, value, &self.keys, self.sentinels_enabled);
                (column.clone(), value)
            })
            .collect();
        cells.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()));
        cells
    }

    ///
    /// RENDERING
    ///

    #[must_use]
    pub fn render(&self) -> RenderedStatement {
        let cells = self.effective_field_map();

        let columns = cells
            .iter()
            .map(|(column, _)| column.to_lowercase())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; cells.len()].join(", ");
        let mut values: Vec<Value> = cells.into_iter().map(|(_, value)| value).collect();

        let mut query = format!(
            "INSERT INTO {}.{} ({columns}) VALUES ({placeholders})",
            self.keyspace, self.table
        );

        if let Some(ttl) = self.ttl {
            query.push_str(" USING TTL ?");
            values.push(Value::Int(ttl.secs()));
        }

        RenderedStatement::new(query, values)
    }
}
