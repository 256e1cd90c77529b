use crate::{
    error::Error,
    keys::Keys,
    relation::Relation,
    statement::{render_where, substitute_relations, validate_keys, validate_table,
        RenderedStatement},
};
use serde::{Deserialize, Serialize};

///
/// DeleteStatement
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    keyspace: String,
    table: String,
    relations: Vec<Relation>,
    keys: Keys,
    sentinels_enabled: bool,
}

impl DeleteStatement {
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        relations: Vec<Relation>,
        keys: Keys,
    ) -> Result<Self, Error> {
        let keyspace = keyspace.into();
        let table = table.into();
        validate_table(&keyspace, &table)?;
        validate_keys(&keys)?;
        if relations.is_empty() {
            return Err(Error::validation(
                "delete statement must have at least one relation",
            ));
        }

        Ok(Self {
            keyspace,
            table,
            relations,
            keys,
            sentinels_enabled: false,
        })
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
    pub fn relations(&self) -> &[Relation] {
        &self.relations
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

    ///
    /// RENDERING
    ///

    #[must_use]
    pub fn render(&self) -> RenderedStatement {
        let (where_body, values) = render_where(&self.effective_relations());
        let query = format!(
            "DELETE FROM {}.{} WHERE {where_body}",
            self.keyspace, self.table
        );
        RenderedStatement::new(query, values)
    }
}
