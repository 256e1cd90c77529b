use crate::{
    error::Error,
    keys::{ClusteringOrderColumn, Keys},
    relation::Relation,
    statement::{render_where, substitute_relations, validate_keys, validate_table,
        RenderedStatement},
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// SelectStatement
///
/// Immutable read query. `with_*` mutators return a new value; the
/// statement renders fresh on every call.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    keyspace: String,
    table: String,
    fields: Vec<String>,
    relations: Vec<Relation>,
    order: Vec<ClusteringOrderColumn>,
    limit: i32,
    allow_filtering: bool,
    keys: Keys,
    sentinels_enabled: bool,
}

impl SelectStatement {
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        fields: Vec<String>,
        relations: Vec<Relation>,
        keys: Keys,
    ) -> Result<Self, Error> {
        let keyspace = keyspace.into();
        let table = table.into();
        validate_table(&keyspace, &table)?;
        validate_keys(&keys)?;
        if fields.is_empty() {
            return Err(Error::validation(
                "select statement must name at least one field",
            ));
        }

        Ok(Self {
            keyspace,
            table,
            fields,
            relations,
            order: Vec::new(),
            limit: 0,
            allow_filtering: false,
            keys,
            sentinels_enabled: false,
        })
    }

    ///
    /// MUTATORS
    ///

    #[must_use]
    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.relations = relations;
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, order: Vec<ClusteringOrderColumn>) -> Self {
        self.order = order;
        self
    }

    /// Zero or negative means no LIMIT clause.
    #[must_use]
    pub const fn with_limit(mut self, limit: i32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn with_allow_filtering(mut self, allow_filtering: bool) -> Self {
        self.allow_filtering = allow_filtering;
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
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    #[must_use]
    pub fn order(&self) -> &[ClusteringOrderColumn] {
        &self.order
    }

    #[must_use]
    pub const fn limit(&self) -> i32 {
        self.limit
    }

    #[must_use]
    pub const fn allow_filtering(&self) -> bool {
        self.allow_filtering
    }

    #[must_use]
    pub const fn keys(&self) -> &Keys {
        &self.keys
    }

    #[must_use]
    pub const fn clustering_sentinels_enabled(&self) -> bool {
        self.sentinels_enabled
    }

    /// Relations with sentinel substitution applied, as evaluated by the
    /// mock and rendered on the wire.
    #[must_use]
    pub fn effective_relations(&self) -> Vec<Relation> {
        substitute_relations(&self.relations, &self.keys, self.sentinels_enabled)
    }

    ///
    /// RENDERING
    ///

    #[must_use]
    pub fn render(&self) -> RenderedStatement {
        let mut query = format!(
            "SELECT {} FROM {}.{}",
            self.fields.join(", "),
            self.keyspace,
            self.table
        );
        let mut values: Vec<Value> = Vec::new();

        if !self.relations.is_empty() {
            let (where_body, mut where_values) = render_where(&self.effective_relations());
            query.push_str(" WHERE ");
            query.push_str(&where_body);
            values.append(&mut where_values);
        }

        if !self.order.is_empty() {
            let order_body = self
                .order
                .iter()
                .map(|col| format!("{} {}", col.column, col.direction))
                .collect::<Vec<_>>()
                .join(", ");
            query.push_str(" ORDER BY ");
            query.push_str(&order_body);
        }

        if self.limit > 0 {
            query.push_str(" LIMIT ?");
            values.push(Value::Int(i64::from(self.limit)));
        }

        if self.allow_filtering {
            query.push_str(" ALLOW FILTERING");
        }

        RenderedStatement::new_select(query, values, self.fields.clone())
    }
}
