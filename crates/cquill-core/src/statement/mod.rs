mod delete;
mod insert;
mod select;
mod sentinel;
mod update;

#[cfg(test)]
mod tests;

use crate::{
    error::Error,
    keys::Keys,
    relation::{Comparator, Relation},
    value::Value,
};
use serde::{Deserialize, Serialize};

// re-exports
pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use select::SelectStatement;
pub use sentinel::{
    is_clustering_sentinel, strip_sentinel, substitute_if_empty, CLUSTERING_SENTINEL,
    CLUSTERING_SENTINEL_TIMESTAMP,
};
pub use update::{SetMap, SetValue, UpdateStatement};

///
/// RenderedStatement
///
/// The wire form of a statement: CQL text with `?` placeholders and the
/// bind values in placeholder order. `field_names` is populated for
/// SELECT renderings only.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedStatement {
    query: String,
    values: Vec<Value>,
    field_names: Vec<String>,
}

impl RenderedStatement {
    pub(crate) fn new(query: String, values: Vec<Value>) -> Self {
        Self {
            query,
            values,
            field_names: Vec::new(),
        }
    }

    pub(crate) fn new_select(query: String, values: Vec<Value>, field_names: Vec<String>) -> Self {
        Self {
            query,
            values,
            field_names,
        }
    }

    /// The CQL query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Bind values in placeholder order; empty when the query carries no
    /// placeholders.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Selected column names, only populated for SELECT queries.
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }
}

///
/// Statement
///
/// Routing enum over the four statement kinds plus the no-op statement
/// used by empty multi-operations.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Noop,
}

impl Statement {
    #[must_use]
    pub fn render(&self) -> RenderedStatement {
        match self {
            Self::Select(stmt) => stmt.render(),
            Self::Insert(stmt) => stmt.render(),
            Self::Update(stmt) => stmt.render(),
            Self::Delete(stmt) => stmt.render(),
            Self::Noop => RenderedStatement::default(),
        }
    }
}

impl From<SelectStatement> for Statement {
    fn from(stmt: SelectStatement) -> Self {
        Self::Select(stmt)
    }
}

impl From<InsertStatement> for Statement {
    fn from(stmt: InsertStatement) -> Self {
        Self::Insert(stmt)
    }
}

impl From<UpdateStatement> for Statement {
    fn from(stmt: UpdateStatement) -> Self {
        Self::Update(stmt)
    }
}

impl From<DeleteStatement> for Statement {
    fn from(stmt: DeleteStatement) -> Self {
        Self::Delete(stmt)
    }
}

///
/// Shared construction checks and rendering helpers.
///

pub(crate) fn validate_table(keyspace: &str, table: &str) -> Result<(), Error> {
    if keyspace.is_empty() {
        return Err(Error::validation("keyspace name must not be empty"));
    }
    if table.is_empty() {
        return Err(Error::validation("table name must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_keys(keys: &Keys) -> Result<(), Error> {
    if keys.partition_keys.is_empty() {
        return Err(Error::validation("at least one partition key is required"));
    }
    Ok(())
}

/// Apply sentinel substitution to the relations a statement will render
/// or evaluate: equality terms on clustering columns get their empty
/// values replaced. Other comparators and other columns pass through.
pub(crate) fn substitute_relations(
    relations: &[Relation],
    keys: &Keys,
    sentinels_enabled: bool,
) -> Vec<Relation> {
    relations
        .iter()
        .map(|relation| {
            if sentinels_enabled
                && relation.comparator() == Comparator::Eq
                && keys.is_clustering_column(relation.column())
            {
                let terms = relation.terms().iter().map(substitute_if_empty).collect();
                relation.with_terms(terms)
            } else {
                relation.clone()
            }
        })
        .collect()
}

/// Apply sentinel substitution to a cell value bound for the named
/// column. Never applies to non-clustering columns.
pub(crate) fn substitute_cell(
    column: &str,
    value: &Value,
    keys: &Keys,
    sentinels_enabled: bool,
) -> Value {
    if sentinels_enabled && keys.is_clustering_column(column) {
        substitute_if_empty(value)
    } else {
        value.clone()
    }
}

/// Render the WHERE clause body: fragments joined with ` AND `, bind
/// values appended in relation order. Substitution has already been
/// applied by the caller.
pub(crate) fn render_where(relations: &[Relation]) -> (String, Vec<Value>) {
    let mut fragments = Vec::with_capacity(relations.len());
    let mut values = Vec::new();
    for relation in relations {
        let (fragment, mut binds) = relation.cql();
        fragments.push(fragment);
        values.append(&mut binds);
    }
    (fragments.join(" AND "), values)
}
