use crate::{
    error::Error,
    keys::{ClusteringOrderColumn, Direction, Keys},
    relation::{Comparator, Relation},
    statement::SetValue,
    types::Timestamp,
    value::{coerce, coerced_cmp, coerced_eq, Coerced, Value},
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

///
/// StoredRow
///
/// One row: lowercased column name → cell value, plus an optional TTL
/// deadline.
///

#[derive(Clone, Debug)]
pub(crate) struct StoredRow {
    pub cells: BTreeMap<String, Value>,
    pub expires_at: Option<Timestamp>,
}

///
/// RowStore
///
/// Per-table storage. Rows group by partition-key tuple (canonical byte
/// encoding of the coerced key values, declaration order) and stay
/// sorted within a partition by clustering tuple under the table's
/// declared clustering order.
///

#[derive(Debug)]
pub(crate) struct RowStore {
    keys: Keys,
    order: Vec<ClusteringOrderColumn>,
    partitions: BTreeMap<Vec<u8>, Vec<StoredRow>>,
}

impl RowStore {
    pub(crate) fn new(keys: Keys, order: Vec<ClusteringOrderColumn>) -> Self {
        Self {
            keys,
            order,
            partitions: BTreeMap::new(),
        }
    }

    /// Adopt a later-declared clustering order and re-sort. No-op when
    /// the declaration is unchanged or empty.
    pub(crate) fn set_order(&mut self, order: &[ClusteringOrderColumn]) {
        if order.is_empty() || order == self.order.as_slice() {
            return;
        }
        self.order = order.to_vec();
        let keys = self.keys.clone();
        let declared = self.order.clone();
        for rows in self.partitions.values_mut() {
            rows.sort_by(|a, b| clustering_cmp(&keys, &declared, &a.cells, &b.cells));
        }
    }

    /// Drop rows whose deadline has passed.
    pub(crate) fn purge_expired(&mut self, now: Timestamp) {
        for rows in self.partitions.values_mut() {
            rows.retain(|row| row.expires_at.is_none_or(|deadline| deadline >= now));
        }
        self.partitions.retain(|_, rows| !rows.is_empty());
    }

    ///
    /// READ PATH
    ///

    /// Execute a select: resolve partitions from the relations, filter
    /// the remaining relations per row, apply the ORDER BY override and
    /// the limit. Returned cell maps are defensive copies.
    pub(crate) fn select(
        &self,
        relations: &[Relation],
        order_override: &[ClusteringOrderColumn],
        limit: i32,
    ) -> Result<Vec<BTreeMap<String, Value>>, Error> {
        let partition_keys = self.resolve_partitions(relations)?;
        let predicates = self.non_partition_relations(relations);

        let mut out: Vec<BTreeMap<String, Value>> = Vec::new();
        for key in partition_keys {
            let Some(rows) = self.partitions.get(&key) else {
                continue;
            };
            for row in rows {
                if row_matches(&row.cells, &predicates) {
                    out.push(row.cells.clone());
                }
            }
        }

        if !order_override.is_empty() {
            out.sort_by(|a, b| clustering_cmp(&self.keys, order_override, a, b));
        }

        if let Ok(limit) = usize::try_from(limit) {
            if limit > 0 {
                out.truncate(limit);
            }
        }

        Ok(out)
    }

    ///
    /// WRITE PATH
    ///

    /// Upsert by full primary key: provided cells merge into the
    /// existing row, or a new row is inserted at its sorted position.
    pub(crate) fn insert(
        &mut self,
        cells: Vec<(String, Value)>,
        expires_at: Option<Timestamp>,
    ) -> Result<(), Error> {
        let cells: BTreeMap<String, Value> = cells
            .into_iter()
            .map(|(column, value)| (column.to_lowercase(), value))
            .collect();
        self.check_primary_key(&cells)?;
        self.put_row(cells, expires_at);
        Ok(())
    }

    /// Apply an update: the WHERE must name every primary-key column
    /// with equality. The targeted row is created when absent, matching
    /// the upsert semantics of the backing store.
    pub(crate) fn update(
        &mut self,
        relations: &[Relation],
        set_map: &[(String, SetValue)],
        expires_at: Option<Timestamp>,
    ) -> Result<(), Error> {
        let key_cells = self.key_cells_from_relations(relations)?;
        self.check_primary_key(&key_cells)?;

        let partition_key = self.partition_key_bytes(&key_cells);
        let rows = self.partitions.entry(partition_key).or_default();
        let position = rows.iter().position(|row| {
            clustering_tuple_eq(&self.keys, &row.cells, &key_cells)
        });

        let mut row = match position {
            Some(idx) => rows[idx].clone(),
            None => StoredRow {
                cells: key_cells.clone(),
                expires_at: None,
            },
        };

        for (column, set) in set_map {
            let column = column.to_lowercase();
            match set {
                SetValue::Literal(value) => {
                    row.cells.insert(column, value.clone());
                }
                SetValue::Modify(modifier) => {
                    let current = row.cells.get(&column).cloned().unwrap_or(Value::Null);
                    let updated = modifier.apply(&column, &current)?;
                    row.cells.insert(column, updated);
                }
            }
        }
        if expires_at.is_some() {
            row.expires_at = expires_at;
        }

        match position {
            Some(idx) => rows[idx] = row,
            None => {
                let keys = self.keys.clone();
                let order = self.order.clone();
                let at = rows
                    .binary_search_by(|existing| {
                        clustering_cmp(&keys, &order, &existing.cells, &row.cells)
                    })
                    .unwrap_or_else(|idx| idx);
                rows.insert(at, row);
            }
        }
        Ok(())
    }

    /// Remove every row matching the relations within the resolved
    /// partitions. `In` on a clustering column expands to individual
    /// row targets through ordinary predicate evaluation.
    pub(crate) fn delete(&mut self, relations: &[Relation]) -> Result<(), Error> {
        let partition_keys = self.resolve_partitions(relations)?;
        let predicates = self.non_partition_relations(relations);

        for key in partition_keys {
            let emptied = match self.partitions.get_mut(&key) {
                Some(rows) => {
                    rows.retain(|row| !row_matches(&row.cells, &predicates));
                    rows.is_empty()
                }
                None => false,
            };
            if emptied {
                self.partitions.remove(&key);
            }
        }
        Ok(())
    }

    ///
    /// INTERNALS
    ///

    fn put_row(&mut self, cells: BTreeMap<String, Value>, expires_at: Option<Timestamp>) {
        let partition_key = self.partition_key_bytes(&cells);
        let keys = self.keys.clone();
        let order = self.order.clone();
        let rows = self.partitions.entry(partition_key).or_default();

        if let Some(existing) = rows
            .iter_mut()
            .find(|row| clustering_tuple_eq(&keys, &row.cells, &cells))
        {
            existing.cells.extend(cells);
            existing.expires_at = expires_at;
            return;
        }

        let row = StoredRow { cells, expires_at };
        let at = rows
            .binary_search_by(|existing| clustering_cmp(&keys, &order, &existing.cells, &row.cells))
            .unwrap_or_else(|idx| idx);
        rows.insert(at, row);
    }

    /// Every partition-key column must appear with `Eq` or `In`; `In`
    /// produces one partition per term, in term order.
    fn resolve_partitions(&self, relations: &[Relation]) -> Result<Vec<Vec<u8>>, Error> {
        let mut combos: Vec<Vec<Value>> = vec![Vec::new()];
        for column in &self.keys.partition_keys {
            let relation = relations
                .iter()
                .find(|r| {
                    r.column().eq_ignore_ascii_case(column)
                        && matches!(r.comparator(), Comparator::Eq | Comparator::In)
                })
                .ok_or_else(|| {
                    Error::validation(format!(
                        "partition key column {column} must be constrained with = or IN"
                    ))
                })?;

            combos = combos
                .into_iter()
                .flat_map(|combo| {
                    relation.terms().iter().map(move |term| {
                        let mut next = combo.clone();
                        next.push(term.clone());
                        next
                    })
                })
                .collect();
        }

        Ok(combos
            .into_iter()
            .map(|values| encode_key_tuple(&values.iter().collect::<Vec<_>>()))
            .collect())
    }

    fn non_partition_relations(&self, relations: &[Relation]) -> Vec<Relation> {
        relations
            .iter()
            .filter(|r| !self.keys.is_partition_key(r.column()))
            .cloned()
            .collect()
    }

    /// Key cells named by an all-equality WHERE; `In` is rejected here
    /// because an update must target a unique row.
    fn key_cells_from_relations(
        &self,
        relations: &[Relation],
    ) -> Result<BTreeMap<String, Value>, Error> {
        let mut cells = BTreeMap::new();
        for column in self.keys.primary_key_columns() {
            let relation = relations
                .iter()
                .find(|r| r.column().eq_ignore_ascii_case(column))
                .ok_or_else(|| {
                    Error::validation(format!(
                        "update must constrain primary key column {column}"
                    ))
                })?;
            if relation.comparator() != Comparator::Eq {
                return Err(Error::validation(format!(
                    "update must constrain primary key column {column} with equality"
                )));
            }
            cells.insert(
                column.to_lowercase(),
                relation.terms().first().cloned().unwrap_or(Value::Null),
            );
        }
        Ok(cells)
    }

    /// A write must supply every primary-key column, and at least one
    /// component must be non-empty. Emptiness only applies to text,
    /// blob, and timestamp kinds.
    fn check_primary_key(&self, cells: &BTreeMap<String, Value>) -> Result<(), Error> {
        let mut first_empty: Option<&str> = None;
        let mut any_non_empty = false;

        for column in self.keys.primary_key_columns() {
            let lower = column.to_lowercase();
            let cell = cells.get(&lower).ok_or_else(|| {
                Error::validation(format!("write is missing primary key column {column}"))
            })?;
            if cell.is_empty_key_component() {
                first_empty.get_or_insert(column);
            } else {
                any_non_empty = true;
            }
        }

        if !any_non_empty {
            if let Some(column) = first_empty {
                return Err(Error::EmptyPrimaryKey {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    fn partition_key_bytes(&self, cells: &BTreeMap<String, Value>) -> Vec<u8> {
        let values: Vec<&Value> = self
            .keys
            .partition_keys
            .iter()
            .map(|column| cells.get(&column.to_lowercase()).unwrap_or(&Value::Null))
            .collect();
        encode_key_tuple(&values)
    }
}

fn row_matches(cells: &BTreeMap<String, Value>, predicates: &[Relation]) -> bool {
    predicates.iter().all(|relation| {
        let cell = cells
            .get(&relation.column().to_lowercase())
            .unwrap_or(&Value::Null);
        relation.accept(cell)
    })
}

fn clustering_tuple_eq(
    keys: &Keys,
    left: &BTreeMap<String, Value>,
    right: &BTreeMap<String, Value>,
) -> bool {
    keys.clustering_columns.iter().all(|column| {
        let lower = column.to_lowercase();
        let a = left.get(&lower).unwrap_or(&Value::Null);
        let b = right.get(&lower).unwrap_or(&Value::Null);
        coerced_eq(&coerce(a), &coerce(b))
    })
}

/// Compare two rows by the given clustering-order declaration; columns
/// not named in the declaration order ascending. Incomparable cells
/// count as equal, preserving insertion order between them.
pub(crate) fn clustering_cmp(
    keys: &Keys,
    order: &[ClusteringOrderColumn],
    left: &BTreeMap<String, Value>,
    right: &BTreeMap<String, Value>,
) -> Ordering {
    for column in &keys.clustering_columns {
        let lower = column.to_lowercase();
        let a = left.get(&lower).unwrap_or(&Value::Null);
        let b = right.get(&lower).unwrap_or(&Value::Null);

        let direction = order
            .iter()
            .find(|o| o.column.eq_ignore_ascii_case(column))
            .map_or(Direction::Asc, |o| o.direction);

        let cmp = coerced_cmp(&coerce(a), &coerce(b)).unwrap_or(Ordering::Equal);
        let cmp = match direction {
            Direction::Asc => cmp,
            Direction::Desc => cmp.reverse(),
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}

/// Canonical byte encoding of a key tuple. Only injectivity matters:
/// two tuples encode identically iff their coerced forms are equal.
pub(crate) fn encode_key_tuple(values: &[&Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for value in values {
        encode_coerced(&coerce(value), &mut out);
    }
    out
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn encode_coerced(value: &Coerced, out: &mut Vec<u8>) {
    match value {
        Coerced::Null => out.push(0),
        Coerced::Bool(b) => {
            out.push(1);
            out.push(u8::from(*b));
        }
        Coerced::Int(i) => {
            out.push(2);
            out.extend_from_slice(&i.to_be_bytes());
        }
        Coerced::Double(d) => {
            // integral doubles fold onto the integer encoding so that
            // Int(1) and Double(1.0) key the same partition
            if d.fract() == 0.0 && *d >= i64::MIN as f64 && *d <= i64::MAX as f64 {
                out.push(2);
                out.extend_from_slice(&(*d as i64).to_be_bytes());
            } else {
                out.push(3);
                out.extend_from_slice(&d.to_bits().to_be_bytes());
            }
        }
        Coerced::Bytes(bytes) => {
            out.push(4);
            out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        Coerced::List(items) => {
            out.push(5);
            out.extend_from_slice(&(items.len() as u64).to_be_bytes());
            for item in items {
                encode_coerced(item, out);
            }
        }
        Coerced::Map(entries) => {
            out.push(6);
            out.extend_from_slice(&(entries.len() as u64).to_be_bytes());
            for (key, value) in entries {
                encode_coerced(key, out);
                encode_coerced(value, out);
            }
        }
    }
}
