use crate::{error::Error, value::Value};

///
/// ColumnSpec
///
/// One flattened column of a record type: the declared field name and
/// whether it was contributed by an embedded record.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub embedded: bool,
}

///
/// Record
///
/// Typed row binding, normally generated by `#[derive(Record)]`. Column
/// names match case-insensitively everywhere. Embedded records tagged
/// `#[cql(flatten)]` contribute their columns at top level; on a name
/// conflict the outer field shadows the embedded one.
///
/// `put` converts through `ColumnValue::from_value`: `Ok(true)` means
/// stored, `Ok(false)` means no field matched (callers swallow the
/// cell), and a conversion failure is an error. A flattened
/// `Option<Embedded>` that is `None` is never allocated by `put`; its
/// columns count as unmatched.
///

pub trait Record: Clone + Default {
    /// Flattened column descriptors in declaration order, outer fields
    /// first, shadowed embedded names omitted.
    fn columns() -> Vec<ColumnSpec>;

    /// Case-insensitive column read.
    fn get(&self, column: &str) -> Option<Value>;

    /// Case-insensitive column write with widening conversion.
    fn put(&mut self, column: &str, value: &Value) -> Result<bool, Error>;

    /// Declaration-ordered field name → value pairs, flattened. A `None`
    /// embed contributes nothing.
    fn to_cells(&self) -> Vec<(String, Value)>;

    /// Convenience over [`columns`](Self::columns): just the names.
    fn column_names() -> Vec<String> {
        Self::columns()
            .into_iter()
            .map(|spec| spec.name.to_string())
            .collect()
    }
}
