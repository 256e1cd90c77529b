//! cquill — statement builders, typed table recipes, and an in-memory
//! mock for CQL wide-column stores.
//!
//! This is the public meta-crate. Downstream users depend on **cquill**
//! only. It re-exports the stable public API from:
//!   - `cquill-core`   (statements, records, scanner, recipes, mock)
//!   - `cquill-derive` (derive macros)

pub use cquill_core::{
    context, error, executor, keys, mock, modifier, options, record, recipes, relation, scanner,
    statement, types, value,
};

//
// Derive macros
//

pub use cquill_derive::{ColumnValue, Record};

//
// Prelude
//

pub mod prelude {
    pub use cquill_core::prelude::*;
    pub use cquill_derive::{ColumnValue, Record};
}
