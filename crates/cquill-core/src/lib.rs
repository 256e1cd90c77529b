//! Core runtime for cquill: CQL statement builders, typed record
//! binding, the row scanner, table recipes, and the in-memory mock
//! executor, with the ergonomics exported via the `prelude`.

pub mod context;
pub mod error;
pub mod executor;
pub mod keys;
pub mod mock;
pub mod modifier;
pub mod options;
pub mod record;
pub mod recipes;
pub mod relation;
pub mod scanner;
pub mod statement;
pub mod types;
pub mod value;

///
/// Prelude
///
/// Domain vocabulary only. Executors, stores, and iterators are
/// imported from their modules.
///

pub mod prelude {
    pub use crate::{
        error::Error,
        keys::{ClusteringOrderColumn, Direction, Keys},
        modifier::Modifier,
        options::Options,
        record::Record,
        relation::Relation,
        statement::{SetMap, SetValue},
        types::{Blob, Duration, Timestamp},
        value::{ColumnValue, Value},
    };
}
