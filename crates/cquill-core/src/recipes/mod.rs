//! Table recipes: named access patterns whose primary-key layout is
//! fixed by the recipe. Every recipe translates its typed CRUD surface
//! into the statement builders and runs through a [`QueryExecutor`].
//!
//! [`QueryExecutor`]: crate::executor::QueryExecutor

mod keyspace;
mod map_table;
mod multi_key_time_series;
mod multi_time_series;
mod multimap;
mod multimap_mk;
mod op;
mod table;
mod time_series;

pub use keyspace::KeySpace;
pub use map_table::MapTable;
pub use multi_key_time_series::MultiKeyTimeSeriesTable;
pub use multi_time_series::MultiTimeSeriesTable;
pub use multimap::MultimapTable;
pub use multimap_mk::MultimapMkTable;
pub use op::{noop, Op};
pub use table::{Filter, Table};
pub use time_series::TimeSeriesTable;

pub(crate) use table::TableSpec;
