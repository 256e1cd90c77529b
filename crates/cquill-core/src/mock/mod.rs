//! In-memory stand-in for the wire driver: honors partition and
//! clustering key semantics, clustering order, relation filters, TTL,
//! modifiers, and batched operation sequencing, so data layers can be
//! exercised in unit tests without a live cluster.

mod clock;
mod injector;
mod iterator;
mod keyspace;
mod store;


pub use injector::{FailOnEachOperation, FailOnNthOperation, NeverFail};
pub use iterator::MockIterator;
pub use keyspace::MockKeySpace;
