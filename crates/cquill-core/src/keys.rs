use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Keys
///
/// Primary-key layout of a table: ordered partition-key columns and
/// ordered clustering columns. Column names compare case-insensitively
/// everywhere they are consulted.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Keys {
    pub partition_keys: Vec<String>,
    pub clustering_columns: Vec<String>,
}

impl Keys {
    #[must_use]
    pub fn is_partition_key(&self, column: &str) -> bool {
        self.partition_keys
            .iter()
            .any(|k| k.eq_ignore_ascii_case(column))
    }

    #[must_use]
    pub fn is_clustering_column(&self, column: &str) -> bool {
        self.clustering_columns
            .iter()
            .any(|k| k.eq_ignore_ascii_case(column))
    }

    #[must_use]
    pub fn is_key_column(&self, column: &str) -> bool {
        self.is_partition_key(column) || self.is_clustering_column(column)
    }

    /// Partition keys followed by clustering columns, declaration order.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.partition_keys
            .iter()
            .chain(self.clustering_columns.iter())
            .map(String::as_str)
            .collect()
    }
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        };
        write!(f, "{label}")
    }
}

///
/// ClusteringOrderColumn
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClusteringOrderColumn {
    pub column: String,
    pub direction: Direction,
}

impl ClusteringOrderColumn {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}
