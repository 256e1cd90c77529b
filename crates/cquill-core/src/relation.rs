use crate::value::{coerce, coerced_cmp, coerced_eq, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// Comparator
///
/// Comparison kinds supported between a column and its terms. The tuple
/// variants carry an ordered term list and compare lexicographically.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    TupleEq,
    TupleGt,
    TupleGte,
    TupleLt,
    TupleLte,
}

impl Comparator {
    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Self::Eq | Self::TupleEq => "=",
            Self::In => "IN",
            Self::Gt | Self::TupleGt => ">",
            Self::Gte | Self::TupleGte => ">=",
            Self::Lt | Self::TupleLt => "<",
            Self::Lte | Self::TupleLte => "<=",
        }
    }

    #[must_use]
    pub const fn is_tuple(self) -> bool {
        matches!(
            self,
            Self::TupleEq | Self::TupleGt | Self::TupleGte | Self::TupleLt | Self::TupleLte
        )
    }
}

///
/// Relation
///
/// Describes the comparison of a column against a list of terms. Every
/// comparator except `In` and the tuple variants carries exactly one
/// term; `In` carries one or more.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    comparator: Comparator,
    column: String,
    terms: Vec<Value>,
}

impl Relation {
    fn single(comparator: Comparator, column: impl Into<String>, term: impl Into<Value>) -> Self {
        Self {
            comparator,
            column: column.into(),
            terms: vec![term.into()],
        }
    }

    fn multi<I, T>(comparator: Comparator, column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            comparator,
            column: column.into(),
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn eq(column: impl Into<String>, term: impl Into<Value>) -> Self {
        Self::single(Comparator::Eq, column, term)
    }

    /// Membership against one or more terms. Only correct on
    /// partition-key columns; the builder stays permissive and the mock
    /// enforces it where key resolution requires it.
    pub fn is_in<I, T>(column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::multi(Comparator::In, column, terms)
    }

    pub fn gt(column: impl Into<String>, term: impl Into<Value>) -> Self {
        Self::single(Comparator::Gt, column, term)
    }

    pub fn gte(column: impl Into<String>, term: impl Into<Value>) -> Self {
        Self::single(Comparator::Gte, column, term)
    }

    pub fn lt(column: impl Into<String>, term: impl Into<Value>) -> Self {
        Self::single(Comparator::Lt, column, term)
    }

    pub fn lte(column: impl Into<String>, term: impl Into<Value>) -> Self {
        Self::single(Comparator::Lte, column, term)
    }

    pub fn tuple_eq<I, T>(column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::multi(Comparator::TupleEq, column, terms)
    }

    pub fn tuple_gt<I, T>(column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::multi(Comparator::TupleGt, column, terms)
    }

    pub fn tuple_gte<I, T>(column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::multi(Comparator::TupleGte, column, terms)
    }

    pub fn tuple_lt<I, T>(column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::multi(Comparator::TupleLt, column, terms)
    }

    pub fn tuple_lte<I, T>(column: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::multi(Comparator::TupleLte, column, terms)
    }

    ///
    /// READERS
    ///

    #[must_use]
    pub const fn comparator(&self) -> Comparator {
        self.comparator
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn terms(&self) -> &[Value] {
        &self.terms
    }

    #[must_use]
    pub(crate) fn with_terms(&self, terms: Vec<Value>) -> Self {
        Self {
            comparator: self.comparator,
            column: self.column.clone(),
            terms,
        }
    }

    ///
    /// RENDERING
    ///

    /// CQL fragment plus bind values. The column identifier is emitted
    /// lowercased; `In` binds the whole term list as a single collection
    /// argument, tuple comparators bind one value per term.
    #[must_use]
    pub(crate) fn cql(&self) -> (String, Vec<Value>) {
        let column = self.column.to_lowercase();
        let symbol = self.comparator.symbol();

        match self.comparator {
            Comparator::In => (
                format!("{column} IN ?"),
                vec![Value::List(self.terms.clone())],
            ),
            c if c.is_tuple() => {
                let placeholders = vec!["?"; self.terms.len()].join(",");
                (
                    format!("{column} {symbol} ({placeholders})"),
                    self.terms.clone(),
                )
            }
            _ => (format!("{column} {symbol} ?"), self.terms.clone()),
        }
    }

    ///
    /// EVALUATION
    ///
    /// In-memory check of a stored cell against this relation, used by
    /// the mock row store. Values are coerced to comparison primitives
    /// first; kind mismatches fail the comparison without erroring.
    ///

    #[must_use]
    pub fn accept(&self, value: &Value) -> bool {
        match self.comparator {
            Comparator::Eq | Comparator::In => self.any_term_equals(value),
            Comparator::Gt => self.ordered(value, &[Ordering::Greater]),
            Comparator::Gte => self.ordered(value, &[Ordering::Greater, Ordering::Equal]),
            Comparator::Lt => self.ordered(value, &[Ordering::Less]),
            Comparator::Lte => self.ordered(value, &[Ordering::Less, Ordering::Equal]),
            Comparator::TupleEq => self.tuple_ordered(value, &[Ordering::Equal]),
            Comparator::TupleGt => self.tuple_ordered(value, &[Ordering::Greater]),
            Comparator::TupleGte => {
                self.tuple_ordered(value, &[Ordering::Greater, Ordering::Equal])
            }
            Comparator::TupleLt => self.tuple_ordered(value, &[Ordering::Less]),
            Comparator::TupleLte => self.tuple_ordered(value, &[Ordering::Less, Ordering::Equal]),
        }
    }

    fn any_term_equals(&self, value: &Value) -> bool {
        let cell = coerce(value);
        self.terms
            .iter()
            .any(|term| coerced_eq(&cell, &coerce(term)))
    }

    fn ordered(&self, value: &Value, accepted: &[Ordering]) -> bool {
        let Some(term) = self.terms.first() else {
            return false;
        };
        coerced_cmp(&coerce(value), &coerce(term))
            .is_some_and(|ordering| accepted.contains(&ordering))
    }

    /// Lexicographic tuple comparison: a list-valued cell is compared
    /// element by element against the ordered terms; a scalar cell is a
    /// one-element tuple.
    fn tuple_ordered(&self, value: &Value, accepted: &[Ordering]) -> bool {
        let cell_items: Vec<&Value> = match value {
            Value::List(items) => items.iter().collect(),
            scalar => vec![scalar],
        };

        for (cell, term) in cell_items.iter().zip(self.terms.iter()) {
            match coerced_cmp(&coerce(cell), &coerce(term)) {
                Some(Ordering::Equal) => {}
                Some(ordering) => return accepted.contains(&ordering),
                None => return false,
            }
        }

        accepted.contains(&cell_items.len().cmp(&self.terms.len()))
    }
}
