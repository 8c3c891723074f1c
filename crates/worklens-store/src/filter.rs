//! Filter predicates for store queries
//!
//! The store understands five operators: `=`, `in`, `>=`, `<` (date
//! ranges), and `like` (substring with `%` wildcards, used for the
//! serialized assignee field).

use serde::{Deserialize, Serialize};

/// Comparison operator applied to one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Exact equality.
    Eq,
    /// Membership in a value list (batched identifier lookups).
    In,
    /// Greater-or-equal (range start).
    Gte,
    /// Strictly-less (exclusive range end).
    Lt,
    /// Substring match with `%` wildcards.
    Like,
}

impl Operator {
    /// Wire spelling used by the REST backend.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::In => "in",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Like => "like",
        }
    }
}

/// Value side of a filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Scalar comparison value.
    Str(String),
    /// Value list for [`Operator::In`].
    List(Vec<String>),
}

/// One `(field, operator, value)` predicate; predicates on a query AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Record field name.
    pub field: String,
    /// Comparison operator.
    pub op: Operator,
    /// Comparison value.
    pub value: FilterValue,
}

impl FieldFilter {
    /// Equality predicate.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: Operator::Eq,
            value: FilterValue::Str(value.into()),
        }
    }

    /// Membership predicate over an identifier list.
    #[must_use]
    pub fn in_list(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            op: Operator::In,
            value: FilterValue::List(values),
        }
    }

    /// Range-start predicate.
    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: Operator::Gte,
            value: FilterValue::Str(value.into()),
        }
    }

    /// Exclusive range-end predicate.
    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: Operator::Lt,
            value: FilterValue::Str(value.into()),
        }
    }

    /// Substring predicate; callers supply their own `%` wildcards.
    #[must_use]
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: Operator::Like,
            value: FilterValue::Str(pattern.into()),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Wire spelling.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Result ordering requested from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to order by.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl OrderBy {
    /// Ascending order on `field`.
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending order on `field`.
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}
