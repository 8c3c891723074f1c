//! In-memory store
//!
//! Implements the full [`RecordStore`] operator contract against seeded
//! JSON rows. Backs the strategy compatibility tests and local dry
//! runs; date comparisons work because creation timestamps are
//! sortable ISO-like strings.

use crate::error::StoreError;
use crate::filter::{FieldFilter, FilterValue, Operator, SortOrder};
use crate::store::{ListQuery, RecordKind, RecordStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Seedable [`RecordStore`] double with real operator semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKind, Vec<serde_json::Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all records of `kind`.
    pub fn seed(&self, kind: RecordKind, rows: Vec<serde_json::Value>) {
        self.records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(kind, rows);
    }

    /// Append one record of `kind`.
    pub fn push(&self, kind: RecordKind, row: serde_json::Value) {
        self.records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(row);
    }

    /// Number of seeded records of `kind`.
    #[must_use]
    pub fn len(&self, kind: RecordKind) -> usize {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Whether no records of `kind` are seeded.
    #[must_use]
    pub fn is_empty(&self, kind: RecordKind) -> bool {
        self.len(kind) == 0
    }

    fn matches(row: &serde_json::Value, filter: &FieldFilter) -> Result<bool, StoreError> {
        let actual = field_text(row, &filter.field);
        Ok(match (&filter.op, &filter.value) {
            (Operator::Eq, FilterValue::Str(expected)) => {
                actual.as_deref() == Some(expected.as_str())
            }
            (Operator::In, FilterValue::List(values)) => actual
                .as_deref()
                .is_some_and(|a| values.iter().any(|v| v == a)),
            (Operator::Gte, FilterValue::Str(bound)) => {
                actual.as_deref().is_some_and(|a| a >= bound.as_str())
            }
            (Operator::Lt, FilterValue::Str(bound)) => {
                actual.as_deref().is_some_and(|a| a < bound.as_str())
            }
            (Operator::Like, FilterValue::Str(pattern)) => {
                actual.as_deref().is_some_and(|a| like_match(a, pattern))
            }
            (op, value) => {
                return Err(StoreError::InvalidQuery(format!(
                    "operator {op:?} does not accept value {value:?}"
                )))
            }
        })
    }

    fn project(row: &serde_json::Value, fields: &[String]) -> serde_json::Value {
        let Some(object) = row.as_object() else {
            return row.clone();
        };
        if fields.is_empty() {
            return row.clone();
        }
        let projected: serde_json::Map<String, serde_json::Value> = object
            .iter()
            .filter(|(key, _)| fields.iter().any(|f| f == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        serde_json::Value::Object(projected)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<serde_json::Value>, StoreError> {
        let records = self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let rows = records.get(&query.kind).cloned().unwrap_or_default();
        drop(records);

        let mut matched = Vec::new();
        for row in rows {
            let mut keep = true;
            for filter in &query.filters {
                if !Self::matches(&row, filter)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                matched.push(row);
            }
        }

        if let Some(order) = &query.order_by {
            matched.sort_by(|a, b| {
                let left = field_text(a, &order.field).unwrap_or_default();
                let right = field_text(b, &order.field).unwrap_or_default();
                match order.order {
                    SortOrder::Asc => left.cmp(&right),
                    SortOrder::Desc => right.cmp(&left),
                }
            });
        }

        matched.truncate(query.limit);
        Ok(matched
            .iter()
            .map(|row| Self::project(row, &query.fields))
            .collect())
    }
}

/// Textual form of a record field, `None` when absent or null.
fn field_text(row: &serde_json::Value, field: &str) -> Option<String> {
    match row.get(field)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// SQL-LIKE match: `%` matches any run of characters, case-insensitive.
fn like_match(text: &str, pattern: &str) -> bool {
    let mut regex = String::from("^");
    for ch in pattern.chars() {
        if ch == '%' {
            regex.push_str(".*");
        } else {
            regex.push_str(&regex::escape(&ch.to_string()));
        }
    }
    regex.push('$');
    regex::RegexBuilder::new(&regex)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}
