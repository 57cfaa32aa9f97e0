// ============================================================================
// src/view/sort.rs - Single-column record sorting
// ============================================================================
//
// - One sort key at a time, addressed by the field's persisted key
// - Stable: records that compare equal keep their incoming order, in both
//   directions
// - Money columns compare numerically, dates chronologically, everything
//   else case-insensitively
// - Unknown columns compare every record as equal (empty string)
//
// ============================================================================

use crate::core::{Field, FieldValue, PolicyRecord};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

// ============================================================================
// SORT DIRECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

// ============================================================================
// SORT KEY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Persisted field key, e.g. `totalAmount` or `custName`
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Descending)
    }

    /// `None` when the column is not part of the schema.
    pub fn field(&self) -> Option<Field> {
        Field::from_key(&self.column)
    }
}

// ============================================================================
// SORT VALUE
// ============================================================================

/// Comparable projection of one field of one record.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Text(String),
    Number(f64),
    Date(Option<NaiveDate>),
    Timestamp(DateTime<Utc>),
}

impl SortValue {
    fn of(record: &PolicyRecord, field: Option<Field>) -> Self {
        let Some(field) = field else {
            return Self::Text(String::new());
        };
        match record.value(field) {
            FieldValue::Text(text) => Self::Text(text.to_lowercase()),
            FieldValue::Money(amount) => Self::Number(amount),
            FieldValue::Date(date) => Self::Date(date),
            FieldValue::Timestamp(ts) => Self::Timestamp(ts),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            // Unset dates sort like the empty string: first
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            // One key per sort, so mixed kinds never meet
            _ => Ordering::Equal,
        }
    }
}

// ============================================================================
// SORT EXECUTOR
// ============================================================================

pub struct SortExecutor;

impl SortExecutor {
    /// Sorts `records` in place by `key`.
    ///
    /// Sort values are extracted once per record, then the slice is sorted
    /// with a stable sort so ties keep their incoming relative order.
    pub fn sort(records: &mut Vec<&PolicyRecord>, key: &SortKey) {
        if records.len() < 2 {
            return;
        }

        let field = key.field();
        let mut decorated: Vec<(SortValue, &PolicyRecord)> = records
            .iter()
            .map(|record| (SortValue::of(record, field), *record))
            .collect();

        decorated.sort_by(|(a, _), (b, _)| key.direction.apply(a.compare(b)));

        records.clear();
        records.extend(decorated.into_iter().map(|(_, record)| record));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use crate::core::PolicyDraft;

    fn store_with(entries: &[(&str, f64)]) -> RecordStore {
        let mut store = RecordStore::in_memory();
        for (name, premium) in entries {
            let mut draft = PolicyDraft::default();
            draft.customer.name = name.to_string();
            draft.policy.compulsory.premium = *premium;
            store.create(draft).unwrap();
        }
        store
    }

    fn names(records: &[&PolicyRecord]) -> Vec<String> {
        records.iter().map(|r| r.customer().name.clone()).collect()
    }

    #[test]
    fn test_direction_toggle() {
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.toggled(), SortDirection::Ascending);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let store = store_with(&[("bob", 0.0), ("Alice", 0.0), ("carol", 0.0)]);
        let mut rows: Vec<_> = store.all().iter().collect();
        SortExecutor::sort(&mut rows, &SortKey::ascending("custName"));
        assert_eq!(names(&rows), ["Alice", "bob", "carol"]);
    }

    #[test]
    fn test_money_sort_is_numeric() {
        let store = store_with(&[("a", 900.0), ("b", 10000.0), ("c", 95.5)]);
        let mut rows: Vec<_> = store.all().iter().collect();
        SortExecutor::sort(&mut rows, &SortKey::ascending("totalAmount"));
        assert_eq!(names(&rows), ["c", "a", "b"]);
    }

    #[test]
    fn test_ties_keep_incoming_order_both_directions() {
        let store = store_with(&[("a", 5.0), ("b", 1.0), ("c", 5.0), ("d", 1.0)]);
        let mut rows: Vec<_> = store.all().iter().collect();
        SortExecutor::sort(&mut rows, &SortKey::ascending("totalAmount"));
        assert_eq!(names(&rows), ["b", "d", "a", "c"]);

        let mut rows: Vec<_> = store.all().iter().collect();
        SortExecutor::sort(&mut rows, &SortKey::descending("totalAmount"));
        assert_eq!(names(&rows), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_unknown_column_keeps_order() {
        let store = store_with(&[("z", 3.0), ("y", 2.0), ("x", 1.0)]);
        let mut rows: Vec<_> = store.all().iter().collect();
        SortExecutor::sort(&mut rows, &SortKey::descending("noSuchColumn"));
        assert_eq!(names(&rows), ["z", "y", "x"]);
    }

    #[test]
    fn test_unset_dates_sort_first() {
        let mut store = RecordStore::in_memory();
        for (name, start) in [("later", Some((2025, 1, 1))), ("unset", None), ("early", Some((2023, 6, 1)))] {
            let mut draft = PolicyDraft::default();
            draft.customer.name = name.to_string();
            draft.policy.voluntary.start =
                start.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
            store.create(draft).unwrap();
        }
        let mut rows: Vec<_> = store.all().iter().collect();
        SortExecutor::sort(&mut rows, &SortKey::ascending("startVOL"));
        assert_eq!(names(&rows), ["unset", "early", "later"]);
    }
}
