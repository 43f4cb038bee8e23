//! Pending and written touch sets.

use crate::types::{Column, RecordKey};
use std::collections::{HashMap, HashSet};

/// An insertion-ordered set of record keys.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordSet {
    order: Vec<RecordKey>,
    members: HashSet<RecordKey>,
}

impl RecordSet {
    /// Inserts a key, returning `false` if it was already present.
    pub(crate) fn insert(&mut self, key: RecordKey) -> bool {
        if self.members.contains(&key) {
            return false;
        }
        self.members.insert(key.clone());
        self.order.push(key);
        true
    }

    pub(crate) fn contains(&self, key: &RecordKey) -> bool {
        self.members.contains(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &RecordKey> {
        self.order.iter()
    }

    /// Removes and returns every key matching `pred`, keeping order.
    pub(crate) fn take_where<F>(&mut self, mut pred: F) -> Vec<RecordKey>
    where
        F: FnMut(&RecordKey) -> bool,
    {
        let (taken, kept): (Vec<_>, Vec<_>) = self.order.drain(..).partition(|k| pred(k));
        for key in &taken {
            self.members.remove(key);
        }
        self.order = kept;
        taken
    }
}

/// Column -> records still waiting to be written.
///
/// Columns keep their first-registration order. A column never maps to an
/// empty set; buckets are dropped as soon as they empty out.
#[derive(Debug, Default, Clone)]
pub(crate) struct PendingSet {
    buckets: Vec<(Column, RecordSet)>,
}

impl PendingSet {
    fn position(&self, column: &Column) -> Option<usize> {
        self.buckets.iter().position(|(c, _)| c == column)
    }

    /// Adds `key` under `column`. Returns `false` if it was already queued.
    pub(crate) fn insert(&mut self, column: &Column, key: RecordKey) -> bool {
        match self.position(column) {
            Some(idx) => self.buckets[idx].1.insert(key),
            None => {
                let mut set = RecordSet::default();
                set.insert(key);
                self.buckets.push((column.clone(), set));
                true
            }
        }
    }

    pub(crate) fn contains(&self, column: &Column, key: &RecordKey) -> bool {
        self.position(column)
            .is_some_and(|idx| self.buckets[idx].1.contains(key))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of (record, column) pairs queued.
    pub(crate) fn len(&self) -> usize {
        self.buckets.iter().map(|(_, set)| set.len()).sum()
    }

    pub(crate) fn columns(&self) -> impl Iterator<Item = &Column> {
        self.buckets.iter().map(|(c, _)| c)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.buckets.iter().flat_map(|(_, set)| set.iter())
    }

    /// Removes every key matching `pred` from every bucket.
    ///
    /// Returns the removed keys per column, in column order. Columns with
    /// nothing removed are omitted, and emptied buckets are dropped.
    pub(crate) fn take_where<F>(&mut self, mut pred: F) -> Vec<(Column, Vec<RecordKey>)>
    where
        F: FnMut(&RecordKey) -> bool,
    {
        let mut taken = Vec::new();
        for (column, set) in &mut self.buckets {
            let keys = set.take_where(&mut pred);
            if !keys.is_empty() {
                taken.push((column.clone(), keys));
            }
        }
        self.buckets.retain(|(_, set)| !set.is_empty());
        taken
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }
}

/// Column -> records already written in the current outermost scope.
#[derive(Debug, Default, Clone)]
pub(crate) struct WrittenSet {
    columns: HashMap<Column, HashSet<RecordKey>>,
}

impl WrittenSet {
    pub(crate) fn contains(&self, column: &Column, key: &RecordKey) -> bool {
        self.columns
            .get(column)
            .is_some_and(|set| set.contains(key))
    }

    pub(crate) fn insert(&mut self, column: &Column, key: RecordKey) {
        if let Some(set) = self.columns.get_mut(column) {
            set.insert(key);
        } else {
            self.columns.insert(column.clone(), HashSet::from([key]));
        }
    }

    pub(crate) fn remove(&mut self, column: &Column, key: &RecordKey) {
        if let Some(set) = self.columns.get_mut(column) {
            set.remove(key);
            if set.is_empty() {
                self.columns.remove(column);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.columns.values().map(HashSet::len).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.columns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassTag, RecordId};

    fn key(class: &str, id: u64) -> RecordKey {
        RecordKey::new(ClassTag::new(class), RecordId::from_u64(id))
    }

    #[test]
    fn record_set_dedups_and_keeps_order() {
        let mut set = RecordSet::default();
        assert!(set.insert(key("A", 2)));
        assert!(set.insert(key("A", 1)));
        assert!(!set.insert(key("A", 2)));

        let order: Vec<_> = set.iter().cloned().collect();
        assert_eq!(order, vec![key("A", 2), key("A", 1)]);
    }

    #[test]
    fn pending_columns_keep_first_registration_order() {
        let mut pending = PendingSet::default();
        pending.insert(&Column::from("b"), key("A", 1));
        pending.insert(&Column::from("a"), key("A", 1));
        pending.insert(&Column::from("b"), key("A", 2));

        let columns: Vec<_> = pending.columns().map(Column::as_str).collect();
        assert_eq!(columns, vec!["b", "a"]);
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn take_where_drops_empty_buckets() {
        let mut pending = PendingSet::default();
        pending.insert(&Column::from("x"), key("A", 1));
        pending.insert(&Column::from("y"), key("A", 2));
        pending.insert(&Column::from("y"), key("A", 3));

        let taken = pending.take_where(|k| k.id() != RecordId::from_u64(3));

        assert_eq!(taken.len(), 2);
        let columns: Vec<_> = pending.columns().map(Column::as_str).collect();
        assert_eq!(columns, vec!["y"]);
        assert!(pending.contains(&Column::from("y"), &key("A", 3)));
        assert!(!pending.contains(&Column::from("x"), &key("A", 1)));
    }

    #[test]
    fn written_remove_drops_empty_column() {
        let mut written = WrittenSet::default();
        let col = Column::from("x");
        written.insert(&col, key("A", 1));
        assert!(written.contains(&col, &key("A", 1)));

        written.remove(&col, &key("A", 1));
        assert!(written.is_empty());
    }
}
