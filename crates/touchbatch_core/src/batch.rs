//! Drained touch work, grouped for batched writes.

use crate::types::{ClassTag, Column, RecordId, RecordKey};

/// Records of one class that share a column in a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBatch {
    class: ClassTag,
    ids: Vec<RecordId>,
}

impl ClassBatch {
    /// Returns the class every record in this batch belongs to.
    #[must_use]
    pub fn class(&self) -> &ClassTag {
        &self.class
    }

    /// Returns the record identities, in registration order.
    #[must_use]
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// Iterates over the batch as record keys.
    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.ids
            .iter()
            .map(|id| RecordKey::new(self.class.clone(), *id))
    }
}

/// Everything drained for one column, grouped by class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBatch {
    column: Column,
    classes: Vec<ClassBatch>,
}

impl ColumnBatch {
    /// Groups `keys` by class. Classes appear in the order first seen.
    pub(crate) fn group(column: Column, keys: Vec<RecordKey>) -> Self {
        let mut classes: Vec<ClassBatch> = Vec::new();
        for key in keys {
            match classes.iter_mut().find(|b| &b.class == key.class()) {
                Some(batch) => batch.ids.push(key.id()),
                None => classes.push(ClassBatch {
                    class: key.class().clone(),
                    ids: vec![key.id()],
                }),
            }
        }
        Self { column, classes }
    }

    /// Returns the column.
    #[must_use]
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the per-class groups.
    #[must_use]
    pub fn classes(&self) -> &[ClassBatch] {
        &self.classes
    }

    /// Returns the identities queued for `class`, if any.
    #[must_use]
    pub fn ids_for(&self, class: &ClassTag) -> Option<&[RecordId]> {
        self.classes
            .iter()
            .find(|b| &b.class == class)
            .map(ClassBatch::ids)
    }

    /// Total number of records across all classes.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.classes.iter().map(|b| b.ids.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(class: &str, id: u64) -> RecordKey {
        RecordKey::new(ClassTag::new(class), RecordId::from_u64(id))
    }

    #[test]
    fn groups_by_class_in_first_seen_order() {
        let batch = ColumnBatch::group(
            Column::from(""),
            vec![key("Person", 1), key("Pet", 9), key("Person", 2)],
        );

        assert_eq!(batch.classes().len(), 2);
        assert_eq!(batch.classes()[0].class().as_str(), "Person");
        assert_eq!(
            batch.ids_for(&ClassTag::new("Person")),
            Some(&[RecordId::from_u64(1), RecordId::from_u64(2)][..])
        );
        assert_eq!(
            batch.ids_for(&ClassTag::new("Pet")),
            Some(&[RecordId::from_u64(9)][..])
        );
        assert_eq!(batch.record_count(), 3);
    }

    #[test]
    fn keys_rebuild_record_keys() {
        let batch = ColumnBatch::group(Column::from("x"), vec![key("Pet", 4)]);
        let keys: Vec<_> = batch.classes()[0].keys().collect();
        assert_eq!(keys, vec![key("Pet", 4)]);
    }
}
