use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use im::{HashMap, Vector};
use itertools::Itertools;

/// A record that can live in an [`EntityStore`]: it has a unique key and
/// a partial-snapshot form used for shallow-merge upserts.
pub trait Entity: Clone {
    type Id: Clone + Eq + Hash + Debug;
    type Patch;

    fn id(&self) -> Self::Id;
    fn patch_id(patch: &Self::Patch) -> Self::Id;

    /// Shallow-merge a partial snapshot over this record. Fields the patch
    /// does not carry stay untouched.
    fn apply(&mut self, patch: Self::Patch);

    /// Build a full record from a patch alone, for the insert path of a
    /// merge-upsert on an absent key.
    fn from_patch(patch: Self::Patch) -> Self;
}

/// A uniquely-keyed collection with a deterministic iteration order.
///
/// `ids` always holds exactly the keys of `entities`, sorted by the
/// comparator fixed at construction. The two are only ever updated
/// together; no caller can observe one without the other.
#[derive(Clone)]
pub struct EntityStore<T: Entity> {
    ids: Vector<T::Id>,
    entities: HashMap<T::Id, T>,
    compare: fn(&T, &T) -> Ordering,
    version: u64,
}

impl<T: Entity> EntityStore<T> {
    pub fn new(compare: fn(&T, &T) -> Ordering) -> Self {
        Self {
            ids: Vector::new(),
            entities: HashMap::new(),
            compare,
            version: 0,
        }
    }

    /// Insert or replace each record, then recompute the key order.
    pub fn upsert_many<I: IntoIterator<Item = T>>(&mut self, records: I) {
        for record in records {
            let id = record.id();
            if self.entities.insert(id.clone(), record).is_none() {
                self.ids.push_back(id);
            }
        }
        self.finish_mutation();
    }

    pub fn upsert_one(&mut self, record: T) {
        self.upsert_many(std::iter::once(record));
    }

    /// Insert a record assumed to be new. An already-present key is treated
    /// as an upsert rather than an error.
    pub fn add_one(&mut self, record: T) {
        if self.entities.contains_key(&record.id()) {
            log::debug!("add_one on existing key {:?}, upserting", record.id());
        }
        self.upsert_one(record);
    }

    /// Shallow-merge upsert: apply the patch over the existing record, or
    /// insert a record built from the patch when the key is absent.
    pub fn merge_one(&mut self, patch: T::Patch) {
        let id = T::patch_id(&patch);
        match self.entities.get_mut(&id) {
            Some(existing) => existing.apply(patch),
            None => {
                self.entities.insert(id.clone(), T::from_patch(patch));
                self.ids.push_back(id);
            }
        }
        self.finish_mutation();
    }

    /// Remove key and record together. No-op when the key is absent.
    pub fn remove_one(&mut self, id: &T::Id) {
        if self.entities.remove(id).is_some() {
            self.ids.retain(|e| e != id);
            self.version += 1;
        }
    }

    /// Mutate a record in place, then recompute the order (the closure may
    /// have changed the sort key). Returns false when the key is absent.
    pub fn modify(&mut self, id: &T::Id, f: impl FnOnce(&mut T)) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        f(entity);
        self.finish_mutation();
        true
    }

    /// All records in comparator order.
    pub fn all(&self) -> impl Iterator<Item = &T> {
        self.ids.iter().filter_map(move |id| self.entities.get(id))
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.entities.get(id)
    }

    /// The key sequence in comparator order.
    pub fn ids(&self) -> &Vector<T::Id> {
        &self.ids
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Bumped on every mutation; memoized selectors key off it.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn finish_mutation(&mut self) {
        let entities = &self.entities;
        let compare = self.compare;
        // Stable sort over the previous order, so equal keys keep their
        // insertion-relative position.
        self.ids = self
            .ids
            .iter()
            .cloned()
            .sorted_by(|a, b| match (entities.get(a), entities.get(b)) {
                (Some(ea), Some(eb)) => compare(ea, eb),
                _ => Ordering::Equal,
            })
            .collect();
        self.version += 1;
    }
}

impl<T: Entity + PartialEq> PartialEq for EntityStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids && self.entities == other.entities
    }
}

impl<T: Entity + Eq> Eq for EntityStore<T> {}

impl<T: Entity> Debug for EntityStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("ids", &self.ids)
            .field("len", &self.entities.len())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Note {
        id: u64,
        stamp: i64,
        text: String,
    }

    struct NotePatch {
        id: u64,
        stamp: i64,
    }

    impl Entity for Note {
        type Id = u64;
        type Patch = NotePatch;

        fn id(&self) -> u64 {
            self.id
        }

        fn patch_id(patch: &NotePatch) -> u64 {
            patch.id
        }

        fn apply(&mut self, patch: NotePatch) {
            self.stamp = patch.stamp;
        }

        fn from_patch(patch: NotePatch) -> Self {
            Note {
                id: patch.id,
                stamp: patch.stamp,
                text: String::new(),
            }
        }
    }

    fn newest_first(a: &Note, b: &Note) -> Ordering {
        b.stamp.cmp(&a.stamp)
    }

    fn note(id: u64, stamp: i64) -> Note {
        Note {
            id,
            stamp,
            text: format!("note {id}"),
        }
    }

    fn store_with(notes: Vec<Note>) -> EntityStore<Note> {
        let mut store = EntityStore::new(newest_first);
        store.upsert_many(notes);
        store
    }

    fn assert_consistent(store: &EntityStore<Note>) {
        assert_eq!(store.ids().len(), store.len());
        for id in store.ids() {
            let entity = store.get(id).expect("id without entity");
            assert_eq!(&entity.id, id);
        }
    }

    fn assert_sorted(store: &EntityStore<Note>) {
        let stamps: Vec<i64> = store.all().map(|n| n.stamp).collect();
        let mut expected = stamps.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(stamps, expected);
    }

    #[test]
    fn upsert_sorts_newest_first() {
        let store = store_with(vec![note(1, 10), note(2, 30), note(3, 20)]);
        assert_eq!(store.ids().iter().cloned().collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_consistent(&store);
    }

    #[test]
    fn mixed_operations_keep_ids_and_entities_consistent() {
        let mut store = store_with(vec![note(1, 10), note(2, 20)]);
        store.add_one(note(3, 5));
        store.remove_one(&1);
        store.upsert_one(note(2, 40));
        store.merge_one(NotePatch { id: 4, stamp: 15 });
        store.remove_one(&99);
        assert_consistent(&store);
        assert_sorted(&store);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn upsert_many_is_idempotent() {
        let records = vec![note(1, 10), note(2, 30), note(3, 20)];
        let mut store = store_with(records.clone());
        let snapshot = store.clone();
        store.upsert_many(records);
        assert_eq!(store, snapshot);
    }

    #[test]
    fn equal_sort_keys_keep_insertion_order() {
        let mut store = store_with(vec![note(1, 10), note(2, 10), note(3, 10)]);
        store.upsert_one(note(4, 10));
        assert_eq!(
            store.ids().iter().cloned().collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn add_one_on_existing_key_upserts() {
        let mut store = store_with(vec![note(1, 10)]);
        store.add_one(note(1, 50));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&1).unwrap().stamp, 50);
    }

    #[test]
    fn remove_absent_key_is_a_noop() {
        let mut store = store_with(vec![note(1, 10)]);
        let snapshot = store.clone();
        store.remove_one(&7);
        assert_eq!(store, snapshot);
    }

    #[test]
    fn merge_one_preserves_unpatched_fields() {
        let mut store = store_with(vec![note(1, 10)]);
        store.merge_one(NotePatch { id: 1, stamp: 99 });
        let merged = store.get(&1).unwrap();
        assert_eq!(merged.stamp, 99);
        assert_eq!(merged.text, "note 1");
    }

    #[test]
    fn merge_one_inserts_on_absent_key() {
        let mut store = store_with(vec![note(1, 10)]);
        store.merge_one(NotePatch { id: 2, stamp: 20 });
        assert!(store.contains(&2));
        assert_sorted(&store);
    }

    #[test]
    fn modify_resorts_and_reports_missing_keys() {
        let mut store = store_with(vec![note(1, 10), note(2, 20)]);
        assert!(store.modify(&1, |n| n.stamp = 30));
        assert_eq!(store.ids().iter().cloned().collect::<Vec<_>>(), vec![1, 2]);
        assert!(!store.modify(&9, |n| n.stamp = 0));
    }

    #[test]
    fn version_changes_on_mutation_only() {
        let mut store = store_with(vec![note(1, 10)]);
        let v = store.version();
        let _ = store.all().count();
        let _ = store.get(&1);
        assert_eq!(store.version(), v);
        store.upsert_one(note(2, 5));
        assert!(store.version() > v);
    }
}
