use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use types::{ClassroomId, EntryId, GroupId, TeacherId, TimeSlotId, TimetableEntry};

/// Grouping indices over a live entry set.
///
/// Every double-booking question becomes a bucket lookup keyed by
/// (resource, slot), so neither the detector nor the move validator needs a
/// pairwise scan.
#[derive(Clone, Debug, Default)]
pub struct EntryIndex {
    entries: BTreeMap<EntryId, TimetableEntry>,
    by_teacher_slot: HashMap<(TeacherId, TimeSlotId), Vec<EntryId>>,
    by_room_slot: HashMap<(ClassroomId, TimeSlotId), Vec<EntryId>>,
    by_group_slot: HashMap<(GroupId, TimeSlotId), Vec<EntryId>>,
    by_teacher: HashMap<TeacherId, Vec<EntryId>>,
    by_group: HashMap<GroupId, Vec<EntryId>>,
}

fn push<K: Hash + Eq>(map: &mut HashMap<K, Vec<EntryId>>, key: K, id: &EntryId) {
    map.entry(key).or_default().push(id.clone());
}

fn pull<K: Hash + Eq>(map: &mut HashMap<K, Vec<EntryId>>, key: &K, id: &EntryId) {
    if let Some(v) = map.get_mut(key) {
        v.retain(|x| x != id);
        if v.is_empty() {
            map.remove(key);
        }
    }
}

impl EntryIndex {
    pub fn build(entries: impl IntoIterator<Item = TimetableEntry>) -> Self {
        let mut idx = Self::default();
        for e in entries {
            idx.insert(e);
        }
        idx
    }

    /// Adds an entry, replacing any previous entry with the same id.
    pub fn insert(&mut self, e: TimetableEntry) {
        self.remove(&e.id);
        push(
            &mut self.by_teacher_slot,
            (e.teacher_id.clone(), e.time_slot_id.clone()),
            &e.id,
        );
        push(
            &mut self.by_room_slot,
            (e.classroom_id.clone(), e.time_slot_id.clone()),
            &e.id,
        );
        push(
            &mut self.by_group_slot,
            (e.group_id.clone(), e.time_slot_id.clone()),
            &e.id,
        );
        push(&mut self.by_teacher, e.teacher_id.clone(), &e.id);
        push(&mut self.by_group, e.group_id.clone(), &e.id);
        self.entries.insert(e.id.clone(), e);
    }

    pub fn remove(&mut self, id: &EntryId) -> Option<TimetableEntry> {
        let e = self.entries.remove(id)?;
        pull(
            &mut self.by_teacher_slot,
            &(e.teacher_id.clone(), e.time_slot_id.clone()),
            id,
        );
        pull(
            &mut self.by_room_slot,
            &(e.classroom_id.clone(), e.time_slot_id.clone()),
            id,
        );
        pull(
            &mut self.by_group_slot,
            &(e.group_id.clone(), e.time_slot_id.clone()),
            id,
        );
        pull(&mut self.by_teacher, &e.teacher_id, id);
        pull(&mut self.by_group, &e.group_id, id);
        Some(e)
    }

    pub fn get(&self, id: &EntryId) -> Option<&TimetableEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in id order.
    pub fn entries(&self) -> impl Iterator<Item = &TimetableEntry> + '_ {
        self.entries.values()
    }

    pub fn into_entries(self) -> Vec<TimetableEntry> {
        self.entries.into_values().collect()
    }

    pub fn teacher_slot(&self, teacher: &TeacherId, slot: &TimeSlotId) -> &[EntryId] {
        // keys are owned; a borrowed tuple lookup would need a custom Borrow impl
        self.by_teacher_slot
            .get(&(teacher.clone(), slot.clone()))
            .map_or(&[], Vec::as_slice)
    }

    pub fn room_slot(&self, room: &ClassroomId, slot: &TimeSlotId) -> &[EntryId] {
        self.by_room_slot
            .get(&(room.clone(), slot.clone()))
            .map_or(&[], Vec::as_slice)
    }

    pub fn group_slot(&self, group: &GroupId, slot: &TimeSlotId) -> &[EntryId] {
        self.by_group_slot
            .get(&(group.clone(), slot.clone()))
            .map_or(&[], Vec::as_slice)
    }

    pub fn teacher_entries(&self, teacher: &TeacherId) -> &[EntryId] {
        self.by_teacher.get(teacher).map_or(&[], Vec::as_slice)
    }

    pub fn group_entries(&self, group: &GroupId) -> &[EntryId] {
        self.by_group.get(group).map_or(&[], Vec::as_slice)
    }

    pub fn teacher_slot_buckets(&self) -> impl Iterator<Item = (&(TeacherId, TimeSlotId), &Vec<EntryId>)> {
        self.by_teacher_slot.iter()
    }

    pub fn room_slot_buckets(&self) -> impl Iterator<Item = (&(ClassroomId, TimeSlotId), &Vec<EntryId>)> {
        self.by_room_slot.iter()
    }

    pub fn group_slot_buckets(&self) -> impl Iterator<Item = (&(GroupId, TimeSlotId), &Vec<EntryId>)> {
        self.by_group_slot.iter()
    }

    pub fn teachers(&self) -> impl Iterator<Item = (&TeacherId, &Vec<EntryId>)> {
        self.by_teacher.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&GroupId, &Vec<EntryId>)> {
        self.by_group.iter()
    }
}
