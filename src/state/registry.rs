//! Concurrent room registry.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};

use crate::state::game::Room;

/// Name-keyed set of live rooms.
///
/// Map shards are only held for the insert, lookup or removal itself; callers receive
/// cloned `Arc<Room>` handles and take room locks after the shard is released.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Room>>,
}

impl RoomRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `room` unless its name is taken.
    pub fn insert(&self, room: Room) -> Option<Arc<Room>> {
        match self.rooms.entry(room.name().to_owned()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let room = Arc::new(room);
                slot.insert(room.clone());
                Some(room)
            }
        }
    }

    /// Handle to the room called `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Room>> {
        self.rooms.get(name).map(|entry| entry.value().clone())
    }

    /// Take the room called `name` out of the registry.
    pub fn remove(&self, name: &str) -> Option<Arc<Room>> {
        self.rooms.remove(name).map(|(_, room)| room)
    }

    /// Remove `room` only if the name still maps to that exact instance.
    pub fn remove_instance(&self, room: &Arc<Room>) -> bool {
        self.rooms
            .remove_if(room.name(), |_, current| Arc::ptr_eq(current, room))
            .is_some()
    }

    /// Every live room, ordered by name.
    pub fn rooms(&self) -> Vec<Arc<Room>> {
        let mut rooms = self
            .rooms
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        rooms.sort_by(|a, b| a.name().cmp(b.name()));
        rooms
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room is live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::RoomConfig;

    fn room(name: &str) -> Room {
        Room::new(
            name,
            RoomConfig {
                max_players: 2,
                max_draft_count: 1,
                max_votes: 1,
                display_ties: false,
            },
            "host",
        )
    }

    #[test]
    fn duplicate_names_are_refused() {
        let registry = RoomRegistry::new();
        assert!(registry.insert(room("r1")).is_some());
        assert!(registry.insert(room("r1")).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_instance_ignores_replacements() {
        let registry = RoomRegistry::new();
        let original = registry.insert(room("r1")).unwrap();
        registry.remove("r1");
        let replacement = registry.insert(room("r1")).unwrap();

        assert!(!registry.remove_instance(&original));
        assert!(registry.get("r1").is_some());
        assert!(registry.remove_instance(&replacement));
        assert!(registry.is_empty());
    }

    #[test]
    fn rooms_are_listed_by_name() {
        let registry = RoomRegistry::new();
        for name in ["charlie", "alpha", "bravo"] {
            registry.insert(room(name));
        }
        let names = registry
            .rooms()
            .iter()
            .map(|r| r.name().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, ["alpha", "bravo", "charlie"]);
    }
}
