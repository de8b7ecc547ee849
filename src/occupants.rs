//! Monsters and objects standing on cells
//!
//! Cells only hold handles. Whoever owns the actual monster and object lists
//! implements [`Occupants`]; generators call it when they overwrite a cell
//! that something is standing on.

use std::collections::HashMap;

use crate::feature::FeatureId;
use crate::grid::{MonsterRef, ObjectRef};

/// What kind of object was removed from the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Plain,
    /// Unique artifact; its "already generated" count is reset so it can
    /// appear again
    FixedArtifact,
    RandomArtifact,
}

/// Description of an object deleted by a generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovedObject {
    pub name: String,
    pub kind: ObjectKind,
}

impl RemovedObject {
    pub fn plain(name: &str) -> Self {
        Self { name: name.to_string(), kind: ObjectKind::Plain }
    }

    pub fn is_artifact(&self) -> bool {
        self.kind != ObjectKind::Plain
    }
}

/// Owner of the monster and object lists.
pub trait Occupants {
    /// Whether the monster could stand on `feat`.
    fn monster_can_cross(&self, monster: MonsterRef, feat: FeatureId) -> bool;

    fn delete_monster(&mut self, monster: MonsterRef);

    /// Delete the whole stack headed by `head` and report what it held.
    fn remove_objects(&mut self, head: ObjectRef) -> Vec<RemovedObject>;
}

/// Floors with nothing on them.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOccupants;

impl Occupants for NoOccupants {
    fn monster_can_cross(&self, _monster: MonsterRef, _feat: FeatureId) -> bool {
        false
    }

    fn delete_monster(&mut self, _monster: MonsterRef) {}

    fn remove_objects(&mut self, _head: ObjectRef) -> Vec<RemovedObject> {
        Vec::new()
    }
}

/// In-memory monster and object lists.
#[derive(Clone, Debug, Default)]
pub struct OccupantLedger {
    next_id: u32,
    /// Monster -> features it can cross
    monsters: HashMap<MonsterRef, Vec<FeatureId>>,
    stacks: HashMap<ObjectRef, Vec<RemovedObject>>,
    /// Fixed artifacts returned to the pool
    released_artifacts: Vec<String>,
}

impl OccupantLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Register a monster able to cross the given features.
    pub fn spawn_monster(&mut self, crosses: &[FeatureId]) -> MonsterRef {
        let id = MonsterRef(self.next());
        self.monsters.insert(id, crosses.to_vec());
        id
    }

    /// Register an object stack.
    pub fn drop_stack(&mut self, items: Vec<RemovedObject>) -> ObjectRef {
        let id = ObjectRef(self.next());
        self.stacks.insert(id, items);
        id
    }

    pub fn has_monster(&self, monster: MonsterRef) -> bool {
        self.monsters.contains_key(&monster)
    }

    pub fn has_stack(&self, head: ObjectRef) -> bool {
        self.stacks.contains_key(&head)
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    pub fn released_artifacts(&self) -> &[String] {
        &self.released_artifacts
    }
}

impl Occupants for OccupantLedger {
    fn monster_can_cross(&self, monster: MonsterRef, feat: FeatureId) -> bool {
        self.monsters.get(&monster).is_some_and(|crosses| crosses.contains(&feat))
    }

    fn delete_monster(&mut self, monster: MonsterRef) {
        self.monsters.remove(&monster);
    }

    fn remove_objects(&mut self, head: ObjectRef) -> Vec<RemovedObject> {
        let removed = self.stacks.remove(&head).unwrap_or_default();
        for obj in &removed {
            if obj.kind == ObjectKind::FixedArtifact {
                self.released_artifacts.push(obj.name.clone());
            }
        }
        removed
    }
}
