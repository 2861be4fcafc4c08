use foundation::handles::Handle;

use crate::components::CorridorGeometry;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(pub Handle);

impl EntityId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

/// A named scene object. Corridors are the only graphics kind the viewer draws.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub corridor: CorridorGeometry,
}

#[derive(Debug, Default)]
pub struct EntityCollection {
    entities: Vec<Entity>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, name: String, corridor: CorridorGeometry) -> EntityId {
        let id = EntityId(Handle::new(self.entities.len() as u32, 0));
        self.entities.push(Entity { id, name, corridor });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(id.index() as usize)
            .filter(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
    }
}
