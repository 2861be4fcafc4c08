use foundation::handles::Handle;

use crate::components::{Color, TilesetPrimitive};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub Handle);

/// Latitude/longitude grid drawn over the globe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Graticule {
    pub show: bool,
    pub step_deg: f64,
    pub color: Color,
}

impl Default for Graticule {
    fn default() -> Self {
        Self {
            show: false,
            step_deg: 15.0,
            color: Color::new(0.65, 0.85, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Tileset(Box<TilesetPrimitive>),
    Graticule(Graticule),
}

/// Ordered collection of low-level scene primitives.
#[derive(Debug, Default)]
pub struct PrimitiveCollection {
    items: Vec<Primitive>,
}

impl PrimitiveCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = PrimitiveId(Handle::new(self.items.len() as u32, 0));
        self.items.push(primitive);
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Primitive> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.items.iter()
    }

    pub fn tilesets(&self) -> impl Iterator<Item = &TilesetPrimitive> {
        self.items.iter().filter_map(|p| match p {
            Primitive::Tileset(t) => Some(t.as_ref()),
            _ => None,
        })
    }

    pub fn tilesets_mut(&mut self) -> impl Iterator<Item = &mut TilesetPrimitive> {
        self.items.iter_mut().filter_map(|p| match p {
            Primitive::Tileset(t) => Some(t.as_mut()),
            _ => None,
        })
    }

    pub fn graticule_mut(&mut self) -> Option<&mut Graticule> {
        self.items.iter_mut().find_map(|p| match p {
            Primitive::Graticule(g) => Some(g),
            _ => None,
        })
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
