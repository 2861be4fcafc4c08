//! Per-frame vertex data, camera-relative and ready for upload.

use foundation::math::{CameraRelative, Vec3};
use scene::Scene;
use scene::entity::{EntityCollection, EntityId};
use tracing::debug;

use crate::globe::{PATCH_RINGS, PATCH_SEGMENTS, globe_patch, graticule_lines};
use crate::mesh::{CorridorMesh, tessellate_corridor};
use crate::renderer::{BoundsDraw, RenderFrame};
use crate::vertex::{LineVertex, SurfaceVertex};

/// Corridor meshes in ECEF, tessellated once per entity.
///
/// Entities are append-only, so only new ones are tessellated on sync.
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: Vec<(EntityId, CorridorMesh)>,
    graticule: Option<(f64, Vec<Vec3>)>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of newly tessellated corridors.
    pub fn sync(&mut self, entities: &EntityCollection) -> usize {
        if entities.len() < self.meshes.len() {
            self.meshes.clear();
        }
        let before = self.meshes.len();
        for entity in entities.iter().skip(before) {
            self.meshes
                .push((entity.id, tessellate_corridor(&entity.corridor)));
        }
        let added = self.meshes.len() - before;
        if added > 0 {
            debug!(added, total = self.meshes.len(), "tessellated corridors");
        }
        added
    }

    pub fn get(&self, id: EntityId) -> Option<&CorridorMesh> {
        self.meshes
            .iter()
            .find_map(|(mesh_id, mesh)| (*mesh_id == id).then_some(mesh))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    fn graticule(&mut self, step_deg: f64) -> &[Vec3] {
        let stale = self
            .graticule
            .as_ref()
            .is_none_or(|(step, _)| *step != step_deg);
        if stale {
            self.graticule = Some((step_deg, graticule_lines(step_deg)));
        }
        self.graticule
            .as_ref()
            .map_or(&[][..], |(_, lines)| lines.as_slice())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameGeometry {
    pub globe_vertices: Vec<SurfaceVertex>,
    pub globe_indices: Vec<u32>,
    pub mesh_vertices: Vec<SurfaceVertex>,
    pub mesh_indices: Vec<u32>,
    /// Line list: corridor outlines, tileset bounds and the graticule.
    pub lines: Vec<LineVertex>,
}

impl FrameGeometry {
    pub fn build(scene: &Scene, frame: &RenderFrame, cache: &mut MeshCache) -> Self {
        cache.sync(scene.entities());
        let rel = CameraRelative::new(frame.camera.eye);
        let mut out = FrameGeometry::default();

        let patch = globe_patch(frame.camera.eye, PATCH_RINGS, PATCH_SEGMENTS);
        out.globe_vertices = patch
            .positions
            .iter()
            .zip(&patch.normals)
            .map(|(p, n)| surface_vertex(rel, *p, *n, frame.globe.color))
            .collect();
        out.globe_indices = patch.indices;

        for draw in &frame.corridors {
            let Some(mesh) = cache.get(draw.entity) else {
                continue;
            };
            let base = out.mesh_vertices.len() as u32;
            out.mesh_vertices.extend(
                mesh.positions
                    .iter()
                    .zip(&mesh.normals)
                    .map(|(p, n)| surface_vertex(rel, *p, *n, draw.fill)),
            );
            out.mesh_indices
                .extend(mesh.indices.iter().map(|i| base + i));
            if let Some(color) = draw.outline {
                out.push_lines(rel, &mesh.outline, color);
            }
        }

        for bounds in &frame.tileset_bounds {
            out.push_lines(rel, &bounds_lines(bounds), bounds.color);
        }

        if let Some(g) = frame.graticule {
            out.push_lines(rel, cache.graticule(g.step_deg), g.color);
        }

        out
    }

    fn push_lines(&mut self, rel: CameraRelative, points: &[Vec3], color: [f32; 4]) {
        self.lines.extend(points.iter().map(|p| LineVertex {
            position: rel.to_f32(*p),
            color,
        }));
    }
}

fn surface_vertex(rel: CameraRelative, p: Vec3, n: Vec3, color: [f32; 4]) -> SurfaceVertex {
    SurfaceVertex {
        position: rel.to_f32(p),
        normal: [n.x as f32, n.y as f32, n.z as f32],
        color,
    }
}

fn bounds_lines(bounds: &BoundsDraw) -> Vec<Vec3> {
    scene::components::BoundingVolume::EDGES
        .iter()
        .flat_map(|&(a, b)| [bounds.corners[a], bounds.corners[b]])
        .collect()
}
