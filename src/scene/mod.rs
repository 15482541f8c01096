//! Engine-agnostic scene model.
//!
//! The loaded 3D asset is flattened into a `SceneModel`: a flat list of
//! named nodes carrying world transforms, optional mesh geometry, material
//! slots and a free-form key/value tag map (Blender custom properties ride
//! in as glTF extras). The plane registry consumes scenes through the
//! [`TagSource`] trait, so it never depends on how the asset was loaded.

pub mod gltf;
pub mod registry;
pub mod texture;

use glam::Mat4;

/// Handle to a node inside a [`SceneModel`]. Stable for the lifetime of the
/// loaded model; a reloaded model invalidates all handles.
pub type NodeId = usize;

/// Arbitrary key/value tags read off an asset node.
pub type Tags = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// RGBA pixel buffer, the unit of texture exchange between the rasteriser
/// and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color: [f32; 4],
    /// Texture projected onto the surface by the content sync; sampled by
    /// the renderer through the mesh UVs.
    pub content_texture: Option<TextureImage>,
    /// Set by the sync when the texture changed; cleared by the renderer
    /// once the frame cache is rebuilt.
    pub needs_update: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [0.8, 0.8, 0.8, 1.0],
            content_texture: None,
            needs_update: false,
        }
    }
}

/// A node's material slots. Assets export either a sole material or a list;
/// the content sync always targets the first slot either way.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSlots {
    Single(Material),
    List(Vec<Material>),
}

impl MaterialSlots {
    pub fn first(&self) -> Option<&Material> {
        match self {
            MaterialSlots::Single(m) => Some(m),
            MaterialSlots::List(l) => l.first(),
        }
    }

    pub fn first_mut(&mut self) -> Option<&mut Material> {
        match self {
            MaterialSlots::Single(m) => Some(m),
            MaterialSlots::List(l) => l.first_mut(),
        }
    }
}

impl Default for MaterialSlots {
    fn default() -> Self {
        MaterialSlots::Single(Material::default())
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub tags: Tags,
    /// World transform (parent transforms already folded in).
    pub transform: Mat4,
    pub mesh: Option<MeshData>,
    pub materials: MaterialSlots,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Tags::new(),
            transform: Mat4::IDENTITY,
            mesh: None,
            materials: MaterialSlots::default(),
        }
    }
}

/// A loaded scene: flat node list, traversal order = asset order.
#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    pub nodes: Vec<SceneNode>,
}

impl SceneModel {
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn push(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }
}

/// Traversal capability the plane registry consumes: one callback per node,
/// with its handle, name and tags.
pub trait TagSource {
    fn visit_nodes(&self, visit: &mut dyn FnMut(NodeId, &str, &Tags));
}

impl TagSource for SceneModel {
    fn visit_nodes(&self, visit: &mut dyn FnMut(NodeId, &str, &Tags)) {
        for (id, node) in self.nodes.iter().enumerate() {
            visit(id, &node.name, &node.tags);
        }
    }
}

/// String view of a tag value (numbers and bools are formatted).
pub fn tag_string(tags: &Tags, key: &str) -> Option<String> {
    let value = tags.get(key)?;
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JS-style truthiness for flag tags: `true`, a non-zero number or a
/// non-empty string all count (Blender exports bools as 0/1 integers).
pub fn tag_truthy(tags: &Tags, key: &str) -> bool {
    match tags.get(key) {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

impl MeshData {
    /// Axis-aligned box centred on the origin. Flat normals, one UV quad
    /// per face; used for the theater card platforms and the stage floor.
    pub fn cuboid(size: [f32; 3]) -> Self {
        let [hx, hy, hz] = [size[0] * 0.5, size[1] * 0.5, size[2] * 0.5];
        // (normal, four corners CCW seen from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            (
                [0.0, 0.0, 1.0],
                [[-hx, -hy, hz], [hx, -hy, hz], [hx, hy, hz], [-hx, hy, hz]],
            ),
            (
                [0.0, 0.0, -1.0],
                [[hx, -hy, -hz], [-hx, -hy, -hz], [-hx, hy, -hz], [hx, hy, -hz]],
            ),
            (
                [1.0, 0.0, 0.0],
                [[hx, -hy, hz], [hx, -hy, -hz], [hx, hy, -hz], [hx, hy, hz]],
            ),
            (
                [-1.0, 0.0, 0.0],
                [[-hx, -hy, -hz], [-hx, -hy, hz], [-hx, hy, hz], [-hx, hy, -hz]],
            ),
            (
                [0.0, 1.0, 0.0],
                [[-hx, hy, hz], [hx, hy, hz], [hx, hy, -hz], [-hx, hy, -hz]],
            ),
            (
                [0.0, -1.0, 0.0],
                [[-hx, -hy, -hz], [hx, -hy, -hz], [hx, -hy, hz], [-hx, -hy, hz]],
            ),
        ];

        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        let mut mesh = MeshData::default();
        for (normal, corners) in faces {
            let base = mesh.vertices.len() as u32;
            for (corner, uv) in corners.iter().zip(uvs) {
                mesh.vertices.push(Vertex {
                    position: *corner,
                    normal,
                    uv,
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_flag_exports() {
        let mut tags = Tags::new();
        tags.insert("a".into(), json!(true));
        tags.insert("b".into(), json!(0));
        tags.insert("c".into(), json!(1));
        tags.insert("d".into(), json!(""));
        tags.insert("e".into(), json!("yes"));

        assert!(tag_truthy(&tags, "a"));
        assert!(!tag_truthy(&tags, "b"));
        assert!(tag_truthy(&tags, "c"));
        assert!(!tag_truthy(&tags, "d"));
        assert!(tag_truthy(&tags, "e"));
        assert!(!tag_truthy(&tags, "missing"));
    }

    #[test]
    fn first_slot_resolves_single_and_list() {
        let mut single = MaterialSlots::Single(Material::default());
        assert!(single.first_mut().is_some());

        let mut list = MaterialSlots::List(vec![Material::default(), Material::default()]);
        list.first_mut().unwrap().needs_update = true;
        match list {
            MaterialSlots::List(ref l) => {
                assert!(l[0].needs_update);
                assert!(!l[1].needs_update);
            }
            _ => unreachable!(),
        }

        assert!(MaterialSlots::List(Vec::new()).first().is_none());
    }

    #[test]
    fn cuboid_has_closed_index_buffer() {
        let mesh = MeshData::cuboid([2.0, 1.0, 2.0]);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }
}
