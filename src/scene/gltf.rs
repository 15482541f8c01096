//! GLB model loading.
//!
//! Flattens the asset's node hierarchy into a [`SceneModel`]: world
//! transforms are folded while walking, mesh primitives are read straight
//! off the embedded GLB buffer, and node extras (Blender custom
//! properties) are parsed into the tag map the plane registry keys on.
//! Only GLB with an embedded binary chunk is supported — the prototype
//! models ship that way.

use std::fmt;
use std::path::Path;

use glam::Mat4;

use super::{Material, MaterialSlots, MeshData, SceneModel, SceneNode, Tags, Vertex};

/// Error while loading the model asset.
#[derive(Debug)]
pub struct AssetError {
    pub message: String,
    pub phase: &'static str,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

/// Load a GLB model from disk.
pub fn load_model(path: &Path) -> Result<SceneModel, AssetError> {
    let bytes = std::fs::read(path).map_err(|e| AssetError {
        message: format!("{}: {}", path.display(), e),
        phase: "read",
    })?;
    load_model_bytes(&bytes)
}

/// Load a GLB model from bytes already in memory.
pub fn load_model_bytes(bytes: &[u8]) -> Result<SceneModel, AssetError> {
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| AssetError {
        message: e.to_string(),
        phase: "parse",
    })?;
    let blob = gltf.blob.as_deref();

    let mut model = SceneModel::default();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            walk(&node, Mat4::IDENTITY, blob, &mut model);
        }
    }

    log::info!(
        "model loaded: {} nodes, {} with meshes",
        model.nodes.len(),
        model.mesh_count()
    );
    Ok(model)
}

fn walk(node: &gltf::Node<'_>, parent: Mat4, blob: Option<&[u8]>, out: &mut SceneModel) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    let mut scene_node = SceneNode::new(node.name().unwrap_or_default());
    scene_node.transform = world;
    scene_node.tags = parse_extras(node.extras());

    if let Some(mesh) = node.mesh() {
        let mut data = MeshData::default();
        let mut materials = Vec::new();
        for primitive in mesh.primitives() {
            if let Some((vertices, indices)) = read_primitive(&primitive, blob) {
                let base = data.vertices.len() as u32;
                data.vertices.extend(vertices);
                data.indices.extend(indices.into_iter().map(|i| i + base));
                materials.push(material_of(&primitive));
            }
        }
        if !data.vertices.is_empty() {
            scene_node.mesh = Some(data);
            scene_node.materials = if materials.len() == 1 {
                MaterialSlots::Single(materials.pop().unwrap())
            } else {
                MaterialSlots::List(materials)
            };
        }
    }

    out.push(scene_node);
    for child in node.children() {
        walk(&child, world, blob, out);
    }
}

fn parse_extras(extras: &gltf::json::Extras) -> Tags {
    extras
        .as_ref()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw.get()).ok())
        .and_then(|value| match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

fn material_of(primitive: &gltf::Primitive<'_>) -> Material {
    let pbr = primitive.material().pbr_metallic_roughness();
    Material {
        base_color: pbr.base_color_factor(),
        content_texture: None,
        needs_update: false,
    }
}

/// Extract one primitive's geometry from the GLB blob. Accessors are read
/// raw (tightly packed f32 vectors, the common exporter layout); anything
/// else is skipped.
fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    blob: Option<&[u8]>,
) -> Option<(Vec<Vertex>, Vec<u32>)> {
    let buf = blob?;

    // POSITION (required)
    let positions = primitive.get(&gltf::Semantic::Positions)?;
    let pos_view = positions.view()?;
    let pos_start = pos_view.offset() + positions.offset();
    let count = positions.count();
    if positions.size() != 12 || count == 0 {
        return None;
    }

    let normals = read_vec3s(primitive, &gltf::Semantic::Normals, buf)
        .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; count]);
    let uvs = read_vec2s(primitive, &gltf::Semantic::TexCoords(0), buf)
        .unwrap_or_else(|| vec![[0.0, 0.0]; count]);

    let mut vertices = Vec::with_capacity(count);
    for i in 0..count {
        let off = pos_start + i * 12;
        if off + 12 > buf.len() {
            break;
        }
        vertices.push(Vertex {
            position: read_f32x3(buf, off),
            normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        });
    }
    if vertices.is_empty() {
        return None;
    }

    let indices = if let Some(acc) = primitive.indices() {
        let view = acc.view()?;
        let start = view.offset() + acc.offset();
        let n = acc.count();
        match acc.data_type() {
            gltf::accessor::DataType::U8 => (0..n)
                .filter_map(|i| buf.get(start + i).map(|&b| b as u32))
                .collect(),
            gltf::accessor::DataType::U16 => (0..n)
                .filter_map(|i| {
                    let o = start + i * 2;
                    buf.get(o..o + 2)
                        .map(|b| u16::from_le_bytes([b[0], b[1]]) as u32)
                })
                .collect(),
            gltf::accessor::DataType::U32 => (0..n)
                .filter_map(|i| {
                    let o = start + i * 4;
                    buf.get(o..o + 4)
                        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                })
                .collect(),
            _ => (0..vertices.len() as u32).collect(),
        }
    } else {
        (0..vertices.len() as u32).collect()
    };

    Some((vertices, indices))
}

fn read_vec3s(
    primitive: &gltf::Primitive<'_>,
    semantic: &gltf::Semantic,
    buf: &[u8],
) -> Option<Vec<[f32; 3]>> {
    let acc = primitive.get(semantic)?;
    let view = acc.view()?;
    if acc.size() != 12 {
        return None;
    }
    let start = view.offset() + acc.offset();
    let mut out = Vec::with_capacity(acc.count());
    for i in 0..acc.count() {
        let off = start + i * 12;
        if off + 12 > buf.len() {
            return None;
        }
        out.push(read_f32x3(buf, off));
    }
    Some(out)
}

fn read_vec2s(
    primitive: &gltf::Primitive<'_>,
    semantic: &gltf::Semantic,
    buf: &[u8],
) -> Option<Vec<[f32; 2]>> {
    let acc = primitive.get(semantic)?;
    let view = acc.view()?;
    if acc.size() != 8 {
        return None;
    }
    let start = view.offset() + acc.offset();
    let mut out = Vec::with_capacity(acc.count());
    for i in 0..acc.count() {
        let off = start + i * 8;
        if off + 8 > buf.len() {
            return None;
        }
        out.push([read_f32(buf, off), read_f32(buf, off + 4)]);
    }
    Some(out)
}

fn read_f32(buf: &[u8], off: usize) -> f32 {
    f32::from_le_bytes(buf[off..off + 4].try_into().unwrap())
}

fn read_f32x3(buf: &[u8], off: usize) -> [f32; 3] {
    [
        read_f32(buf, off),
        read_f32(buf, off + 4),
        read_f32(buf, off + 8),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_in_parse_phase() {
        let err = load_model_bytes(b"not a glb").unwrap_err();
        assert_eq!(err.phase, "parse");
        assert!(err.to_string().starts_with("[parse]"));
    }

    #[test]
    fn missing_file_fails_in_read_phase() {
        let err = load_model(Path::new("assets/models/nope.glb")).unwrap_err();
        assert_eq!(err.phase, "read");
    }
}
