//! CPU mesh renderer.
//!
//! Renders the flattened scene with an orbit camera into an RGBA pixel
//! buffer: rayon-parallel vertex transform and shading, then a z-buffered
//! sequential fill. Triangles are drawn double-sided (the content planes
//! are visible from both faces) and a plane's content texture is sampled
//! through its UVs, alpha-blended over the material base colour.

use glam::{Mat3, Mat4, Vec3};
use rayon::prelude::*;

use crate::scene::{MeshData, SceneModel, TextureImage};

// ── Camera parameters ──

/// Camera parameters for interactive orbit navigation.
#[derive(Debug, Clone, Copy)]
pub struct CameraParams {
    /// Horizontal orbit angle in radians (0 = front)
    pub azimuth: f32,
    /// Vertical orbit angle in radians (0 = level, positive = looking down)
    pub elevation: f32,
    /// Distance from the camera to the target point
    pub distance: f32,
    /// Target point the camera looks at [x, y, z]
    pub target: [f32; 3],
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            azimuth: 0.3,
            elevation: 0.6,
            distance: 8.0,
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraParams {
    pub fn eye(&self) -> Vec3 {
        Vec3::from(self.target)
            + Vec3::new(
                self.distance * self.azimuth.sin() * self.elevation.cos(),
                self.distance * self.elevation.sin(),
                self.distance * self.azimuth.cos() * self.elevation.cos(),
            )
    }
}

// ── Camera ──

pub struct Camera {
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    fov_factor: f32,
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3, fov_deg: f32) -> Self {
        let forward = (target - eye).normalize_or(Vec3::NEG_Z);
        let world_up = Vec3::Y;
        let right = forward.cross(world_up).normalize_or(Vec3::X);
        let up = right.cross(forward);
        Self {
            origin: eye,
            forward,
            right,
            up,
            fov_factor: (fov_deg.to_radians() * 0.5).tan(),
        }
    }

    pub fn from_params(cam: &CameraParams) -> Self {
        Self::look_at(cam.eye(), Vec3::from(cam.target), 50.0)
    }

    /// View-space coordinates: (right, up, depth along forward).
    fn view(&self, world: Vec3) -> Vec3 {
        let rel = world - self.origin;
        Vec3::new(rel.dot(self.right), rel.dot(self.up), rel.dot(self.forward))
    }

    /// Project a world point to pixel coordinates. `None` behind the camera.
    pub fn project(&self, world: Vec3, width: f32, height: f32) -> Option<[f32; 2]> {
        let v = self.view(world);
        if v.z < 0.05 {
            return None;
        }
        let aspect = width / height;
        let ndc_x = v.x / (v.z * self.fov_factor * aspect);
        let ndc_y = v.y / (v.z * self.fov_factor);
        Some([
            (ndc_x * 0.5 + 0.5) * width,
            (1.0 - (ndc_y * 0.5 + 0.5)) * height,
        ])
    }
}

// ── Scene assembly ──

/// One mesh to draw: geometry, a world transform, and the resolved first
/// material slot.
pub struct Instance<'a> {
    pub mesh: &'a MeshData,
    pub transform: Mat4,
    pub base_color: [f32; 4],
    pub texture: Option<&'a TextureImage>,
}

/// Collect the drawable nodes of a model, with `world` folded on top of
/// every node transform (the play-mode spin rides in here).
pub fn instances_of(model: &SceneModel, world: Mat4) -> Vec<Instance<'_>> {
    model
        .nodes
        .iter()
        .filter_map(|node| {
            let mesh = node.mesh.as_ref()?;
            let material = node.materials.first();
            Some(Instance {
                mesh,
                transform: world * node.transform,
                base_color: material.map(|m| m.base_color).unwrap_or([0.8, 0.8, 0.8, 1.0]),
                texture: material.and_then(|m| m.content_texture.as_ref()),
            })
        })
        .collect()
}

fn instance_bounds(instances: &[Instance<'_>]) -> (Vec3, Vec3) {
    let mut mn = Vec3::splat(f32::MAX);
    let mut mx = Vec3::splat(f32::MIN);
    for inst in instances {
        for v in &inst.mesh.vertices {
            let p = inst.transform.transform_point3(Vec3::from(v.position));
            mn = mn.min(p);
            mx = mx.max(p);
        }
    }
    if mn.x > mx.x {
        mn = Vec3::splat(-1.0);
        mx = Vec3::splat(1.0);
    }
    (mn, mx)
}

/// Compute initial camera params that auto-frame the model.
pub fn auto_camera(model: &SceneModel) -> CameraParams {
    let instances = instances_of(model, Mat4::IDENTITY);
    let (mn, mx) = instance_bounds(&instances);
    let center = (mn + mx) * 0.5;
    let extent = mx - mn;
    let max_ext = extent.x.max(extent.y.max(extent.z)).max(0.5);

    CameraParams {
        azimuth: 0.3,
        elevation: 0.5,
        distance: max_ext * 1.8,
        target: [center.x, center.y, center.z],
    }
}

// ── Core rendering ──

struct ScreenTri {
    // Pixel x/y plus view depth per corner
    pts: [Vec3; 3],
    uvs: [[f32; 2]; 3],
    color: [f32; 3],
    instance: usize,
}

const LIGHT_DIR: Vec3 = Vec3::new(0.5, 0.8, 0.3);
const NEAR: f32 = 0.05;

/// Render a whole model with an optional spin around Y (play mode).
pub fn render_model(
    model: &SceneModel,
    width: usize,
    height: usize,
    cam: &CameraParams,
    spin: f32,
) -> Option<Vec<u8>> {
    let instances = instances_of(model, Mat4::from_rotation_y(spin));
    render_instances(&instances, width, height, cam)
}

/// Render a set of instances to an RGBA pixel buffer. `None` when there is
/// nothing to draw.
pub fn render_instances(
    instances: &[Instance<'_>],
    width: usize,
    height: usize,
    cam: &CameraParams,
) -> Option<Vec<u8>> {
    if instances.iter().all(|i| i.mesh.indices.len() < 3) {
        return None;
    }

    let camera = Camera::from_params(cam);
    let light = LIGHT_DIR.normalize();
    let aspect = width as f32 / height as f32;

    // Transform, light and project every triangle in parallel.
    let tris: Vec<ScreenTri> = instances
        .par_iter()
        .enumerate()
        .flat_map_iter(|(inst_idx, inst)| {
            let normal_mat = Mat3::from_mat4(inst.transform);
            let mesh = inst.mesh;
            mesh.indices
                .chunks_exact(3)
                .filter_map(|idx| {
                    let mut pts = [Vec3::ZERO; 3];
                    let mut uvs = [[0.0f32; 2]; 3];
                    for k in 0..3 {
                        let v = mesh.vertices.get(idx[k] as usize)?;
                        let world = inst.transform.transform_point3(Vec3::from(v.position));
                        let view = camera.view(world);
                        if view.z < NEAR {
                            return None;
                        }
                        let ndc_x = view.x / (view.z * camera.fov_factor * aspect);
                        let ndc_y = view.y / (view.z * camera.fov_factor);
                        pts[k] = Vec3::new(
                            (ndc_x * 0.5 + 0.5) * width as f32,
                            (1.0 - (ndc_y * 0.5 + 0.5)) * height as f32,
                            view.z,
                        );
                        uvs[k] = v.uv;
                    }

                    // Flat shading off the face normal; abs() keeps back
                    // faces lit since planes render double-sided.
                    let face_normal = (normal_mat
                        * Vec3::from(mesh.vertices[idx[0] as usize].normal))
                    .normalize_or(Vec3::Y);
                    let diffuse = face_normal.dot(light).abs();
                    let shade = 0.25 + diffuse * 0.75;
                    let color = [
                        inst.base_color[0] * shade,
                        inst.base_color[1] * shade,
                        inst.base_color[2] * shade,
                    ];

                    Some(ScreenTri {
                        pts,
                        uvs,
                        color,
                        instance: inst_idx,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();

    if tris.is_empty() {
        // Everything clipped away; still hand back the background so the
        // viewport does not flash.
        return Some(background(width, height));
    }

    let mut color = background(width, height);
    let mut depth = vec![f32::INFINITY; width * height];

    for tri in &tris {
        let texture = instances[tri.instance].texture;
        fill_triangle(tri, texture, &mut color, &mut depth, width, height);
    }

    Some(color)
}

/// Dark vertical gradient, the stage backdrop.
fn background(width: usize, height: usize) -> Vec<u8> {
    let mut rgba = vec![0u8; width * height * 4];
    for y in 0..height {
        let t = y as f32 / height.max(1) as f32;
        let r = (17.0 * (1.0 - t)) as u8;
        let g = (24.0 * (1.0 - t)) as u8;
        let b = (39.0 * (1.0 - t)) as u8;
        for x in 0..width {
            let i = (y * width + x) * 4;
            rgba[i] = r;
            rgba[i + 1] = g;
            rgba[i + 2] = b;
            rgba[i + 3] = 255;
        }
    }
    rgba
}

fn fill_triangle(
    tri: &ScreenTri,
    texture: Option<&TextureImage>,
    color: &mut [u8],
    depth: &mut [f32],
    width: usize,
    height: usize,
) {
    let [a, b, c] = tri.pts;
    let cross =
        |ux: f32, uy: f32, vx: f32, vy: f32| ux * vy - uy * vx;
    let area = cross(b.x - a.x, b.y - a.y, c.x - a.x, c.y - a.y);
    if area.abs() < 1e-6 {
        return;
    }

    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
    let max_x = (a.x.max(b.x).max(c.x).ceil() as usize).min(width.saturating_sub(1));
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
    let max_y = (a.y.max(b.y).max(c.y).ceil() as usize).min(height.saturating_sub(1));
    if min_x > max_x || min_y > max_y {
        return;
    }

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let (px_f, py_f) = (px as f32 + 0.5, py as f32 + 0.5);
            // Barycentric weights; dividing by the signed area keeps the
            // inside test winding-independent.
            let la = cross(c.x - b.x, c.y - b.y, px_f - b.x, py_f - b.y) / area;
            let lb = cross(a.x - c.x, a.y - c.y, px_f - c.x, py_f - c.y) / area;
            let lc = 1.0 - la - lb;
            if la < 0.0 || lb < 0.0 || lc < 0.0 {
                continue;
            }

            let z = la * a.z + lb * b.z + lc * c.z;
            let idx = py * width + px;
            if z >= depth[idx] {
                continue;
            }
            depth[idx] = z;

            let mut rgb = tri.color;
            if let Some(tex) = texture {
                let u = la * tri.uvs[0][0] + lb * tri.uvs[1][0] + lc * tri.uvs[2][0];
                let v = la * tri.uvs[0][1] + lb * tri.uvs[1][1] + lc * tri.uvs[2][1];
                if let Some([tr, tg, tb, ta]) = sample(tex, u, v) {
                    let alpha = ta as f32 / 255.0;
                    rgb = [
                        rgb[0] * (1.0 - alpha) + (tr as f32 / 255.0) * alpha,
                        rgb[1] * (1.0 - alpha) + (tg as f32 / 255.0) * alpha,
                        rgb[2] * (1.0 - alpha) + (tb as f32 / 255.0) * alpha,
                    ];
                }
            }

            let out = idx * 4;
            color[out] = (rgb[0].clamp(0.0, 1.0) * 255.0) as u8;
            color[out + 1] = (rgb[1].clamp(0.0, 1.0) * 255.0) as u8;
            color[out + 2] = (rgb[2].clamp(0.0, 1.0) * 255.0) as u8;
            color[out + 3] = 255;
        }
    }
}

/// Nearest-neighbour texture sample, clamped addressing.
fn sample(tex: &TextureImage, u: f32, v: f32) -> Option<[u8; 4]> {
    if tex.width == 0 || tex.height == 0 {
        return None;
    }
    let x = ((u.clamp(0.0, 1.0)) * (tex.width - 1) as f32) as usize;
    let y = ((v.clamp(0.0, 1.0)) * (tex.height - 1) as f32) as usize;
    let i = (y * tex.width + x) * 4;
    let px = tex.rgba.get(i..i + 4)?;
    Some([px[0], px[1], px[2], px[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, MaterialSlots, SceneNode};

    fn cube_model() -> SceneModel {
        let mut model = SceneModel::default();
        let mut node = SceneNode::new("cube");
        node.mesh = Some(MeshData::cuboid([1.0, 1.0, 1.0]));
        node.materials = MaterialSlots::Single(Material {
            base_color: [0.9, 0.2, 0.2, 1.0],
            ..Default::default()
        });
        model.push(node);
        model
    }

    #[test]
    fn renders_a_cube() {
        let model = cube_model();
        let cam = auto_camera(&model);
        let pixels = render_model(&model, 64, 48, &cam, 0.0).unwrap();
        assert_eq!(pixels.len(), 64 * 48 * 4);
        // Red faces must land somewhere in the frame.
        let has_red = pixels.chunks(4).any(|px| px[0] > 80 && px[1] < 80);
        assert!(has_red, "cube should be visible");
    }

    #[test]
    fn empty_scene_returns_none() {
        let model = SceneModel::default();
        let cam = CameraParams::default();
        assert!(render_model(&model, 64, 48, &cam, 0.0).is_none());
    }

    #[test]
    fn auto_camera_frames_the_scene() {
        let mut model = cube_model();
        model.nodes[0].transform = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let cam = auto_camera(&model);
        assert!(cam.distance > 0.5);
        assert!((cam.target[0] - 2.0).abs() < 0.5, "target near scene center");
    }

    #[test]
    fn project_puts_target_mid_screen() {
        let cam = CameraParams::default();
        let camera = Camera::from_params(&cam);
        let [sx, sy] = camera.project(Vec3::ZERO, 640.0, 480.0).unwrap();
        assert!((sx - 320.0).abs() < 1.0);
        assert!((sy - 240.0).abs() < 1.0);
    }

    #[test]
    fn project_rejects_points_behind_camera() {
        let cam = CameraParams::default();
        let camera = Camera::from_params(&cam);
        let behind = cam.eye() * 2.0;
        assert!(camera.project(behind, 640.0, 480.0).is_none());
    }

    #[test]
    fn spin_moves_the_silhouette() {
        let mut model = cube_model();
        // Push the cube off-centre so a yaw spin changes what the fixed
        // camera sees.
        model.nodes[0].transform = Mat4::from_translation(Vec3::new(1.5, 0.0, 0.0));
        let cam = CameraParams {
            distance: 6.0,
            ..Default::default()
        };
        let a = render_model(&model, 48, 36, &cam, 0.0).unwrap();
        let b = render_model(&model, 48, 36, &cam, std::f32::consts::FRAC_PI_2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn texture_sample_clamps_addressing() {
        let tex = TextureImage {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 255, 0, 255],
        };
        assert_eq!(sample(&tex, -1.0, 0.0).unwrap(), [255, 0, 0, 255]);
        assert_eq!(sample(&tex, 2.0, 0.0).unwrap(), [0, 255, 0, 255]);
    }
}
