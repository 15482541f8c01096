//! Rendering — a CPU rasteriser that turns the loaded scene into RGBA
//! buffers the app uploads as egui textures.

pub mod mesh_renderer;

pub use mesh_renderer::{
    auto_camera, instances_of, render_instances, render_model, Camera, CameraParams, Instance,
};
