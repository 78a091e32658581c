mod bounding_box;
mod camera;
mod canvas;
mod framebuffer;
mod frametime;
mod geometry;
mod obj;
mod raycast;
mod renderer;
mod shader;
mod texture;
mod transform;

pub use bounding_box::BoundingBox;
pub use camera::Camera;
pub use canvas::{Canvas, Path};
pub use framebuffer::Framebuffer;
pub use frametime::FrameTime;
pub use geometry::Geometry;
pub use obj::{load_obj, parse_obj, ObjError};
pub use raycast::{
    interpolate_uv, intersect_geometry, intersect_geometry_at, intersect_triangle, Ray, RayHit,
};
pub use renderer::{PassOptions, Renderer};
pub use shader::{FragmentShader, Interpolate, ShaderData, VertexShader};
pub use texture::Texture;
pub use transform::Transform;
