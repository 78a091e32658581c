pub mod engine;
pub mod shaders;

mod deform;
mod error;
mod picker;
mod scene;
mod simplify;
mod stroke;
mod surface;
mod tracking;

pub use deform::FaceMesh;
pub use error::SetupError;
pub use picker::{is_over_face, pick, MeshHit, PickHit, PickTarget, SurfaceHit};
pub use scene::{BrushParams, Config, Scene};
pub use simplify::simplify;
pub use stroke::append_point;
pub use surface::{PaintSurface, SurfaceStack, PLANE_OFFSET};
pub use tracking::{FaceTracker, ScriptedTracker, TrackerHandle};

pub use engine::{FragmentShader, Interpolate, ShaderData, VertexShader};
pub use facepaint_macros::Interpolate;

pub mod math_prelude {
    pub use glam::{
        Mat2, Mat3, Mat4, Quat, Vec2, Vec2Swizzles, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles,
    };
}
