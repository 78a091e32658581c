use crate::math_prelude::*;

//Barycentric interpolation of per-vertex values across a triangle.
pub trait Interpolate {
    fn interpolate(v0: &Self, v1: &Self, v2: &Self, r0: f32, r1: f32, r2: f32) -> Self;
}

pub trait ShaderData: Interpolate + Send + Sync {}
impl<T: Interpolate + Send + Sync> ShaderData for T {}

pub trait VertexShader: Send + Sync {
    type VertexData: Send + Sync;
    type Uniform: Send + Sync;
    type SharedData: ShaderData;

    //Returns the clip-space position and the data interpolated across the face.
    fn vertex(&self, vertex: &Self::VertexData, uniform: &Self::Uniform) -> (Vec4, Self::SharedData);
}

pub trait FragmentShader: Send + Sync {
    type Uniform: Send + Sync;
    type SharedData: ShaderData;

    //Returns straight-alpha RGBA. Alpha only matters in blended passes.
    fn fragment(&self, shared: &Self::SharedData, uniform: &Self::Uniform) -> Vec4;
}

macro_rules! impl_interpolate {
    ($t:ty) => {
        impl Interpolate for $t {
            fn interpolate(v0: &Self, v1: &Self, v2: &Self, r0: f32, r1: f32, r2: f32) -> Self {
                *v0 * r0 + *v1 * r1 + *v2 * r2
            }
        }
    };
}

impl_interpolate!(f32);
impl_interpolate!(Vec2);
impl_interpolate!(Vec3);
impl_interpolate!(Vec4);
