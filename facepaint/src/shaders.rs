use crate::engine::{Canvas, FragmentShader, VertexShader};
use crate::math_prelude::*;
use crate::Interpolate;

#[derive(Debug, Default)]
pub struct ProjViewModel {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
}

pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

#[derive(Interpolate)]
pub struct NormalShaderData {
    normal: Vec3,
}

pub struct MeshVertexShader;

impl VertexShader for MeshVertexShader {
    type VertexData = MeshVertex;
    type Uniform = ProjViewModel;
    type SharedData = NormalShaderData;

    fn vertex(&self, vertex: &Self::VertexData, uniform: &Self::Uniform) -> (Vec4, Self::SharedData) {
        let world_position = uniform.model * vertex.position.extend(1.0);
        let glpos = uniform.projection * uniform.view * world_position;
        (
            glpos,
            NormalShaderData {
                normal: vertex.normal,
            },
        )
    }
}

//Maps the surface normal to RGB, the usual way to make topology visible.
pub struct NormalFragmentShader;

impl FragmentShader for NormalFragmentShader {
    type Uniform = ProjViewModel;
    type SharedData = NormalShaderData;

    fn fragment(&self, shared: &Self::SharedData, _uniform: &Self::Uniform) -> Vec4 {
        let normal = shared.normal.normalize_or_zero();
        (normal * 0.5 + Vec3::splat(0.5)).extend(1.0)
    }
}

pub struct SurfaceVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

#[derive(Interpolate)]
pub struct SurfaceShaderData {
    uv: Vec2,
}

pub struct SurfaceVertexShader;

impl VertexShader for SurfaceVertexShader {
    type VertexData = SurfaceVertex;
    type Uniform = ProjViewModel;
    type SharedData = SurfaceShaderData;

    fn vertex(&self, vertex: &Self::VertexData, uniform: &Self::Uniform) -> (Vec4, Self::SharedData) {
        let world_position = uniform.model * vertex.position.extend(1.0);
        let glpos = uniform.projection * uniform.view * world_position;
        (glpos, SurfaceShaderData { uv: vertex.uv })
    }
}

//Samples a paint canvas. Unpainted texels stay fully transparent, so only
//the stroke itself lands in the blend.
pub struct CanvasFragmentShader<'a> {
    canvas: &'a Canvas,
}

impl<'a> CanvasFragmentShader<'a> {
    pub fn new(canvas: &'a Canvas) -> Self {
        Self { canvas }
    }
}

impl FragmentShader for CanvasFragmentShader<'_> {
    type Uniform = ProjViewModel;
    type SharedData = SurfaceShaderData;

    fn fragment(&self, shared: &Self::SharedData, _uniform: &Self::Uniform) -> Vec4 {
        self.canvas.sample(shared.uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_interpolate_mixes_fields() {
        let a = SurfaceShaderData {
            uv: Vec2::new(0.0, 0.0),
        };
        let b = SurfaceShaderData {
            uv: Vec2::new(1.0, 0.0),
        };
        let c = SurfaceShaderData {
            uv: Vec2::new(0.0, 1.0),
        };
        let mixed = SurfaceShaderData::interpolate(&a, &b, &c, 0.25, 0.25, 0.5);
        assert!((mixed.uv - Vec2::new(0.25, 0.5)).length() < 1e-6);
    }

    #[test]
    fn normal_shader_maps_z_to_blue() {
        let shader = NormalFragmentShader;
        let color = shader.fragment(
            &NormalShaderData { normal: Vec3::Z },
            &ProjViewModel::default(),
        );
        assert!((color - Vec4::new(0.5, 0.5, 1.0, 1.0)).length() < 1e-6);
    }
}
