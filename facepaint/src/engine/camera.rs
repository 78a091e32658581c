use crate::math_prelude::*;

use super::raycast::Ray;

//Perspective camera looking down -Z. The frustum is sized from the render
//target so a head-height object one frame-height away roughly fills the view.
pub struct Camera {
    pub position: Vec3,
    width: f32,
    height: f32,
    fov: f32,
    near: f32,
    far: f32,
}

impl Camera {
    //50 degrees
    pub const DEFAULT_FOV: f32 = 0.872_664_6;
    const NEAR: f32 = 1.0;
    const FAR: f32 = 5000.0;

    pub fn new(width: f32, height: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            width,
            height,
            fov: Self::DEFAULT_FOV,
            near: Self::NEAR,
            far: Self::FAR,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn generate_matrix(&self) -> Mat4 {
        self.generate_projection_matrix() * self.generate_view_matrix()
    }

    pub fn generate_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.width / self.height, self.near, self.far)
    }

    pub fn generate_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y)
    }

    //Ray through a point given in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.generate_matrix().inverse();
        let near = inverse.project_point3(ndc.extend(-1.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize(),
        }
    }
}

#[test]
fn center_ray_points_forward() {
    let mut camera = Camera::new(640.0, 480.0);
    camera.position = Vec3::new(0.0, -240.0, 480.0);
    let ray = camera.ray_from_ndc(Vec2::ZERO);
    assert!((ray.direction + Vec3::Z).length() < 1e-4);
    assert!((ray.origin.x).abs() < 1e-3);
    assert!((ray.origin.y + 240.0).abs() < 1e-3);
}

#[test]
fn off_center_ray_leans_right_and_up() {
    let camera = Camera::new(640.0, 480.0);
    let ray = camera.ray_from_ndc(Vec2::new(0.5, 0.5));
    assert!(ray.direction.x > 0.0);
    assert!(ray.direction.y > 0.0);
    assert!(ray.direction.z < 0.0);
}
