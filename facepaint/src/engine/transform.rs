use crate::math_prelude::*;

//Rigid pose, position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    //Orientation that rotates +Z onto `direction`.
    pub fn look_along(direction: Vec3) -> Quat {
        Quat::from_rotation_arc(Vec3::Z, direction.normalize())
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    pub fn inverse_transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation.inverse() * direction
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[test]
fn look_along_rotates_z() {
    let rotation = Transform::look_along(Vec3::X);
    let rotated = rotation * Vec3::Z;
    assert!((rotated - Vec3::X).length() < 1e-5);
}

#[test]
fn point_round_trip() {
    let transform = Transform {
        position: Vec3::new(4.0, -2.0, 7.0),
        rotation: Transform::look_along(Vec3::new(1.0, 1.0, 0.3).normalize()),
    };
    let point = Vec3::new(0.5, -3.0, 2.0);
    let there = transform.transform_point(point);
    let back = transform.inverse_transform_point(there);
    assert!((back - point).length() < 1e-4);
}
