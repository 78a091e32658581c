use crate::math_prelude::*;

use super::geometry::Geometry;
use super::transform::Transform;

const EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub distance: f32,
    pub position: Vec3,
    pub triangle: usize,
    //Barycentric weights of the triangle's second and third vertices
    pub u: f32,
    pub v: f32,
}

//Moller-Trumbore, double sided. Returns (t, u, v) for hits in front of the
//ray origin.
pub fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<(f32, f32, f32)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = ray.origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(qvec) * inv_det;
    if t <= EPSILON {
        return None;
    }
    Some((t, u, v))
}

//Nearest intersection over every triangle of `geometry`.
pub fn intersect_geometry(ray: &Ray, geometry: &Geometry) -> Option<RayHit> {
    let positions = geometry.positions();
    let mut nearest: Option<RayHit> = None;
    for (index, [a, b, c]) in geometry.triangles().iter().copied().enumerate() {
        if let Some((t, u, v)) =
            intersect_triangle(ray, positions[a], positions[b], positions[c])
        {
            if nearest.map_or(true, |hit| t < hit.distance) {
                nearest = Some(RayHit {
                    distance: t,
                    position: ray.at(t),
                    triangle: index,
                    u,
                    v,
                });
            }
        }
    }
    nearest
}

//Same, against geometry posed by `transform`. The reported position is back
//in the ray's space.
pub fn intersect_geometry_at(
    ray: &Ray,
    geometry: &Geometry,
    transform: &Transform,
) -> Option<RayHit> {
    let local = Ray {
        origin: transform.inverse_transform_point(ray.origin),
        direction: transform.inverse_transform_direction(ray.direction),
    };
    intersect_geometry(&local, geometry).map(|hit| RayHit {
        position: ray.at(hit.distance),
        ..hit
    })
}

//Interpolates the geometry's UV attribute at a hit's barycentric weights.
pub fn interpolate_uv(hit: &RayHit, geometry: &Geometry) -> Option<Vec2> {
    let uvs = geometry.uvs()?;
    let [a, b, c] = geometry.triangle(hit.triangle);
    Some(uvs[a] * (1.0 - hit.u - hit.v) + uvs[b] * hit.u + uvs[c] * hit.v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z_ray(x: f32, y: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 10.0),
            direction: -Vec3::Z,
        }
    }

    #[test]
    fn hits_triangle_front_and_back() {
        let (v0, v1, v2) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        let front = z_ray(0.2, 0.2);
        let (t, u, v) = intersect_triangle(&front, v0, v1, v2).unwrap();
        assert!((t - 10.0).abs() < 1e-4);
        assert!((u - 0.2).abs() < 1e-5);
        assert!((v - 0.2).abs() < 1e-5);

        let back = Ray {
            origin: Vec3::new(0.2, 0.2, -10.0),
            direction: Vec3::Z,
        };
        assert!(intersect_triangle(&back, v0, v1, v2).is_some());
    }

    #[test]
    fn misses_outside_triangle() {
        let (v0, v1, v2) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!(intersect_triangle(&z_ray(0.9, 0.9), v0, v1, v2).is_none());
        assert!(intersect_triangle(&z_ray(-0.1, 0.5), v0, v1, v2).is_none());
    }

    #[test]
    fn reports_nearest_triangle() {
        let geometry = Geometry::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-1.0, -1.0, 5.0),
                Vec3::new(1.0, -1.0, 5.0),
                Vec3::new(0.0, 1.0, 5.0),
            ],
            None,
            vec![[0, 1, 2], [3, 4, 5]],
        );
        let hit = intersect_geometry(&z_ray(0.0, 0.0), &geometry).unwrap();
        assert_eq!(hit.triangle, 1);
        assert!((hit.distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn transformed_hit_in_world_space() {
        let geometry = Geometry::plane(2.0);
        let transform = Transform {
            position: Vec3::new(5.0, 0.0, 0.0),
            rotation: Quat::IDENTITY,
        };
        let hit = intersect_geometry_at(&z_ray(5.2, 0.3), &geometry, &transform).unwrap();
        assert!((hit.position - Vec3::new(5.2, 0.3, 0.0)).length() < 1e-4);
        let uv = interpolate_uv(&hit, &geometry).unwrap();
        assert!((uv - Vec2::new(0.6, 0.65)).length() < 1e-4);
    }
}
