use log::info;

use crate::engine::Geometry;
use crate::error::SetupError;
use crate::math_prelude::*;

//The live face mesh. Topology never changes; vertex i is overwritten from
//landmark i on every frame that produced a detection.
pub struct FaceMesh {
    geometry: Geometry,
    landmark_count: usize,
    half_width: f32,
    debug_visible: bool,
}

impl FaceMesh {
    //Landmarks arrive in image space: x right, y down, z into the screen,
    //with x in video pixels. `width` is the video width used to center the
    //mesh on the camera axis.
    pub fn new(geometry: Geometry, landmark_count: usize, width: f32) -> Result<Self, SetupError> {
        if geometry.triangle_count() == 0 {
            return Err(SetupError::EmptyMesh);
        }
        if geometry.vertex_count() != landmark_count {
            return Err(SetupError::LandmarkCountMismatch {
                landmarks: landmark_count,
                vertices: geometry.vertex_count(),
            });
        }
        info!(
            "face mesh ready: {} vertices, {} triangles",
            geometry.vertex_count(),
            geometry.triangle_count()
        );
        Ok(Self {
            geometry,
            landmark_count,
            half_width: width / 2.0,
            debug_visible: false,
        })
    }

    //Overwrites every vertex position from the tracked landmarks and derives
    //fresh normals. Frames without a detection skip this call entirely, so
    //the mesh holds its last pose.
    pub fn apply_landmarks(&mut self, landmarks: &[Vec3]) {
        assert_eq!(
            landmarks.len(),
            self.landmark_count,
            "landmark count changed after setup"
        );
        let half_width = self.half_width;
        for (position, landmark) in self.geometry.positions_mut().iter_mut().zip(landmarks) {
            //Image space to mesh space: center x, flip y and z
            *position = Vec3::new(landmark.x - half_width, -landmark.y, -landmark.z);
        }
        self.geometry.compute_normals();
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    //The base mesh only renders in debug mode; normally just the painted
    //surfaces are visible over the video.
    pub fn debug_visible(&self) -> bool {
        self.debug_visible
    }

    pub fn set_debug_visible(&mut self, visible: bool) {
        self.debug_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_geometry() -> Geometry {
        Geometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn landmarks_map_to_mesh_space() {
        let mut mesh = FaceMesh::new(triangle_geometry(), 3, 640.0).unwrap();
        mesh.apply_landmarks(&[
            Vec3::new(320.0, 100.0, 40.0),
            Vec3::new(640.0, 0.0, 0.0),
            Vec3::new(0.0, 200.0, -5.0),
        ]);
        let positions = mesh.geometry().positions();
        assert_eq!(positions[0], Vec3::new(0.0, -100.0, -40.0));
        assert_eq!(positions[1], Vec3::new(320.0, 0.0, 0.0));
        assert_eq!(positions[2], Vec3::new(-320.0, -200.0, 5.0));
    }

    #[test]
    fn apply_refreshes_normals() {
        let mut mesh = FaceMesh::new(triangle_geometry(), 3, 0.0).unwrap();
        mesh.apply_landmarks(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ]);
        //Vertices land at origin, +Y and +X: the face flips to -Z
        assert!((mesh.geometry().face_normal(0) + Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn vertex_count_must_match_landmark_count() {
        let result = FaceMesh::new(triangle_geometry(), 468, 640.0);
        assert!(matches!(
            result,
            Err(SetupError::LandmarkCountMismatch {
                landmarks: 468,
                vertices: 3
            })
        ));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let geometry = Geometry::new(vec![Vec3::ZERO], None, Vec::new());
        assert!(matches!(
            FaceMesh::new(geometry, 1, 640.0),
            Err(SetupError::EmptyMesh)
        ));
    }
}
