use crate::math_prelude::*;

//Indexed triangle surface with derived normals. Topology is fixed after
//construction; vertex positions may be rewritten in place, after which
//compute_normals brings the normals back in sync.
#[derive(Debug)]
pub struct Geometry {
    positions: Vec<Vec3>,
    uvs: Option<Vec<Vec2>>,
    triangles: Vec<[usize; 3]>,
    face_normals: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, uvs: Option<Vec<Vec2>>, triangles: Vec<[usize; 3]>) -> Self {
        debug_assert!(triangles
            .iter()
            .flatten()
            .all(|index| *index < positions.len()));
        debug_assert!(uvs.as_ref().map_or(true, |uvs| uvs.len() == positions.len()));
        let mut geometry = Self {
            face_normals: vec![Vec3::Z; triangles.len()],
            vertex_normals: vec![Vec3::Z; positions.len()],
            positions,
            uvs,
            triangles,
        };
        geometry.compute_normals();
        geometry
    }

    //Two-triangle quad in the XY plane centered on the origin, facing +Z.
    //UVs run u rightward and v upward, so v = 1 sits on the top edge.
    pub fn plane(size: f32) -> Self {
        let half = size / 2.0;
        let positions = vec![
            Vec3::new(-half, half, 0.0),
            Vec3::new(half, half, 0.0),
            Vec3::new(-half, -half, 0.0),
            Vec3::new(half, -half, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
        ];
        let triangles = vec![[0, 2, 1], [2, 3, 1]];
        Self::new(positions, Some(uvs), triangles)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn triangle(&self, index: usize) -> [usize; 3] {
        self.triangles[index]
    }

    pub fn face_normal(&self, index: usize) -> Vec3 {
        self.face_normals[index]
    }

    pub fn vertex_normal(&self, index: usize) -> Vec3 {
        self.vertex_normals[index]
    }

    pub fn triangle_centroid(&self, index: usize) -> Vec3 {
        let [a, b, c] = self.triangles[index];
        (self.positions[a] + self.positions[b] + self.positions[c]) / 3.0
    }

    //Recomputes per-face and per-vertex normals from the current positions.
    pub fn compute_normals(&mut self) {
        for (index, [a, b, c]) in self.triangles.iter().copied().enumerate() {
            let edge1 = self.positions[b] - self.positions[a];
            let edge2 = self.positions[c] - self.positions[a];
            let cross = edge1.cross(edge2);
            //A collapsed face keeps its previous normal
            if cross.length_squared() > f32::EPSILON {
                self.face_normals[index] = cross.normalize();
            }
        }
        self.vertex_normals.fill(Vec3::ZERO);
        for (index, [a, b, c]) in self.triangles.iter().copied().enumerate() {
            let normal = self.face_normals[index];
            self.vertex_normals[a] += normal;
            self.vertex_normals[b] += normal;
            self.vertex_normals[c] += normal;
        }
        for normal in self.vertex_normals.iter_mut() {
            *normal = normal.normalize_or_zero();
            if *normal == Vec3::ZERO {
                *normal = Vec3::Z;
            }
        }
    }
}
