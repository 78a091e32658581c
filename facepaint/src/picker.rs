use crate::deform::FaceMesh;
use crate::engine::{self, Camera};
use crate::math_prelude::*;
use crate::surface::PaintSurface;

//What a pointer ray resolves against: the live face mesh, or the quad of one
//paint surface.
pub enum PickTarget<'a> {
    Mesh(&'a FaceMesh),
    Surface(&'a PaintSurface),
}

//A hit on the face mesh carries enough to anchor a new surface.
#[derive(Debug, Clone, Copy)]
pub struct MeshHit {
    pub position: Vec3,
    pub uv: Option<Vec2>,
    //Vertex indices of the hit triangle
    pub triangle: [usize; 3],
    pub normal: Vec3,
}

//A hit on a surface quad; `uv` addresses that surface's canvas.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    pub position: Vec3,
    pub uv: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub enum PickHit {
    Mesh(MeshHit),
    Surface(SurfaceHit),
}

//Resolves a pointer position against `target`. Pointer coordinates are
//render-surface pixels with the origin at the top-left. A miss returns None
//and is the ordinary outcome whenever the pointer is off the face.
pub fn pick(point: Vec2, camera: &Camera, target: PickTarget) -> Option<PickHit> {
    let ray = camera.ray_from_ndc(pointer_to_ndc(point, camera));
    match target {
        PickTarget::Mesh(mesh) => {
            let geometry = mesh.geometry();
            let hit = engine::intersect_geometry(&ray, geometry)?;
            Some(PickHit::Mesh(MeshHit {
                position: hit.position,
                uv: engine::interpolate_uv(&hit, geometry),
                triangle: geometry.triangle(hit.triangle),
                normal: geometry.face_normal(hit.triangle),
            }))
        }
        PickTarget::Surface(surface) => {
            let quad = surface.quad();
            let hit = engine::intersect_geometry_at(&ray, quad, surface.transform())?;
            let uv = engine::interpolate_uv(&hit, quad)?;
            Some(PickHit::Surface(SurfaceHit {
                position: hit.position,
                uv,
            }))
        }
    }
}

//Hover test: is the pointer over the face at all.
pub fn is_over_face(point: Vec2, camera: &Camera, mesh: &FaceMesh) -> bool {
    pick(point, camera, PickTarget::Mesh(mesh)).is_some()
}

//The on-screen preview is mirrored like a selfie, so x flips before the
//point maps to normalized device coordinates.
fn pointer_to_ndc(point: Vec2, camera: &Camera) -> Vec2 {
    let mirrored_x = camera.width() - point.x;
    Vec2::new(
        (mirrored_x / camera.width()) * 2.0 - 1.0,
        -(point.y / camera.height()) * 2.0 + 1.0,
    )
}
