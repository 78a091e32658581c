use log::info;

use crate::deform::FaceMesh;
use crate::engine::{Canvas, Geometry, Transform};
use crate::math_prelude::*;
use crate::picker::MeshHit;
use crate::scene::{BrushParams, Config};

//Distance a surface sits behind its anchor triangle along the inward normal,
//so it never z-fights with the mesh it is glued to.
pub const PLANE_OFFSET: f32 = 10.0;

//One drawing session: a raster canvas carried by a quad glued to a single
//triangle of the face mesh. The anchor never changes; the pose is re-derived
//from the anchor's vertices every frame.
pub struct PaintSurface {
    anchor: [usize; 3],
    transform: Transform,
    quad: Geometry,
    canvas: Canvas,
    raw_points: Vec<Vec2>,
    debug_visible: bool,
}

impl PaintSurface {
    fn new(anchor: [usize; 3], config: &Config, debug_visible: bool) -> Self {
        //The quad spans half the canvas resolution in world units
        let quad = Geometry::plane(config.canvas_size as f32 / 2.0);
        let canvas_size = config.canvas_size as usize;
        Self {
            anchor,
            transform: Transform::IDENTITY,
            quad,
            canvas: Canvas::new(canvas_size, canvas_size),
            raw_points: Vec::new(),
            debug_visible,
        }
    }

    //Vertex index triple into the face mesh.
    pub fn anchor(&self) -> [usize; 3] {
        self.anchor
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn quad(&self) -> &Geometry {
        &self.quad
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    //Canvas-space points accumulated over this surface's gesture, append only.
    pub fn raw_points(&self) -> &[Vec2] {
        &self.raw_points
    }

    pub(crate) fn push_raw_point(&mut self, point: Vec2) {
        self.raw_points.push(point);
    }

    pub fn debug_visible(&self) -> bool {
        self.debug_visible
    }

    //Re-derives the pose from the anchor triangle's current vertices: sit
    //PLANE_OFFSET behind the centroid, facing the triangle normal.
    fn align(&mut self, mesh: &FaceMesh) {
        let positions = mesh.geometry().positions();
        let [a, b, c] = self.anchor;
        let (a, b, c) = (positions[a], positions[b], positions[c]);
        let cross = (b - a).cross(c - a);
        //A collapsed anchor keeps the previous pose for a frame
        if cross.length_squared() <= f32::EPSILON {
            return;
        }
        let normal = cross.normalize();
        let centroid = (a + b + c) / 3.0;
        self.transform = Transform {
            position: centroid - normal * PLANE_OFFSET,
            rotation: Transform::look_along(normal),
        };
    }
}

//Creation-ordered stack of paint surfaces. At most one surface is active,
//meaning a pointer is currently down and drawing on it.
#[derive(Default)]
pub struct SurfaceStack {
    surfaces: Vec<PaintSurface>,
    active: Option<usize>,
}

impl SurfaceStack {
    pub fn new() -> Self {
        Self::default()
    }

    //Anchors a fresh surface at the hit triangle, poses it and makes it the
    //active drawing target.
    pub fn begin_stroke(
        &mut self,
        hit: &MeshHit,
        mesh: &FaceMesh,
        config: &Config,
        params: &BrushParams,
    ) {
        let mut surface = PaintSurface::new(hit.triangle, config, params.debug);
        surface.align(mesh);
        info!(
            "paint surface {} anchored at triangle {:?}",
            self.surfaces.len(),
            hit.triangle
        );
        self.surfaces.push(surface);
        self.active = Some(self.surfaces.len() - 1);
    }

    //Runs once per frame so every surface follows the deforming mesh.
    pub fn realign(&mut self, mesh: &FaceMesh) {
        for surface in self.surfaces.iter_mut() {
            surface.align(mesh);
        }
    }

    pub fn end_stroke(&mut self) {
        self.active = None;
    }

    //Removes the most recently created surface, regardless of which one was
    //drawn on last. Empty stacks stay empty.
    pub fn undo(&mut self) {
        self.end_stroke();
        if self.surfaces.pop().is_some() {
            info!("undo: {} surfaces left", self.surfaces.len());
        }
    }

    pub fn clear(&mut self) {
        self.end_stroke();
        if !self.surfaces.is_empty() {
            info!("cleared {} surfaces", self.surfaces.len());
            self.surfaces.clear();
        }
    }

    //One switch drives the helpers of every surface and the base mesh.
    pub fn set_debug_visible(&mut self, visible: bool, mesh: &mut FaceMesh) {
        for surface in self.surfaces.iter_mut() {
            surface.debug_visible = visible;
        }
        mesh.set_debug_visible(visible);
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_surface(&self) -> Option<&PaintSurface> {
        self.active.map(|index| &self.surfaces[index])
    }

    pub fn active_surface_mut(&mut self) -> Option<&mut PaintSurface> {
        self.active.map(move |index| &mut self.surfaces[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaintSurface> {
        self.surfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
