use std::time::Instant;

use log::{debug, info};

use crate::deform::FaceMesh;
use crate::engine::{
    Camera, FrameTime, Framebuffer, Geometry, PassOptions, Renderer, Texture, Transform,
};
use crate::error::SetupError;
use crate::math_prelude::*;
use crate::picker::{self, PickHit, PickTarget};
use crate::shaders::{
    CanvasFragmentShader, MeshVertex, MeshVertexShader, NormalFragmentShader, ProjViewModel,
    SurfaceVertex, SurfaceVertexShader,
};
use crate::stroke;
use crate::surface::SurfaceStack;
use crate::tracking::TrackerHandle;

//Render target and paint resolution. Always supplied by the embedder;
//nothing in the library assumes a fixed frame size.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    //Side of the square canvas each paint surface carries
    pub canvas_size: u32,
}

impl Config {
    pub const DEFAULT_CANVAS_SIZE: u32 = 1024;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            canvas_size: Self::DEFAULT_CANVAS_SIZE,
        }
    }
}

//Brush state shared by the whole pipeline, owned by the scene and mutated
//through its setters from UI events.
#[derive(Debug, Clone, Copy)]
pub struct BrushParams {
    pub color: Vec4,
    pub thickness: f32,
    //Path simplification tolerance in canvas pixels
    pub smoothing: f32,
    pub debug: bool,
}

impl Default for BrushParams {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            thickness: 20.0,
            smoothing: 1.5,
            debug: false,
        }
    }
}

const DEBUG_AXIS_SIZE: f32 = 50.0;
const DEBUG_GRID_SIZE: f32 = 30.0;
const DEBUG_GRID_DIVISIONS: u32 = 3;

//Owns every piece of the painting pipeline and drives the per-frame
//update/render cycle. All calls happen on one thread; the worker behind
//TrackerHandle is the only other thread involved.
pub struct Scene {
    config: Config,
    camera: Camera,
    renderer: Renderer,
    video: Option<Texture>,
    mesh: FaceMesh,
    surfaces: SurfaceStack,
    params: BrushParams,
    tracker: TrackerHandle,
    paused: bool,
    face_visible: bool,
    frame_time: FrameTime,
}

impl Scene {
    pub fn new(config: Config, geometry: Geometry, tracker: TrackerHandle) -> Result<Self, SetupError> {
        let mesh = FaceMesh::new(geometry, tracker.landmark_count(), config.width as f32)?;
        let mut camera = Camera::new(config.width as f32, config.height as f32);
        //Centered on x, half a frame down and a full frame back, so the
        //deformed mesh lines up with the video behind it
        camera.position = Vec3::new(0.0, -(config.height as f32) / 2.0, config.height as f32);
        info!(
            "scene ready: {}x{} target, {} landmark mesh",
            config.width,
            config.height,
            tracker.landmark_count()
        );
        Ok(Self {
            config,
            camera,
            renderer: Renderer::new(config.width, config.height),
            video: None,
            mesh,
            surfaces: SurfaceStack::new(),
            params: BrushParams::default(),
            tracker,
            paused: false,
            face_visible: false,
            frame_time: FrameTime::zero(),
        })
    }

    //One animation tick: ingest the video frame, exchange work with the
    //tracking worker, deform the mesh, realign every surface, render.
    pub fn advance(&mut self, frame: Option<&Texture>) {
        let start = Instant::now();
        if let Some(frame) = frame {
            match self.video.as_mut() {
                Some(video) => video.update(frame.pixels()),
                None => self.video = Some(frame.clone()),
            }
        }

        if let Some(result) = self.tracker.poll() {
            if self.paused {
                debug!("dropping tracking result received while paused");
            } else {
                match result {
                    Some(landmarks) => {
                        if !self.face_visible {
                            info!("face acquired");
                            self.face_visible = true;
                        }
                        self.mesh.apply_landmarks(&landmarks);
                    }
                    //No face in frame: the mesh holds its last pose
                    None => {
                        if self.face_visible {
                            info!("face lost, holding last pose");
                            self.face_visible = false;
                        }
                    }
                }
            }
        }
        if !self.paused {
            if let Some(video) = &self.video {
                self.tracker.request(video);
            }
        }
        let tracking = start.elapsed();

        let start = Instant::now();
        self.surfaces.realign(&self.mesh);
        let update = start.elapsed();

        let start = Instant::now();
        self.render();
        let render = start.elapsed();

        self.frame_time = FrameTime::new(tracking, update, render);
    }

    fn render(&mut self) {
        self.renderer.clear(Vec3::ZERO);
        if let Some(video) = &self.video {
            self.renderer.blit(video);
        }

        let view = self.camera.generate_view_matrix();
        let projection = self.camera.generate_projection_matrix();
        let mut uniform = ProjViewModel {
            projection,
            view,
            model: Mat4::IDENTITY,
        };

        //The base mesh only draws in debug mode, opaque, so painted surfaces
        //offset behind it get occluded exactly where the face covers them
        if self.mesh.debug_visible() {
            let geometry = self.mesh.geometry();
            let vertices: Vec<MeshVertex> = geometry
                .positions()
                .iter()
                .enumerate()
                .map(|(index, position)| MeshVertex {
                    position: *position,
                    normal: geometry.vertex_normal(index),
                })
                .collect();
            self.renderer.render_pass(
                &vertices,
                geometry.triangles(),
                &MeshVertexShader,
                &NormalFragmentShader,
                &uniform,
                PassOptions::OPAQUE,
            );
        }

        //Surfaces composite in creation order and never write depth, so
        //overlapping strokes stack by age
        for surface in self.surfaces.iter() {
            let quad = surface.quad();
            let Some(uvs) = quad.uvs() else { continue };
            let vertices: Vec<SurfaceVertex> = quad
                .positions()
                .iter()
                .zip(uvs)
                .map(|(position, uv)| SurfaceVertex {
                    position: *position,
                    uv: *uv,
                })
                .collect();
            uniform.model = surface.transform().matrix();
            self.renderer.render_pass(
                &vertices,
                quad.triangles(),
                &SurfaceVertexShader,
                &CanvasFragmentShader::new(surface.canvas()),
                &uniform,
                PassOptions::OVERLAY,
            );
        }

        let matrix = projection * view;
        for surface in self.surfaces.iter().filter(|s| s.debug_visible()) {
            draw_debug_helper(&mut self.renderer, &matrix, surface.transform());
        }
    }

    //Pointer input in render-surface pixels, origin top-left. Press and drag
    //feed the same flow: the first event over the face anchors a surface and
    //every event over the active surface appends a point.
    pub fn pointer_down(&mut self, point: Vec2) {
        self.draw(point);
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        self.draw(point);
    }

    pub fn pointer_up(&mut self) {
        self.surfaces.end_stroke();
    }

    fn draw(&mut self, point: Vec2) {
        if self.surfaces.is_active() {
            self.append_at(point);
            return;
        }
        let hit = picker::pick(point, &self.camera, PickTarget::Mesh(&self.mesh));
        if let Some(PickHit::Mesh(hit)) = hit {
            self.surfaces
                .begin_stroke(&hit, &self.mesh, &self.config, &self.params);
            //Land the first point right away so a tap leaves a dot
            self.append_at(point);
        }
        //A miss is the normal case when the pointer is off the face
    }

    fn append_at(&mut self, point: Vec2) {
        let hit = match self.surfaces.active_surface() {
            Some(surface) => picker::pick(point, &self.camera, PickTarget::Surface(surface)),
            None => None,
        };
        if let Some(PickHit::Surface(hit)) = hit {
            if let Some(surface) = self.surfaces.active_surface_mut() {
                stroke::append_point(surface, hit.uv, &self.params);
            }
        }
    }

    pub fn is_over_face(&self, point: Vec2) -> bool {
        picker::is_over_face(point, &self.camera, &self.mesh)
    }

    //Pausing freezes tracking: no new inference requests go out and results
    //arriving late are dropped. Drawing and rendering keep working on the
    //frozen pose.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.params.color = color;
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.params.thickness = thickness;
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.params.smoothing = smoothing;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.params.debug = debug;
        self.surfaces.set_debug_visible(debug, &mut self.mesh);
        debug!("debug mode {}", if debug { "on" } else { "off" });
    }

    pub fn undo(&mut self) {
        self.surfaces.undo();
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    pub fn params(&self) -> &BrushParams {
        &self.params
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mesh(&self) -> &FaceMesh {
        &self.mesh
    }

    pub fn surfaces(&self) -> &SurfaceStack {
        &self.surfaces
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.renderer.framebuffer()
    }

    pub fn frametime(&self) -> &FrameTime {
        &self.frame_time
    }
}

//Axis tripod plus a small wireframe grid at a surface's pose.
fn draw_debug_helper(renderer: &mut Renderer, matrix: &Mat4, transform: &Transform) {
    let origin = transform.position;
    let axes = [
        (Vec3::X, Vec3::new(1.0, 0.0, 0.0)),
        (Vec3::Y, Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::Z, Vec3::new(0.0, 0.0, 1.0)),
    ];
    for (axis, color) in axes {
        let end = origin + transform.rotation * axis * DEBUG_AXIS_SIZE;
        renderer.draw_line(matrix, origin, end, color);
    }

    let half = DEBUG_GRID_SIZE / 2.0;
    let step = DEBUG_GRID_SIZE / DEBUG_GRID_DIVISIONS as f32;
    for line in 0..=DEBUG_GRID_DIVISIONS {
        let offset = -half + line as f32 * step;
        let horizontal = [Vec3::new(-half, offset, 0.0), Vec3::new(half, offset, 0.0)];
        let vertical = [Vec3::new(offset, -half, 0.0), Vec3::new(offset, half, 0.0)];
        for [from, to] in [horizontal, vertical] {
            renderer.draw_line(
                matrix,
                transform.transform_point(from),
                transform.transform_point(to),
                Vec3::ONE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::ScriptedTracker;

    fn test_scene() -> Scene {
        let geometry = Geometry::new(
            vec![
                Vec3::new(-60.0, -40.0, 0.0),
                Vec3::new(60.0, -40.0, 0.0),
                Vec3::new(0.0, -160.0, 0.0),
            ],
            None,
            vec![[0, 2, 1]],
        );
        let tracker = TrackerHandle::spawn(ScriptedTracker::new(3, Vec::new()));
        Scene::new(Config::new(200, 200), geometry, tracker).unwrap()
    }

    #[test]
    fn pointer_off_face_creates_nothing() {
        let mut scene = test_scene();
        scene.pointer_down(Vec2::new(2.0, 2.0));
        assert!(scene.surfaces().is_empty());
        assert!(!scene.surfaces().is_active());
    }

    #[test]
    fn pointer_on_face_anchors_and_dots() {
        let mut scene = test_scene();
        //Center of the screen, over the triangle
        scene.pointer_down(Vec2::new(100.0, 100.0));
        assert_eq!(scene.surfaces().len(), 1);
        let surface = scene.surfaces().iter().next().unwrap();
        assert_eq!(surface.raw_points().len(), 1);
        assert!(surface.canvas().pixels().iter().any(|pixel| pixel.w > 0.0));
    }

    #[test]
    fn release_keeps_surface_but_deactivates() {
        let mut scene = test_scene();
        scene.pointer_down(Vec2::new(100.0, 100.0));
        assert!(scene.surfaces().is_active());
        scene.pointer_up();
        assert!(!scene.surfaces().is_active());
        assert_eq!(scene.surfaces().len(), 1);
        //The next press over the face starts a new surface
        scene.pointer_down(Vec2::new(100.0, 100.0));
        assert_eq!(scene.surfaces().len(), 2);
    }

    #[test]
    fn debug_toggle_reaches_mesh_and_surfaces() {
        let mut scene = test_scene();
        scene.pointer_down(Vec2::new(100.0, 100.0));
        scene.pointer_up();
        scene.set_debug(true);
        assert!(scene.mesh().debug_visible());
        assert!(scene.params().debug);
        scene.set_debug(false);
        assert!(!scene.mesh().debug_visible());
    }

    #[test]
    fn advance_without_video_still_renders() {
        let mut scene = test_scene();
        scene.pointer_down(Vec2::new(100.0, 100.0));
        scene.pointer_up();
        scene.advance(None);
        //The painted surface shows up in the framebuffer
        let painted = scene
            .framebuffer()
            .color()
            .filter(|(_, _, color)| color.max_element() > 0.0)
            .count();
        assert!(painted > 0);
    }
}
