use facepaint::engine::{Geometry, Texture};
use glam::{Quat, Vec2, Vec3, Vec4};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::Rng;

//Procedural stand-ins for the camera feed and the tracking model: a grid
//mask bulged toward the camera, a landmark script that sways and nods it,
//and a video frame with an off-center glow so the selfie flip is visible.

pub const GRID_COLS: usize = 12;
pub const GRID_ROWS: usize = 12;

//Mask landmarks in image space (x right, y down, z into the screen),
//centered in a `width` x `height` frame.
pub fn base_landmarks(width: f32, height: f32) -> Vec<Vec3> {
    let mut landmarks = Vec::with_capacity(GRID_COLS * GRID_ROWS);
    for (row, col) in (0..GRID_ROWS).cartesian_product(0..GRID_COLS) {
        let u = col as f32 / (GRID_COLS - 1) as f32;
        let v = row as f32 / (GRID_ROWS - 1) as f32;
        let x = width * (0.30 + 0.40 * u);
        let y = height * (0.22 + 0.52 * v);
        //Bulge toward the camera, strongest in the middle
        let z = -80.0 * (std::f32::consts::PI * u).sin() * (std::f32::consts::PI * v).sin();
        landmarks.push(Vec3::new(x, y, z));
    }
    landmarks
}

pub fn mask_triangles() -> Vec<[usize; 3]> {
    let mut triangles = Vec::new();
    for (row, col) in (0..GRID_ROWS - 1).cartesian_product(0..GRID_COLS - 1) {
        let a = row * GRID_COLS + col;
        let b = a + 1;
        let c = a + GRID_COLS;
        let d = c + 1;
        triangles.push([a, c, b]);
        triangles.push([c, d, b]);
    }
    triangles
}

//The initial mesh pose: base landmarks pushed through the same image-to-mesh
//mapping the deformer applies (x centered, y and z flipped).
pub fn mask_geometry(width: f32, height: f32) -> Geometry {
    let positions = base_landmarks(width, height)
        .into_iter()
        .map(|landmark| Vec3::new(landmark.x - width / 2.0, -landmark.y, -landmark.z))
        .collect();
    Geometry::new(positions, None, mask_triangles())
}

//Image-space landmarks reproducing `geometry` exactly, for meshes loaded
//from a file instead of the procedural mask.
pub fn landmarks_for(geometry: &Geometry, width: f32) -> Vec<Vec3> {
    geometry
        .positions()
        .iter()
        .map(|position| Vec3::new(position.x + width / 2.0, -position.y, -position.z))
        .collect()
}

//Rigid sway and nod applied to the base landmarks, with a short dropout in
//the middle where the tracker reports no face.
pub fn landmark_script(
    base: &[Vec3],
    width: f32,
    height: f32,
    frames: usize,
) -> Vec<Option<Vec<Vec3>>> {
    let center = Vec3::new(width / 2.0, height / 2.0, 0.0);
    (0..frames)
        .map(|frame| {
            if (frames / 2..frames / 2 + 6).contains(&frame) {
                return None;
            }
            let t = frame as f32 / 30.0;
            let sway = Vec3::new(
                (t * 0.9).sin() * width * 0.04,
                (t * 0.6).cos() * height * 0.02,
                0.0,
            );
            let nod = Quat::from_rotation_x((t * 1.3).sin() * 0.12);
            Some(
                base.iter()
                    .map(|landmark| nod * (*landmark - center) + center + sway)
                    .collect(),
            )
        })
        .collect()
}

//Gradient backdrop with per-pixel noise and a glow drifting left of center.
pub fn video_frame(width: usize, height: usize, frame: usize, rng: &mut StdRng) -> Texture {
    let t = frame as f32 / 30.0;
    let glow_center = Vec2::new(0.38 + 0.02 * (t * 0.7).sin(), 0.45);
    let mut pixels = Vec::with_capacity(width * height);
    for (y, x) in (0..height).cartesian_product(0..width) {
        let u = x as f32 / width as f32;
        let v = y as f32 / height as f32;
        let glow = (1.0 - (Vec2::new(u, v) - glow_center).length() * 2.2).max(0.0);
        let noise = rng.gen_range(-0.02..0.02);
        let r = (0.08 + 0.20 * u + 0.35 * glow + noise).clamp(0.0, 1.0);
        let g = (0.10 + 0.12 * v + 0.30 * glow + noise).clamp(0.0, 1.0);
        let b = (0.16 + 0.10 * (1.0 - u) + 0.25 * glow + noise).clamp(0.0, 1.0);
        pixels.push(Vec4::new(r, g, b, 1.0));
    }
    Texture::from_pixels(width, height, pixels)
}
