use itertools::Itertools;
use rayon::prelude::*;

use crate::math_prelude::*;

use super::bounding_box::BoundingBox;
use super::framebuffer::Framebuffer;
use super::shader::{FragmentShader, ShaderData, VertexShader};
use super::texture::Texture;

//Raster behavior of a single pass. Opaque geometry tests and writes depth;
//blended overlays test against it without writing so later overlays still
//composite on top.
#[derive(Debug, Clone, Copy)]
pub struct PassOptions {
    pub depth_test: bool,
    pub depth_write: bool,
    pub blend: bool,
}

impl PassOptions {
    pub const OPAQUE: Self = Self {
        depth_test: true,
        depth_write: true,
        blend: false,
    };
    pub const OVERLAY: Self = Self {
        depth_test: true,
        depth_write: false,
        blend: true,
    };
}

#[derive(Debug, Clone)]
struct Fragment {
    depth: f32,
    //Index to ProcessedFace
    face: usize,
    vertex0_ratio: f32,
    vertex1_ratio: f32,
    vertex2_ratio: f32,
}

impl Fragment {
    const INVALID_FACE_INDEX: usize = usize::MAX;

    fn is_valid(&self) -> bool {
        self.face != Self::INVALID_FACE_INDEX
    }
}

impl Default for Fragment {
    fn default() -> Self {
        Self {
            depth: f32::MAX,
            face: Self::INVALID_FACE_INDEX,
            vertex0_ratio: 0.0,
            vertex1_ratio: 0.0,
            vertex2_ratio: 0.0,
        }
    }
}

struct FrameBlock {
    //The screen region this block rasterizes
    bounding_box: BoundingBox,
    //Indices to ProcessedFace
    face_indices: Vec<usize>,
    fragments: Vec<Fragment>,
}

impl FrameBlock {
    fn new(bounding_box: BoundingBox) -> Self {
        let size = bounding_box.width() * bounding_box.height();
        Self {
            bounding_box,
            face_indices: Vec::with_capacity(128),
            fragments: vec![Fragment::default(); size as usize],
        }
    }

    fn clear(&mut self) {
        self.face_indices.clear();
        self.fragments.iter_mut().for_each(|fragment| {
            fragment.depth = f32::MAX;
            fragment.face = Fragment::INVALID_FACE_INDEX;
        });
    }
}

struct TriangleInteriorChecker {
    vertex0: Vec3,
    inv_col1: Vec2,
    inv_col2: Vec2,
}

impl TriangleInteriorChecker {
    fn new(v0: &Vec3, v1: &Vec3, v2: &Vec3) -> Self {
        let col1 = *v1 - *v0;
        let col2 = *v2 - *v0;
        let inv_det = 1.0 / (col1.x * col2.y - col2.x * col1.y);
        let inv_col1 = Vec2::new(col2.y, -col1.y) * inv_det;
        let inv_col2 = Vec2::new(-col2.x, col1.x) * inv_det;
        Self {
            vertex0: *v0,
            inv_col1,
            inv_col2,
        }
    }

    fn to_triangle_coords(&self, point: Vec2) -> Vec2 {
        let target_x = point.x - self.vertex0.x;
        let target_y = point.y - self.vertex0.y;
        Vec2::new(
            self.inv_col1.x * target_x + self.inv_col2.x * target_y,
            self.inv_col1.y * target_x + self.inv_col2.y * target_y,
        )
    }

    //A point already in triangle coords
    fn is_point_in_triangle(&self, triangle_point: Vec2) -> bool {
        0.0 <= triangle_point.x
            && 0.0 <= triangle_point.y
            && (triangle_point.x + triangle_point.y) <= 1.0
    }
}

struct ProcessedFace<DataType> {
    vertex0: Vec3,
    vertex0_data: DataType,
    vertex1: Vec3,
    vertex1_data: DataType,
    vertex2: Vec3,
    vertex2_data: DataType,
    bounding_box: BoundingBox,
    //False when a vertex landed on or behind the camera plane
    in_front: bool,
}

pub struct Renderer {
    framebuffer: Framebuffer,
    frame_blocks: Option<Vec<FrameBlock>>,
    frame_block_count: usize,
}

impl Renderer {
    const NORMALIZED_COORDS_MIN: f32 = -1.0;
    const NORMALIZED_COORDS_MAX: f32 = 1.0;
    const BLOCK_SIZE: u32 = 64;

    pub fn new(width: u32, height: u32) -> Self {
        let framebuffer = Framebuffer::new(width, height);
        let mut frame_blocks = Vec::new();
        for y in (0..height).step_by(Self::BLOCK_SIZE as usize) {
            for x in (0..width).step_by(Self::BLOCK_SIZE as usize) {
                let w = Self::BLOCK_SIZE.min(width - x);
                let h = Self::BLOCK_SIZE.min(height - y);
                frame_blocks.push(FrameBlock::new(BoundingBox::new(x, y, w, h)));
            }
        }
        let frame_block_count = frame_blocks.len();
        Self {
            framebuffer,
            frame_blocks: Some(frame_blocks),
            frame_block_count,
        }
    }

    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn clear(&mut self, color: Vec3) {
        self.framebuffer.clear(color);
    }

    //Copies a texture over the whole color target, nearest sampled. Depth is
    //left untouched so geometry passes draw over the copy.
    pub fn blit(&mut self, texture: &Texture) {
        let width = self.framebuffer.width as usize;
        let height = self.framebuffer.height as usize;
        let texture_width = texture.width();
        let texture_height = texture.height();
        self.framebuffer
            .color
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, color)| {
                let x = index % width;
                let y = index / width;
                let tx = x * texture_width / width;
                let ty = y * texture_height / height;
                *color = texture.color_at(tx, ty).truncate();
            });
    }

    //Rasterizes one shader pass. Three stages, each parallel: vertex shading
    //per triangle, per-block rasterization with an in-pass depth race, and a
    //per-pixel composite into the framebuffer honoring `options`.
    pub fn render_pass<VS, FS, SD, V, U>(
        &mut self,
        vertices: &[V],
        triangles: &[[usize; 3]],
        vertex_shader: &VS,
        fragment_shader: &FS,
        uniform: &U,
        options: PassOptions,
    ) where
        V: Send + Sync,
        U: Send + Sync,
        SD: ShaderData,
        VS: VertexShader<VertexData = V, Uniform = U, SharedData = SD>,
        FS: FragmentShader<Uniform = U, SharedData = SD>,
    {
        //Need to take the blocks because of ownership
        let mut frame_blocks = self.frame_blocks.take().unwrap();
        frame_blocks.par_iter_mut().for_each(|block| block.clear());

        //Vertex shader stage
        let mut processed_faces = Vec::with_capacity(triangles.len());
        triangles
            .par_iter()
            .map(|&[i0, i1, i2]| {
                let (vertex0, vertex0_data) = vertex_shader.vertex(&vertices[i0], uniform);
                let (vertex1, vertex1_data) = vertex_shader.vertex(&vertices[i1], uniform);
                let (vertex2, vertex2_data) = vertex_shader.vertex(&vertices[i2], uniform);
                //No near-plane clipping: faces touching it are dropped whole
                let in_front = vertex0.w > 0.0 && vertex1.w > 0.0 && vertex2.w > 0.0;
                let vertex0 = vertex0.xyz() / vertex0.w;
                let vertex1 = vertex1.xyz() / vertex1.w;
                let vertex2 = vertex2.xyz() / vertex2.w;
                let bounding_box = if in_front {
                    self.bounding_box_from_vertices(&vertex0, &vertex1, &vertex2)
                } else {
                    BoundingBox::new(0, 0, 0, 0)
                };
                ProcessedFace {
                    vertex0,
                    vertex0_data,
                    vertex1,
                    vertex1_data,
                    vertex2,
                    vertex2_data,
                    bounding_box,
                    in_front,
                }
            })
            .collect_into_vec(&mut processed_faces);

        //Bin the faces into their blocks so rasterization can run per block
        for (face_index, face) in processed_faces.iter().enumerate() {
            if self.is_face_in_screen(face) {
                for block_index in self.frame_blocks_in_bounding_box(&face.bounding_box) {
                    frame_blocks[block_index].face_indices.push(face_index);
                }
            }
        }

        //Rasterization stage
        let width = self.width();
        let height = self.height();
        frame_blocks.par_iter_mut().for_each(|block| {
            for (face_index, face) in block
                .face_indices
                .iter()
                .map(|index| (*index, &processed_faces[*index]))
            {
                let Some(rasterize_box) = block.bounding_box.overlap(&face.bounding_box) else {
                    continue;
                };
                let triangle_checker =
                    TriangleInteriorChecker::new(&face.vertex0, &face.vertex1, &face.vertex2);

                let y_iter = rasterize_box.y()..(rasterize_box.y() + rasterize_box.height());
                let x_iter = rasterize_box.x()..(rasterize_box.x() + rasterize_box.width());
                for (y, x) in y_iter.cartesian_product(x_iter) {
                    let (nx, ny) = screen_to_normalized(x, y, width, height);
                    let triangle_point = triangle_checker.to_triangle_coords(Vec2::new(nx, ny));
                    if !triangle_checker.is_point_in_triangle(triangle_point) {
                        continue;
                    }
                    let ratio_1 = triangle_point.x;
                    let ratio_2 = triangle_point.y;
                    let ratio_0 = 1.0 - ratio_1 - ratio_2;
                    let fragment_depth = ratio_0 * face.vertex0.z
                        + ratio_1 * face.vertex1.z
                        + ratio_2 * face.vertex2.z;
                    let fragment_index = {
                        let fragment_x = x - block.bounding_box.x();
                        let fragment_y = y - block.bounding_box.y();
                        (fragment_x + fragment_y * block.bounding_box.width()) as usize
                    };

                    let fragment = &mut block.fragments[fragment_index];
                    if fragment.depth > fragment_depth {
                        fragment.depth = fragment_depth;
                        fragment.face = face_index;
                        fragment.vertex0_ratio = ratio_0;
                        fragment.vertex1_ratio = ratio_1;
                        fragment.vertex2_ratio = ratio_2;
                    }
                }
            }
        });

        //Fragment shader stage
        let width = self.width() as usize;
        let blocks_width = self.frame_blocks_width();
        let Framebuffer { color, depth, .. } = &mut self.framebuffer;
        color
            .par_iter_mut()
            .zip(depth.par_iter_mut())
            .enumerate()
            .for_each(|(index, (color, depth))| {
                let x = index % width;
                let y = index / width;
                let block_index = x / Self::BLOCK_SIZE as usize
                    + (y / Self::BLOCK_SIZE as usize) * blocks_width as usize;
                let block = &frame_blocks[block_index];
                let fragment_x = x - block.bounding_box.x() as usize;
                let fragment_y = y - block.bounding_box.y() as usize;
                let fragment_index = fragment_x + fragment_y * block.bounding_box.width() as usize;
                let fragment = &block.fragments[fragment_index];
                if !fragment.is_valid() {
                    return;
                }
                if options.depth_test && fragment.depth >= *depth {
                    return;
                }
                let face = &processed_faces[fragment.face];
                let interpolated = SD::interpolate(
                    &face.vertex0_data,
                    &face.vertex1_data,
                    &face.vertex2_data,
                    fragment.vertex0_ratio,
                    fragment.vertex1_ratio,
                    fragment.vertex2_ratio,
                );
                let shaded = fragment_shader.fragment(&interpolated, uniform);
                *color = if options.blend {
                    shaded.xyz() * shaded.w + *color * (1.0 - shaded.w)
                } else {
                    shaded.xyz()
                };
                if options.depth_write {
                    *depth = fragment.depth;
                }
            });

        self.frame_blocks = Some(frame_blocks);
    }

    //Depth-tested line between two world points, Bresenham in screen space.
    //Endpoints behind the near plane drop the whole line instead of clipping.
    pub fn draw_line(&mut self, matrix: &Mat4, from: Vec3, to: Vec3, color: Vec3) {
        let from_clip = *matrix * from.extend(1.0);
        let to_clip = *matrix * to.extend(1.0);
        if from_clip.w <= 0.0 || to_clip.w <= 0.0 {
            return;
        }
        let from_ndc = from_clip.xyz() / from_clip.w;
        let to_ndc = to_clip.xyz() / to_clip.w;

        let (x0, y0) = normalized_to_screen(from_ndc.x, from_ndc.y, self.width(), self.height());
        let (x1, y1) = normalized_to_screen(to_ndc.x, to_ndc.y, self.width(), self.height());
        let (mut x, mut y) = (x0 as i64, y0 as i64);
        let (x1, y1) = (x1 as i64, y1 as i64);

        let dx = (x1 - x).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let dy = -(y1 - y).abs();
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let steps = dx.max(-dy).max(1);
        let mut step = 0i64;

        loop {
            let t = step as f32 / steps as f32;
            let line_depth = from_ndc.z + (to_ndc.z - from_ndc.z) * t;
            if self
                .framebuffer
                .set_depth_if_nearer(x as u32, y as u32, line_depth)
            {
                self.framebuffer.set_color(x as u32, y as u32, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1;
        }
    }

    //Conservative frustum test: a face is only rejected when all three
    //vertices sit beyond the same clip plane. Faces larger than the screen
    //pass even with every vertex outside.
    fn is_face_in_screen<D>(&self, face: &ProcessedFace<D>) -> bool {
        if !face.in_front {
            return false;
        }
        let min = Self::NORMALIZED_COORDS_MIN;
        let max = Self::NORMALIZED_COORDS_MAX;
        let (v0, v1, v2) = (&face.vertex0, &face.vertex1, &face.vertex2);
        let beyond_one_plane = (v0.x < min && v1.x < min && v2.x < min)
            || (v0.x > max && v1.x > max && v2.x > max)
            || (v0.y < min && v1.y < min && v2.y < min)
            || (v0.y > max && v1.y > max && v2.y > max)
            || (v0.z < min && v1.z < min && v2.z < min)
            || (v0.z > max && v1.z > max && v2.z > max);
        !beyond_one_plane
    }

    fn bounding_box_from_vertices(&self, v0: &Vec3, v1: &Vec3, v2: &Vec3) -> BoundingBox {
        let min_x = v0.x.min(v1.x.min(v2.x));
        let min_y = v0.y.min(v1.y.min(v2.y));
        let max_x = v0.x.max(v1.x.max(v2.x));
        let max_y = v0.y.max(v1.y.max(v2.y));

        let (tlx, tly) = normalized_to_screen(min_x, max_y, self.width(), self.height());
        let (brx, bry) = normalized_to_screen(max_x, min_y, self.width(), self.height());

        //Add 1 so the box fully covers the triangle after rounding
        BoundingBox::new(tlx, tly, brx - tlx + 1, bry - tly + 1)
    }

    //Number of frame blocks per line
    fn frame_blocks_width(&self) -> u32 {
        self.width() / Self::BLOCK_SIZE + (self.width() % Self::BLOCK_SIZE).min(1)
    }

    fn frame_blocks_in_bounding_box(
        &self,
        bounding_box: &BoundingBox,
    ) -> impl Iterator<Item = usize> {
        let left_block = bounding_box.x() / Self::BLOCK_SIZE;
        let right_block =
            (bounding_box.x() + bounding_box.width()).min(self.width()) / Self::BLOCK_SIZE;
        let top_block = bounding_box.y() / Self::BLOCK_SIZE;
        let bottom_block =
            (bounding_box.y() + bounding_box.height()).min(self.height()) / Self::BLOCK_SIZE;
        let blocks_width = self.frame_blocks_width();

        let block_count = self.frame_block_count;
        (top_block..=bottom_block)
            .cartesian_product(left_block..=right_block)
            .map(move |(y, x)| ((x + y * blocks_width) as usize).min(block_count - 1))
    }
}

fn normalized_to_screen(mut x: f32, mut y: f32, width: u32, height: u32) -> (u32, u32) {
    x = (x + 1.0) / 2.0;
    y = (-y + 1.0) / 2.0;
    let screen_x = ((x * width as f32) as u32).min(width - 1);
    let screen_y = ((y * height as f32) as u32).min(height - 1);
    (screen_x, screen_y)
}

fn screen_to_normalized(x: u32, y: u32, width: u32, height: u32) -> (f32, f32) {
    let normalized_x = (x as f32 / width as f32) * 2.0 - 1.0;
    let normalized_y = -((y as f32 / height as f32) * 2.0 - 1.0);
    (normalized_x, normalized_y)
}
