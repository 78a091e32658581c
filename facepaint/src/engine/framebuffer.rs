use crate::math_prelude::*;

pub struct Framebuffer {
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) color: Vec<Vec3>,
    pub(super) depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            color: vec![Vec3::ZERO; size],
            depth: vec![f32::MAX; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Vec3) {
        self.color.fill(color);
        self.depth.fill(f32::MAX);
    }

    pub fn color(&self) -> impl Iterator<Item = (u32, u32, &Vec3)> {
        self.color.iter().enumerate().map(move |(index, color)| {
            let (x, y) = self.index_to_coords(index as u32);
            (x, y, color)
        })
    }

    pub fn get_color(&self, x: u32, y: u32) -> Option<&Vec3> {
        self.color.get(self.coords_to_index(x, y) as usize)
    }

    pub fn get_depth(&self, x: u32, y: u32) -> Option<&f32> {
        self.depth.get(self.coords_to_index(x, y) as usize)
    }

    pub(super) fn set_color(&mut self, x: u32, y: u32, color: Vec3) {
        let index = self.coords_to_index(x, y) as usize;
        self.color[index] = color;
    }

    //Stores `depth` and reports true when it is nearer than the stored value.
    pub(super) fn set_depth_if_nearer(&mut self, x: u32, y: u32, depth: f32) -> bool {
        let index = self.coords_to_index(x, y) as usize;
        if self.depth[index] > depth {
            self.depth[index] = depth;
            true
        } else {
            false
        }
    }

    fn coords_to_index(&self, x: u32, y: u32) -> u32 {
        x + y * self.width
    }

    fn index_to_coords(&self, index: u32) -> (u32, u32) {
        (index % self.width, index / self.width)
    }
}

#[test]
fn depth_keeps_nearest_write() {
    let mut framebuffer = Framebuffer::new(4, 4);
    assert!(framebuffer.set_depth_if_nearer(1, 1, 0.5));
    assert!(!framebuffer.set_depth_if_nearer(1, 1, 0.8));
    assert!(framebuffer.set_depth_if_nearer(1, 1, 0.2));
    assert_eq!(framebuffer.get_depth(1, 1), Some(&0.2));
}

#[test]
fn clear_resets_color_and_depth() {
    let mut framebuffer = Framebuffer::new(2, 2);
    framebuffer.set_color(0, 0, Vec3::ONE);
    framebuffer.set_depth_if_nearer(0, 0, 0.1);
    framebuffer.clear(Vec3::ZERO);
    assert_eq!(framebuffer.get_color(0, 0), Some(&Vec3::ZERO));
    assert_eq!(framebuffer.get_depth(0, 0), Some(&f32::MAX));
}
