use crate::math_prelude::*;

//RGBA image used for incoming video frames. The payload can be rewritten in
//place every frame; dimensions are fixed at construction.
#[derive(Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<Vec4>,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::new(0.0, 0.0, 0.0, 1.0); width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Vec4>) -> Self {
        assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    //Replaces the payload. The incoming frame must keep the same dimensions.
    pub fn update(&mut self, pixels: &[Vec4]) {
        assert_eq!(pixels.len(), self.pixels.len());
        self.pixels.copy_from_slice(pixels);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn color_at(&self, x: usize, y: usize) -> Vec4 {
        self.pixels[(x % self.width) + (y % self.height) * self.width]
    }

    //Nearest sample; v = 1 reads the top row.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let x = (uv.x * self.width as f32) as usize % self.width;
        let y = ((1.0 - uv.y) * self.height as f32) as usize % self.height;
        self.color_at(x, y)
    }
}

#[test]
fn sample_reads_top_row_at_v_one() {
    let mut pixels = vec![Vec4::ZERO; 4];
    pixels[0] = Vec4::ONE;
    let texture = Texture::from_pixels(2, 2, pixels);
    assert_eq!(texture.sample(Vec2::new(0.1, 0.9)), Vec4::ONE);
    assert_eq!(texture.sample(Vec2::new(0.9, 0.1)), Vec4::ZERO);
}

#[test]
fn update_replaces_payload() {
    let mut texture = Texture::new(2, 1);
    texture.update(&[Vec4::ONE, Vec4::ZERO]);
    assert_eq!(texture.color_at(0, 0), Vec4::ONE);
    assert_eq!(texture.color_at(1, 0), Vec4::ZERO);
}
