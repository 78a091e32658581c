use itertools::Itertools;

use crate::math_prelude::*;

use super::bounding_box::BoundingBox;

//Fixed-resolution RGBA raster surface strokes are drawn into. Pixels are
//straight alpha, row-major from the top-left corner, and start fully
//transparent.
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Vec4>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width * height],
        }
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

    pub fn clear(&mut self) {
        self.pixels.fill(Vec4::ZERO);
    }

    //Filled disc with binary coverage.
    pub fn fill_disc(&mut self, center: Vec2, radius: f32, color: Vec4) {
        let Some(bounds) = BoundingBox::from_points_with_margin(
            &[center],
            radius + 1.0,
            self.width as u32,
            self.height as u32,
        ) else {
            return;
        };
        let radius_sq = radius * radius;
        for (y, x) in (bounds.y()..bounds.y() + bounds.height())
            .cartesian_product(bounds.x()..bounds.x() + bounds.width())
        {
            let offset = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            if offset.length_squared() <= radius_sq {
                self.pixels[x as usize + y as usize * self.width] = color;
            }
        }
    }

    //Strokes a path with uniform width. Segments are stamped as capsules,
    //which gives round caps and round joins for free.
    pub fn stroke_path(&mut self, path: &Path, width: f32, color: Vec4) {
        for (a, b) in path.points().iter().tuple_windows() {
            self.stroke_segment(*a, *b, width / 2.0, color);
        }
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2, half_width: f32, color: Vec4) {
        let Some(bounds) = BoundingBox::from_points_with_margin(
            &[a, b],
            half_width + 1.0,
            self.width as u32,
            self.height as u32,
        ) else {
            return;
        };
        let half_width_sq = half_width * half_width;
        for (y, x) in (bounds.y()..bounds.y() + bounds.height())
            .cartesian_product(bounds.x()..bounds.x() + bounds.width())
        {
            let point = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if segment_distance_sq(point, a, b) <= half_width_sq {
                self.pixels[x as usize + y as usize * self.width] = color;
            }
        }
    }

    //Nearest sample with u in [0, 1] rightward and v in [0, 1] upward, so
    //v = 1 reads the top row. Coordinates outside the range clamp.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let x = (uv.x * self.width as f32) as isize;
        let y = ((1.0 - uv.y) * self.height as f32) as isize;
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.pixels[x + y * self.width]
    }
}

//Polyline built from move/line/curve commands. Curves are flattened to line
//segments on insertion so stroking only ever deals with straight runs.
#[derive(Debug, Default)]
pub struct Path {
    points: Vec<Vec2>,
}

impl Path {
    //Flattened segment length in pixels
    const FLATTEN_STEP: f32 = 2.0;
    const MAX_FLATTEN_STEPS: usize = 128;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: Vec2) {
        self.points.push(point);
    }

    pub fn line_to(&mut self, point: Vec2) {
        self.points.push(point);
    }

    //Quadratic Bezier from the current end point. Step count scales with the
    //control polygon length so long curves stay smooth.
    pub fn quad_to(&mut self, control: Vec2, end: Vec2) {
        let Some(&start) = self.points.last() else {
            self.points.push(end);
            return;
        };
        let length = (control - start).length() + (end - control).length();
        let steps = ((length / Self::FLATTEN_STEP).ceil() as usize).clamp(2, Self::MAX_FLATTEN_STEPS);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            self.points.push(quadratic_point(start, control, end, t));
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

fn quadratic_point(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    start * (mt * mt) + control * (2.0 * mt * t) + end * (t * t)
}

fn segment_distance_sq(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq <= f32::EPSILON {
        return (point - a).length_squared();
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_covers_center_not_corners() {
        let mut canvas = Canvas::new(32, 32);
        canvas.fill_disc(Vec2::new(16.0, 16.0), 5.0, Vec4::ONE);
        assert_eq!(canvas.sample(Vec2::new(0.5, 0.5)), Vec4::ONE);
        assert_eq!(canvas.sample(Vec2::new(0.0, 0.0)), Vec4::ZERO);
        assert_eq!(canvas.sample(Vec2::new(1.0, 1.0)), Vec4::ZERO);
    }

    #[test]
    fn stroke_marks_segment_band() {
        let mut canvas = Canvas::new(64, 64);
        let mut path = Path::new();
        path.move_to(Vec2::new(8.0, 32.0));
        path.line_to(Vec2::new(56.0, 32.0));
        canvas.stroke_path(&path, 8.0, Vec4::ONE);
        //On the segment
        assert_eq!(canvas.pixels()[32 + 32 * 64], Vec4::ONE);
        //Inside the half-width band
        assert_eq!(canvas.pixels()[32 + 29 * 64], Vec4::ONE);
        //Well outside it
        assert_eq!(canvas.pixels()[32 + 8 * 64], Vec4::ZERO);
    }

    #[test]
    fn quad_flattening_lands_on_end_point() {
        let mut path = Path::new();
        path.move_to(Vec2::ZERO);
        path.quad_to(Vec2::new(10.0, 20.0), Vec2::new(20.0, 0.0));
        let last = *path.points().last().unwrap();
        assert!((last - Vec2::new(20.0, 0.0)).length() < 1e-5);
        assert!(path.points().len() > 3);
    }

    #[test]
    fn sample_maps_v_one_to_top_row() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_disc(Vec2::new(0.5, 0.5), 0.6, Vec4::ONE);
        assert_eq!(canvas.sample(Vec2::new(0.1, 0.9)), Vec4::ONE);
        assert_eq!(canvas.sample(Vec2::new(0.1, 0.1)), Vec4::ZERO);
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_disc(Vec2::new(4.0, 4.0), 3.0, Vec4::ONE);
        canvas.clear();
        assert!(canvas.pixels().iter().all(|pixel| *pixel == Vec4::ZERO));
    }
}
