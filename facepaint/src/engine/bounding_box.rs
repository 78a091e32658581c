use crate::math_prelude::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    //Smallest pixel box covering `points` grown by `margin` on every side,
    //clamped to a surface of `width` x `height`. None when the grown box
    //falls completely outside the surface.
    pub fn from_points_with_margin(
        points: &[Vec2],
        margin: f32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let mut min = points.first().copied()?;
        let mut max = min;
        for point in &points[1..] {
            min = min.min(*point);
            max = max.max(*point);
        }
        min -= Vec2::splat(margin);
        max += Vec2::splat(margin);
        if max.x < 0.0 || max.y < 0.0 || min.x >= width as f32 || min.y >= height as f32 {
            return None;
        }
        let left = min.x.max(0.0) as u32;
        let top = min.y.max(0.0) as u32;
        let right = (max.x.ceil() as u32).min(width - 1);
        let bottom = (max.y.ceil() as u32).min(height - 1);
        Some(Self::new(left, top, right - left + 1, bottom - top + 1))
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    //Intersection of two boxes, None when they do not touch.
    pub fn overlap(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let left = self.x.max(other.x);
        let right = (self.x + self.width).min(other.x + other.width);
        if right < left {
            return None;
        }
        let top = self.y.max(other.y);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if top > bottom {
            return None;
        }
        Some(BoundingBox::new(left, top, right - left, bottom - top))
    }
}

#[test]
fn overlap_is_the_intersection() {
    let a = BoundingBox::new(0, 0, 10, 10);
    let b = BoundingBox::new(5, 5, 10, 10);
    let common = a.overlap(&b).unwrap();
    assert_eq!(common, BoundingBox::new(5, 5, 5, 5));
    let c = BoundingBox::new(30, 30, 4, 4);
    assert!(a.overlap(&c).is_none());
}

#[test]
fn from_points_clamps_to_surface() {
    let points = [Vec2::new(-5.0, 2.0), Vec2::new(6.0, 9.0)];
    let bounds = BoundingBox::from_points_with_margin(&points, 1.0, 8, 8).unwrap();
    assert_eq!(bounds.x(), 0);
    assert_eq!(bounds.y(), 1);
    assert!(bounds.x() + bounds.width() <= 8);
    assert!(bounds.y() + bounds.height() <= 8);

    let outside = [Vec2::new(-20.0, -20.0)];
    assert!(BoundingBox::from_points_with_margin(&outside, 1.0, 8, 8).is_none());
}
