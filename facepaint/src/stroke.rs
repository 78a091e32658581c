use crate::engine::Path;
use crate::math_prelude::*;
use crate::scene::BrushParams;
use crate::simplify::simplify;
use crate::surface::PaintSurface;

//Appends a surface-UV point to the active gesture and re-rasterizes the
//whole stroke. Thickness, color and smoothing apply retroactively, and the
//simplified point set can change shape as input arrives, so the canvas is
//redrawn from scratch instead of composited incrementally.
pub fn append_point(surface: &mut PaintSurface, uv: Vec2, params: &BrushParams) {
    let width = surface.canvas().width() as f32;
    let height = surface.canvas().height() as f32;
    //Canvas pixels: u rightward, v = 1 on the top row
    let point = Vec2::new(uv.x * width, (1.0 - uv.y) * height);
    surface.push_raw_point(point);
    redraw(surface, params);
}

fn redraw(surface: &mut PaintSurface, params: &BrushParams) {
    let raw_len = surface.raw_points().len();
    if raw_len == 0 {
        surface.canvas_mut().clear();
        return;
    }

    //Too few points for a curve: a tap renders as a dot at the newest point
    if raw_len < 3 {
        let center = surface.raw_points()[raw_len - 1];
        let radius = params.thickness / 2.0;
        let color = params.color;
        let canvas = surface.canvas_mut();
        canvas.clear();
        canvas.fill_disc(center, radius, color);
        return;
    }

    let points = simplify(surface.raw_points(), params.smoothing);
    let mut path = Path::new();
    path.move_to(points[0]);
    //Each simplified point becomes the control of a quadratic segment ending
    //at the midpoint to its successor, which keeps the joins smooth; the
    //final segment lands exactly on the last point.
    for window in points.windows(2).take(points.len() - 2) {
        let midpoint = (window[0] + window[1]) / 2.0;
        path.quad_to(window[0], midpoint);
    }
    path.quad_to(points[points.len() - 2], points[points.len() - 1]);

    let canvas = surface.canvas_mut();
    canvas.clear();
    canvas.stroke_path(&path, params.thickness, params.color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::FaceMesh;
    use crate::engine::Geometry;
    use crate::picker::MeshHit;
    use crate::scene::Config;
    use crate::surface::SurfaceStack;

    fn stack_with_surface(config: &Config) -> SurfaceStack {
        let geometry = Geometry::new(
            vec![Vec3::new(-50.0, 0.0, 0.0), Vec3::new(50.0, 0.0, 0.0), Vec3::new(0.0, -80.0, 0.0)],
            None,
            vec![[0, 2, 1]],
        );
        let mesh = FaceMesh::new(geometry, 3, 100.0).unwrap();
        let hit = MeshHit {
            position: Vec3::ZERO,
            uv: None,
            triangle: [0, 2, 1],
            normal: Vec3::Z,
        };
        let mut stack = SurfaceStack::new();
        stack.begin_stroke(&hit, &mesh, config, &BrushParams::default());
        stack
    }

    fn painted_pixels(surface: &PaintSurface) -> usize {
        surface
            .canvas()
            .pixels()
            .iter()
            .filter(|pixel| pixel.w > 0.0)
            .count()
    }

    #[test]
    fn single_point_paints_a_dot() {
        let mut config = Config::new(100, 100);
        config.canvas_size = 64;
        let mut stack = stack_with_surface(&config);
        let surface = stack.active_surface_mut().unwrap();
        let params = BrushParams {
            thickness: 10.0,
            ..Default::default()
        };

        append_point(surface, Vec2::new(0.5, 0.5), &params);
        assert_eq!(surface.raw_points().len(), 1);
        //Center texel of a 64 canvas
        assert_eq!(surface.canvas().sample(Vec2::new(0.5, 0.5)), params.color);
        let dot = painted_pixels(surface);
        let expected_area = std::f32::consts::PI * 25.0;
        assert!((dot as f32) > expected_area * 0.6);
        assert!((dot as f32) < expected_area * 1.6);
    }

    #[test]
    fn second_point_moves_the_dot() {
        let mut config = Config::new(100, 100);
        config.canvas_size = 64;
        let mut stack = stack_with_surface(&config);
        let surface = stack.active_surface_mut().unwrap();
        let params = BrushParams::default();

        append_point(surface, Vec2::new(0.2, 0.5), &params);
        append_point(surface, Vec2::new(0.8, 0.5), &params);
        //The dot follows the newest point; the old location is erased
        assert_eq!(surface.canvas().sample(Vec2::new(0.8, 0.5)), params.color);
        assert_eq!(surface.canvas().sample(Vec2::new(0.2, 0.5)), Vec4::ZERO);
    }

    #[test]
    fn three_points_draw_a_connected_stroke() {
        let mut config = Config::new(100, 100);
        config.canvas_size = 64;
        let mut stack = stack_with_surface(&config);
        let surface = stack.active_surface_mut().unwrap();
        let params = BrushParams {
            thickness: 6.0,
            ..Default::default()
        };

        append_point(surface, Vec2::new(0.2, 0.5), &params);
        append_point(surface, Vec2::new(0.5, 0.5), &params);
        append_point(surface, Vec2::new(0.8, 0.5), &params);
        //Both endpoints and the middle of the run are painted
        assert_eq!(surface.canvas().sample(Vec2::new(0.2, 0.5)), params.color);
        assert_eq!(surface.canvas().sample(Vec2::new(0.5, 0.5)), params.color);
        assert_eq!(surface.canvas().sample(Vec2::new(0.8, 0.5)), params.color);
    }

    #[test]
    fn thickness_applies_to_the_whole_stroke() {
        let mut config = Config::new(100, 100);
        config.canvas_size = 64;
        let mut stack = stack_with_surface(&config);
        let surface = stack.active_surface_mut().unwrap();

        let thin = BrushParams {
            thickness: 4.0,
            ..Default::default()
        };
        append_point(surface, Vec2::new(0.2, 0.5), &thin);
        append_point(surface, Vec2::new(0.5, 0.5), &thin);
        append_point(surface, Vec2::new(0.8, 0.5), &thin);
        let thin_pixels = painted_pixels(surface);

        //Widen the brush mid-gesture: the next point redraws everything
        let thick = BrushParams {
            thickness: 12.0,
            ..Default::default()
        };
        append_point(surface, Vec2::new(0.8, 0.6), &thick);
        let thick_pixels = painted_pixels(surface);
        assert!(thick_pixels > thin_pixels * 2);
    }
}
