use crate::math_prelude::*;

//Ramer-Douglas-Peucker polyline simplification. Keeps the first and last
//point and drops interior points that stay within `tolerance` of the
//simplified shape. Deterministic, and running it again on its own output
//with the same tolerance changes nothing.
pub fn simplify(points: &[Vec2], tolerance: f32) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let sq_tolerance = tolerance * tolerance;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    split(points, 0, points.len() - 1, sq_tolerance, &mut keep);
    points
        .iter()
        .zip(keep)
        .filter_map(|(point, keep)| keep.then_some(*point))
        .collect()
}

//Marks the farthest interior point from the chord when it exceeds the
//tolerance, then recurses into both halves.
fn split(points: &[Vec2], first: usize, last: usize, sq_tolerance: f32, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }
    let mut max_sq_dist = sq_tolerance;
    let mut farthest = first;
    for index in first + 1..last {
        let sq_dist = segment_distance_sq(points[index], points[first], points[last]);
        if sq_dist > max_sq_dist {
            max_sq_dist = sq_dist;
            farthest = index;
        }
    }
    if farthest > first {
        keep[farthest] = true;
        split(points, first, farthest, sq_tolerance, keep);
        split(points, farthest, last, sq_tolerance, keep);
    }
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

    fn wiggly_line() -> Vec<Vec2> {
        (0..40)
            .map(|i| {
                let x = i as f32 * 2.0;
                //Small wiggle under the tolerance plus one real feature
                let y = (i as f32 * 0.7).sin() * 0.4 + if i == 20 { 15.0 } else { 0.0 };
                Vec2::new(x, y)
            })
            .collect()
    }

    #[test]
    fn keeps_endpoints() {
        let points = wiggly_line();
        let simplified = simplify(&points, 1.5);
        assert_eq!(simplified.first(), points.first());
        assert_eq!(simplified.last(), points.last());
    }

    #[test]
    fn drops_noise_keeps_features() {
        let points = wiggly_line();
        let simplified = simplify(&points, 1.5);
        assert!(simplified.len() < points.len());
        //The spike at x = 40 survives
        assert!(simplified
            .iter()
            .any(|p| (p.x - 40.0).abs() < 1e-5 && p.y > 10.0));
    }

    #[test]
    fn is_idempotent() {
        let points = wiggly_line();
        let once = simplify(&points, 1.5);
        let twice = simplify(&once, 1.5);
        assert_eq!(once, twice);
    }

    #[test]
    fn short_input_is_returned_unchanged() {
        let two = vec![Vec2::ZERO, Vec2::new(3.0, 3.0)];
        assert_eq!(simplify(&two, 1.5), two);
        assert!(simplify(&[], 1.5).is_empty());
    }

    #[test]
    fn collinear_interior_points_collapse() {
        let points: Vec<Vec2> = (0..10).map(|i| Vec2::new(i as f32, i as f32)).collect();
        let simplified = simplify(&points, 0.5);
        assert_eq!(simplified.len(), 2);
    }
}
