//End-to-end painting flow on a flat two-triangle stand-in for the face mesh.

use facepaint::engine::{Geometry, Texture};
use facepaint::math_prelude::*;
use facepaint::{Config, PickHit, PickTarget, Scene, ScriptedTracker, TrackerHandle};

//A 200 unit square facing the camera, centered on the view axis, split into
//an upper-left and a lower-right triangle.
fn square_geometry() -> Geometry {
    Geometry::new(
        vec![
            Vec3::new(-100.0, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(-100.0, -200.0, 0.0),
            Vec3::new(100.0, -200.0, 0.0),
        ],
        None,
        vec![[0, 2, 1], [2, 3, 1]],
    )
}

//Image-space landmarks matching square_geometry for a 200 pixel wide frame
fn square_landmarks(offset: Vec3) -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0) + offset,
        Vec3::new(200.0, 0.0, 0.0) + offset,
        Vec3::new(0.0, 200.0, 0.0) + offset,
        Vec3::new(200.0, 200.0, 0.0) + offset,
    ]
}

fn square_scene(script: Vec<Option<Vec<Vec3>>>) -> Scene {
    let tracker = TrackerHandle::spawn(ScriptedTracker::new(4, script));
    Scene::new(Config::new(200, 200), square_geometry(), tracker).expect("scene setup")
}

#[test]
fn tap_drag_release_undo() {
    let mut scene = square_scene(Vec::new());

    //Press lands in the upper-left triangle (pointer x mirrors)
    scene.pointer_down(Vec2::new(80.0, 60.0));
    assert_eq!(scene.surfaces().len(), 1);
    {
        let surface = scene.surfaces().iter().next().unwrap();
        assert_eq!(surface.anchor(), [0, 2, 1]);
        assert_eq!(surface.raw_points().len(), 1);
    }

    //Five drag samples extend the same gesture on the same surface
    for point in [
        Vec2::new(84.0, 60.0),
        Vec2::new(88.0, 61.0),
        Vec2::new(92.0, 62.0),
        Vec2::new(96.0, 62.0),
        Vec2::new(100.0, 63.0),
    ] {
        scene.pointer_move(point);
    }
    assert_eq!(scene.surfaces().len(), 1);
    let surface = scene.surfaces().iter().next().unwrap();
    assert_eq!(surface.raw_points().len(), 6);
    assert!(surface.canvas().pixels().iter().any(|pixel| pixel.w > 0.0));

    scene.pointer_up();
    assert!(!scene.surfaces().is_active());
    assert_eq!(scene.surfaces().len(), 1);

    //The stroke survives a frame and shows up in the render
    scene.advance(None);
    let painted = scene
        .framebuffer()
        .color()
        .filter(|(_, _, color)| color.max_element() > 0.1)
        .count();
    assert!(painted > 0);

    scene.undo();
    assert!(scene.surfaces().is_empty());
    //Undo on an empty stack is a no-op
    scene.undo();
    assert!(scene.surfaces().is_empty());
}

#[test]
fn surfaces_follow_the_tracked_mesh() {
    //First detection: the square as modeled. Second: shifted 40 pixels right.
    let script = vec![
        Some(square_landmarks(Vec3::ZERO)),
        Some(square_landmarks(Vec3::new(40.0, 0.0, 0.0))),
    ];
    let mut scene = square_scene(script);
    let video = Texture::new(8, 8);

    //Tick until the first detection arrives
    let mut ticks = 0;
    while scene.surfaces().is_empty() {
        scene.advance(Some(&video));
        std::thread::sleep(std::time::Duration::from_millis(1));
        scene.pointer_down(Vec2::new(80.0, 60.0));
        scene.pointer_up();
        ticks += 1;
        assert!(ticks < 1000, "never hit the face");
    }
    let before = scene.surfaces().iter().next().unwrap().transform().position;

    //Keep ticking until the shifted detection lands
    let mut ticks = 0;
    loop {
        scene.advance(Some(&video));
        std::thread::sleep(std::time::Duration::from_millis(1));
        let now = scene.surfaces().iter().next().unwrap().transform().position;
        if (now - before).length() > 1.0 {
            assert!((now - before - Vec3::new(40.0, 0.0, 0.0)).length() < 1e-2);
            break;
        }
        ticks += 1;
        assert!(ticks < 1000, "surface never followed the mesh");
    }
}

#[test]
fn second_stroke_paints_a_separate_surface() {
    let mut scene = square_scene(Vec::new());
    scene.pointer_down(Vec2::new(80.0, 60.0));
    scene.pointer_up();
    //Lower-right triangle: screen (60, 140) mirrors to world x = 40
    scene.pointer_down(Vec2::new(60.0, 140.0));
    scene.pointer_up();

    assert_eq!(scene.surfaces().len(), 2);
    let anchors: Vec<_> = scene.surfaces().iter().map(|s| s.anchor()).collect();
    assert_eq!(anchors, vec![[0, 2, 1], [2, 3, 1]]);
}

#[test]
fn pick_reports_mesh_then_surface() {
    let mut scene = square_scene(Vec::new());
    let point = Vec2::new(80.0, 60.0);
    let hit = facepaint::pick(point, scene.camera(), PickTarget::Mesh(scene.mesh()));
    let Some(PickHit::Mesh(mesh_hit)) = hit else {
        panic!("expected a mesh hit");
    };
    assert_eq!(mesh_hit.triangle, [0, 2, 1]);
    //Mirrored: screen x = 80 lands right of center
    assert!(mesh_hit.position.x > 0.0);

    scene.pointer_down(point);
    let surface = scene.surfaces().iter().next().unwrap();
    let hit = facepaint::pick(point, scene.camera(), PickTarget::Surface(surface));
    assert!(matches!(hit, Some(PickHit::Surface(_))));
}
