use facematch_vision::face::{BoundingBox, Descriptor, FaceAnalysis};
use facematch_vision::overlay::{self, Overlay};
use image::{Rgb, RgbImage};

fn face_at(x: f32, y: f32) -> FaceAnalysis {
    FaceAnalysis {
        bbox: BoundingBox {
            x,
            y,
            width: 10.0,
            height: 10.0,
        },
        score: 0.9,
        landmarks: vec![[x + 5.0, y + 5.0]],
        descriptor: Descriptor::from(vec![0.0; 4]),
        expressions: None,
        age: None,
        gender: None,
    }
}

#[test]
fn test_render_boxes_and_landmarks() {
    let faces = vec![face_at(2.0, 2.0)];
    let mut overlays = overlay::detection_boxes(&faces);
    overlays.extend(overlay::landmarks(&faces));

    let mut canvas = RgbImage::new(32, 32);
    overlay::render(&mut canvas, &overlays);

    // box edges
    assert_eq!(canvas.get_pixel(2, 2), &Rgb([0, 0, 255]));
    assert_eq!(canvas.get_pixel(11, 11), &Rgb([0, 0, 255]));
    assert_eq!(canvas.get_pixel(3, 7), &Rgb([0, 0, 255]));
    // landmark dot in the middle of the box
    assert_eq!(canvas.get_pixel(7, 7), &Rgb([0, 255, 0]));
    assert_eq!(canvas.get_pixel(8, 8), &Rgb([0, 255, 0]));
    assert_eq!(canvas.get_pixel(6, 6), &Rgb([0, 255, 0]));
    // box interior away from the dot stays untouched
    assert_eq!(canvas.get_pixel(5, 5), &Rgb([0, 0, 0]));
    // outside the box
    assert_eq!(canvas.get_pixel(20, 20), &Rgb([0, 0, 0]));
}

#[test]
fn test_match_highlight_is_four_pixels_wide() {
    let faces = vec![face_at(4.0, 4.0)];
    let overlays = overlay::match_highlights(&faces, [0]);

    let mut canvas = RgbImage::new(32, 32);
    overlay::render(&mut canvas, &overlays);

    for x in 4..8 {
        assert_eq!(canvas.get_pixel(x, 9), &Rgb([0, 128, 0]), "x={}", x);
    }
    assert_eq!(canvas.get_pixel(9, 9), &Rgb([0, 0, 0]));
}

#[test]
fn test_text_overlays_do_not_touch_pixels() {
    let overlays = vec![Overlay::Label {
        x: 1.0,
        y: 1.0,
        text: "Age: 30 | male".to_string(),
    }];
    let mut canvas = RgbImage::new(8, 8);
    overlay::render(&mut canvas, &overlays);
    assert!(canvas.pixels().all(|p| *p == Rgb([0, 0, 0])));
}
