//! Overlays drawn on top of a frame for the enabled capture features.
//!
//! Builders turn analysed faces into [`Overlay`] values; [`render`] rasterises
//! the geometric ones onto an RGB canvas. Text overlays are left to the caller
//! (see [`Overlay::text`]).

use image::{Rgb, RgbImage};
use imageproc::drawing;
use imageproc::rect::Rect;

use crate::face::{BoundingBox, FaceAnalysis};

/// Expressions below this probability are not shown
pub const MIN_EXPRESSION_CONFIDENCE: f32 = 0.1;

const BOX_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const BOX_WIDTH: u32 = 2;
const LANDMARK_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const MATCH_COLOR: Rgb<u8> = Rgb([0, 128, 0]);
const MATCH_WIDTH: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    DetectionBox {
        bbox: BoundingBox,
        score: f32,
    },
    Landmarks {
        points: Vec<[f32; 2]>,
    },
    Expressions {
        x: f32,
        y: f32,
        ranked: Vec<(&'static str, f32)>,
    },
    Label {
        x: f32,
        y: f32,
        text: String,
    },
    MatchHighlight {
        bbox: BoundingBox,
    },
}

impl Overlay {
    /// Text carried by the overlay, if any
    pub fn text(&self) -> Option<String> {
        match self {
            Overlay::DetectionBox { score, .. } => Some(format!("{:.2}", score)),
            Overlay::Expressions { ranked, .. } if !ranked.is_empty() => Some(
                ranked
                    .iter()
                    .map(|(name, p)| format!("{} ({:.2})", name, p))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Overlay::Label { text, .. } => Some(text.clone()),
            _ => None,
        }
    }
}

pub fn detection_boxes(faces: &[FaceAnalysis]) -> Vec<Overlay> {
    faces
        .iter()
        .map(|f| Overlay::DetectionBox {
            bbox: f.bbox,
            score: f.score,
        })
        .collect()
}

pub fn landmarks(faces: &[FaceAnalysis]) -> Vec<Overlay> {
    faces
        .iter()
        .filter(|f| !f.landmarks.is_empty())
        .map(|f| Overlay::Landmarks {
            points: f.landmarks.clone(),
        })
        .collect()
}

/// Ranked expressions anchored at the bottom-left corner of each box
pub fn expressions(faces: &[FaceAnalysis]) -> Vec<Overlay> {
    faces
        .iter()
        .filter_map(|f| {
            let e = f.expressions.as_ref()?;
            Some(Overlay::Expressions {
                x: f.bbox.x,
                y: f.bbox.y + f.bbox.height,
                ranked: e.ranked(MIN_EXPRESSION_CONFIDENCE),
            })
        })
        .collect()
}

/// "Age: N | gender" just above each box. Faces missing either are skipped.
pub fn age_gender(faces: &[FaceAnalysis]) -> Vec<Overlay> {
    faces
        .iter()
        .filter_map(|f| {
            let (age, gender) = (f.age?, f.gender?);
            Some(Overlay::Label {
                x: f.bbox.x,
                y: f.bbox.y - 10.0,
                text: format!("Age: {} | {}", age.round() as i64, gender),
            })
        })
        .collect()
}

/// Highlight the faces at `matched` indices; indices without a face are ignored.
pub fn match_highlights(
    faces: &[FaceAnalysis],
    matched: impl IntoIterator<Item = usize>,
) -> Vec<Overlay> {
    matched
        .into_iter()
        .filter_map(|i| faces.get(i))
        .map(|f| Overlay::MatchHighlight { bbox: f.bbox })
        .collect()
}

/// Rasterise boxes, landmarks and match highlights onto `canvas`.
pub fn render(canvas: &mut RgbImage, overlays: &[Overlay]) {
    for overlay in overlays {
        match overlay {
            Overlay::DetectionBox { bbox, .. } => stroke_rect(canvas, bbox, BOX_COLOR, BOX_WIDTH),
            Overlay::MatchHighlight { bbox } => stroke_rect(canvas, bbox, MATCH_COLOR, MATCH_WIDTH),
            Overlay::Landmarks { points } => {
                for [x, y] in points {
                    let dot = Rect::at(x.round() as i32 - 1, y.round() as i32 - 1).of_size(3, 3);
                    drawing::draw_filled_rect_mut(canvas, dot, LANDMARK_COLOR);
                }
            }
            // no font rasteriser
            Overlay::Expressions { .. } | Overlay::Label { .. } => {}
        }
    }
}

/// Outline `bbox` with `width` nested one-pixel rectangles, outermost on the box edge.
fn stroke_rect(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, width: u32) {
    let x = bbox.x.round() as i32;
    let y = bbox.y.round() as i32;
    let w = bbox.width.round().max(0.0) as u32;
    let h = bbox.height.round().max(0.0) as u32;

    for t in 0..width {
        if w <= 2 * t || h <= 2 * t {
            break;
        }
        let rect = Rect::at(x + t as i32, y + t as i32).of_size(w - 2 * t, h - 2 * t);
        drawing::draw_hollow_rect_mut(canvas, rect, color);
    }
}
