use anyhow::Result;
use image::DynamicImage;
use std::collections::VecDeque;

use crate::face::FaceAnalysis;

/// Detector tuning passed through to the analyzer on every call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOptions {
    pub input_size: u32,
    pub score_threshold: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            input_size: 416,
            score_threshold: 0.5,
        }
    }
}

/// Drop faces scoring below the detector's score threshold, keeping order.
pub fn confident_faces(faces: Vec<FaceAnalysis>, options: &DetectorOptions) -> Vec<FaceAnalysis> {
    faces
        .into_iter()
        .filter(|f| f.score >= options.score_threshold)
        .collect()
}

/// Detect faces → landmarks → descriptor (+ expressions, age, gender).
///
/// Implementations wrap whatever model produces the analysis; coordinates in
/// the returned faces are relative to `frame`.
pub trait FaceAnalyzer {
    fn analyze(&mut self, frame: &DynamicImage, options: &DetectorOptions)
        -> Result<Vec<FaceAnalysis>>;
}

impl<A: FaceAnalyzer + ?Sized> FaceAnalyzer for Box<A> {
    fn analyze(
        &mut self,
        frame: &DynamicImage,
        options: &DetectorOptions,
    ) -> Result<Vec<FaceAnalysis>> {
        (**self).analyze(frame, options)
    }
}

/// Replays analysis output recorded from an external model.
///
/// Each `analyze` call consumes one queued entry regardless of the pixels.
#[derive(Debug, Default)]
pub struct RecordedAnalyzer {
    queue: VecDeque<Vec<FaceAnalysis>>,
}

impl RecordedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, faces: Vec<FaceAnalysis>) {
        self.queue.push_back(faces);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl FaceAnalyzer for RecordedAnalyzer {
    fn analyze(
        &mut self,
        _frame: &DynamicImage,
        options: &DetectorOptions,
    ) -> Result<Vec<FaceAnalysis>> {
        let faces = self
            .queue
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no recorded analysis left for frame"))?;

        let total = faces.len();
        let kept = confident_faces(faces, options);

        log::debug!(
            "recorded analysis: {} face(s), {} above score threshold {:.2}",
            total,
            kept.len(),
            options.score_threshold
        );

        Ok(kept)
    }
}
