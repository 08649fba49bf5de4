use anyhow::Result;
use facematch_vision::overlay::{self, Overlay};
use facematch_vision::{Descriptor, DetectorOptions, FaceAnalysis, FaceAnalyzer};
use image::DynamicImage;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::matcher::{self, MatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Detection,
    Landmarks,
    Expressions,
    AgeGender,
    FaceMatch,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Detection,
        Feature::Landmarks,
        Feature::Expressions,
        Feature::AgeGender,
        Feature::FaceMatch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Detection => "detection",
            Feature::Landmarks => "landmarks",
            Feature::Expressions => "expressions",
            Feature::AgeGender => "age-gender",
            Feature::FaceMatch => "face-match",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown feature {0:?} (expected one of detection, landmarks, expressions, age-gender, face-match)")]
pub struct UnknownFeature(String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Which overlays are drawn. Everything starts off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureMode {
    pub detection: bool,
    pub landmarks: bool,
    pub expressions: bool,
    pub age_gender: bool,
    pub face_match: bool,
}

impl CaptureMode {
    fn flag(&mut self, feature: Feature) -> &mut bool {
        match feature {
            Feature::Detection => &mut self.detection,
            Feature::Landmarks => &mut self.landmarks,
            Feature::Expressions => &mut self.expressions,
            Feature::AgeGender => &mut self.age_gender,
            Feature::FaceMatch => &mut self.face_match,
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Detection => self.detection,
            Feature::Landmarks => self.landmarks,
            Feature::Expressions => self.expressions,
            Feature::AgeGender => self.age_gender,
            Feature::FaceMatch => self.face_match,
        }
    }

    /// Flip `feature`, returning its new state.
    pub fn toggle(&mut self, feature: Feature) -> bool {
        let flag = self.flag(feature);
        *flag = !*flag;
        *flag
    }

    /// The detection cycle only runs while this holds.
    pub fn any(&self) -> bool {
        Feature::ALL.into_iter().any(|f| self.is_enabled(f))
    }
}

/// Output of one detection cycle
#[derive(Debug, Clone, Default)]
pub struct Cycle {
    /// Faces in display coordinates
    pub faces: Vec<FaceAnalysis>,
    pub overlays: Vec<Overlay>,
    /// Present only when a comparison ran this cycle
    pub recognition: Option<Vec<MatchResult>>,
}

/// Capture modes, the reference face and the latest recognition results
/// around a face analyzer.
pub struct Session<A> {
    analyzer: A,
    mode: CaptureMode,
    reference: Option<Descriptor>,
    results: Option<Vec<MatchResult>>,
    threshold: f32,
    options: DetectorOptions,
    display: (u32, u32),
    interval: Duration,
}

impl<A: FaceAnalyzer> Session<A> {
    pub fn new(analyzer: A, cfg: &Config) -> Self {
        Self {
            analyzer,
            mode: CaptureMode::default(),
            reference: None,
            results: None,
            threshold: cfg.threshold,
            options: cfg.detector_options(),
            display: cfg.display_size(),
            interval: cfg.interval(),
        }
    }

    pub fn analyzer_mut(&mut self) -> &mut A {
        &mut self.analyzer
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn toggle(&mut self, feature: Feature) -> bool {
        let enabled = self.mode.toggle(feature);
        log::debug!("{} {}", feature, if enabled { "enabled" } else { "disabled" });
        enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reference(&self) -> Option<&Descriptor> {
        self.reference.as_ref()
    }

    /// Use the first face of an analysed reference image that clears the
    /// detector's score threshold. Returns false, and leaves no reference,
    /// when there is no such face.
    pub fn set_reference(&mut self, faces: &[FaceAnalysis]) -> bool {
        self.results = None;
        self.reference = faces
            .iter()
            .find(|f| f.score >= self.options.score_threshold)
            .map(|f| f.descriptor.clone());
        if self.reference.is_none() {
            log::warn!("no face found in reference image");
        }
        self.reference.is_some()
    }

    pub fn set_reference_descriptor(&mut self, descriptor: Descriptor) {
        self.results = None;
        self.reference = Some(descriptor);
    }

    pub fn clear_reference(&mut self) {
        self.results = None;
        self.reference = None;
    }

    /// Latest comparison results; kept across cycles that do not compare.
    pub fn recognition_results(&self) -> Option<&[MatchResult]> {
        self.results.as_deref()
    }

    /// One timer tick. `None` when every feature is off.
    ///
    /// Analysis failures are logged and give an empty cycle. A failed
    /// comparison is logged and only drops this cycle's recognition.
    pub fn run_cycle(&mut self, frame: &DynamicImage) -> Option<Cycle> {
        if !self.mode.any() {
            return None;
        }

        match self.detect_and_draw(frame) {
            Ok(cycle) => Some(cycle),
            Err(e) => {
                log::error!("face detection error: {:#}", e);
                Some(Cycle::default())
            }
        }
    }

    fn detect_and_draw(&mut self, frame: &DynamicImage) -> Result<Cycle> {
        let faces = self.analyzer.analyze(frame, &self.options)?;
        let source = (frame.width(), frame.height());
        let resized: Vec<FaceAnalysis> = faces
            .iter()
            .map(|f| f.resized(source, self.display))
            .collect();

        let mut overlays = Vec::new();
        if self.mode.detection {
            overlays.extend(overlay::detection_boxes(&resized));
        }
        if self.mode.landmarks {
            overlays.extend(overlay::landmarks(&resized));
        }
        if self.mode.expressions {
            overlays.extend(overlay::expressions(&resized));
        }
        if self.mode.age_gender {
            overlays.extend(overlay::age_gender(&resized));
        }

        let mut recognition = None;
        if let (true, Some(reference)) = (self.mode.face_match, self.reference.as_ref()) {
            if !faces.is_empty() {
                let candidates: Vec<Descriptor> =
                    faces.iter().map(|f| f.descriptor.clone()).collect();
                let results = match matcher::compare_descriptors(
                    reference,
                    &candidates,
                    self.threshold,
                ) {
                    Ok(results) => results,
                    Err(e) => {
                        log::error!("face match skipped: {:#}", anyhow::Error::from(e));
                        return Ok(Cycle {
                            faces: resized,
                            overlays,
                            recognition: None,
                        });
                    }
                };

                log::debug!(
                    "compared {} face(s), {} match(es)",
                    results.len(),
                    results.iter().filter(|r| r.is_match).count()
                );

                overlays.extend(overlay::match_highlights(
                    &resized,
                    results.iter().filter(|r| r.is_match).map(|r| r.index),
                ));
                self.results = Some(results.clone());
                recognition = Some(results);
            }
        }

        Ok(Cycle {
            faces: resized,
            overlays,
            recognition,
        })
    }
}
