use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Face descriptor (identity embedding) produced by the recognition model.
///
/// Serialized as a plain array of floats so recorded frames stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f32>", into = "Vec<f32>")]
pub struct Descriptor {
    pub vector: Array1<f32>,
}

impl Descriptor {
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self {
            vector: Array1::from(values),
        }
    }
}

impl From<Descriptor> for Vec<f32> {
    fn from(descriptor: Descriptor) -> Self {
        descriptor.vector.to_vec()
    }
}

/// Face bounding box in pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

/// Expression probabilities, one per class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expressions {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl Expressions {
    /// Expressions with probability above `min_confidence`, most likely first.
    pub fn ranked(&self, min_confidence: f32) -> Vec<(&'static str, f32)> {
        let mut ranked: Vec<(&'static str, f32)> = [
            ("neutral", self.neutral),
            ("happy", self.happy),
            ("sad", self.sad),
            ("angry", self.angry),
            ("fearful", self.fearful),
            ("disgusted", self.disgusted),
            ("surprised", self.surprised),
        ]
        .into_iter()
        .filter(|(_, p)| *p > min_confidence)
        .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Everything the analyzer reports for one face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAnalysis {
    pub bbox: BoundingBox,
    pub score: f32,
    #[serde(default)]
    pub landmarks: Vec<[f32; 2]>,
    pub descriptor: Descriptor,
    #[serde(default)]
    pub expressions: Option<Expressions>,
    #[serde(default)]
    pub age: Option<f32>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl FaceAnalysis {
    /// Map box and landmarks from analysis coordinates (`from`) to display
    /// coordinates (`to`).
    pub fn resized(&self, from: (u32, u32), to: (u32, u32)) -> Self {
        if from.0 == 0 || from.1 == 0 {
            return self.clone();
        }
        let sx = to.0 as f32 / from.0 as f32;
        let sy = to.1 as f32 / from.1 as f32;

        Self {
            bbox: self.bbox.scaled(sx, sy),
            landmarks: self
                .landmarks
                .iter()
                .map(|[x, y]| [x * sx, y * sy])
                .collect(),
            ..self.clone()
        }
    }
}

/// Euclidean distance between two descriptors of the same dimension
pub fn euclidean_distance(a: &Descriptor, b: &Descriptor) -> Result<f32, DescriptorError> {
    if a.len() != b.len() {
        return Err(DescriptorError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let sum: f32 = a
        .vector
        .iter()
        .zip(b.vector.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum();

    Ok(sum.sqrt())
}
