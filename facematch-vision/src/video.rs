use anyhow::{Context, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analyzer::{confident_faces, DetectorOptions};
use crate::face::FaceAnalysis;

/// One frame of recorded analysis output, as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub faces: Vec<FaceAnalysis>,
}

impl RecordedFrame {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Faces of a single recorded frame, e.g. a reference photo.
pub fn load_faces(path: &Path) -> Result<Vec<FaceAnalysis>> {
    Ok(RecordedFrame::load(path)?.faces)
}

/// Faces of a recorded frame the detector would report under `options`.
pub fn load_confident_faces(path: &Path, options: &DetectorOptions) -> Result<Vec<FaceAnalysis>> {
    Ok(confident_faces(load_faces(path)?, options))
}

pub struct Frame {
    pub name: String,
    pub image: DynamicImage,
    pub faces: Vec<FaceAnalysis>,
}

/// Plays back a directory of recorded frames in file-name order.
pub struct Playback {
    paths: std::vec::IntoIter<PathBuf>,
}

impl Playback {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading recording directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        log::debug!("playback: {} frame(s) in {}", paths.len(), dir.display());

        Ok(Self {
            paths: paths.into_iter(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }

    fn read(path: &Path) -> Result<Frame> {
        let recorded = RecordedFrame::load(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let image = match sidecar_image(path) {
            Some(img_path) => {
                let img = image::open(&img_path)
                    .with_context(|| format!("decoding {}", img_path.display()))?;
                if (img.width(), img.height()) != (recorded.width, recorded.height) {
                    log::warn!(
                        "{}: image is {}x{}, recording says {}x{}",
                        name,
                        img.width(),
                        img.height(),
                        recorded.width,
                        recorded.height
                    );
                }
                img
            }
            None => DynamicImage::new_rgb8(recorded.width, recorded.height),
        };

        Ok(Frame {
            name,
            image,
            faces: recorded.faces,
        })
    }
}

impl Iterator for Playback {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(Self::read(&path))
    }
}

fn sidecar_image(path: &Path) -> Option<PathBuf> {
    ["png", "jpg", "jpeg"]
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|p| p.exists())
}
