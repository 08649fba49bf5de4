pub mod analyzer;
pub mod face;
pub mod overlay;
pub mod video;

// Re-export commonly used types
pub use analyzer::{confident_faces, DetectorOptions, FaceAnalyzer, RecordedAnalyzer};
pub use face::{euclidean_distance, Descriptor, DescriptorError, FaceAnalysis};
pub use video::{Frame, Playback};
