pub mod config;
pub mod matcher;
pub mod session;
pub mod storage;

// Re-export vision types for convenience
pub use facematch_vision::{face, overlay, video, Descriptor, FaceAnalysis, FaceAnalyzer};
pub use matcher::{compare_descriptors, MatchError, MatchResult};
pub use session::{CaptureMode, Cycle, Feature, Session};
