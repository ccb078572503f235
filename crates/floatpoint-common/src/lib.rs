//! floatpoint-common — Shared request, result, and error types used across all FloatPoint crates.

pub mod error;
pub mod request;
pub mod result;
pub mod region;
pub mod envelope;

// Re-export commonly used types
pub use error::ValidationError;
pub use request::{BgcInput, PredictionRequest, RequestKind, SpatialTemporalQuery};
pub use result::{BgcPrediction, PredictionResult};
pub use region::Region;
pub use envelope::PredictionEnvelope;
