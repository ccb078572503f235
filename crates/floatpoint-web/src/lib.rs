//! floatpoint-web — HTTP surface for FloatPoint ocean predictions.
//! Provides:
//!   - POST /api/predict   (NLP, BGC and spatial-temporal requests)
//!   - GET/DELETE /api/queries  (caller's own query history)
//!   - Configuration loading and the shared app state

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod router;
pub mod state;
