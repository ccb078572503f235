//! floatpoint-inference — Remote model inference layer.
//! Implements the InferenceBackend trait against a Gradio-hosted model space
//! and normalises its replies into stable shapes.

pub mod backend;
pub mod gradio;
pub mod normalise;

pub use backend::{InferenceBackend, InferenceError, LabelledValues, NlReply};
pub use gradio::{GradioBackend, GradioEndpoints};
