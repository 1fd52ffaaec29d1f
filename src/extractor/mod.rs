mod common;
mod ort;

pub use ort::OrtHolisticEngine;

use crate::types::{Frame, LandmarkSet};

/// Per-frame landmark extraction backend.
///
/// Implementations take `&mut self` because ONNX Runtime sessions need
/// exclusive access to run; the inference worker owns the engine.
pub trait HolisticEngine: Send + 'static {
    fn extract(&mut self, frame: &Frame) -> anyhow::Result<LandmarkSet>;
}
