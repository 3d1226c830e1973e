// Text embedding — local sentence-transformer inference.

pub mod download;
pub mod onnx;
pub mod traits;
