//! Synthesis Context - 远程语音合成限界上下文

mod value_objects;

pub use value_objects::{SynthesisParams, SynthesisResult};
