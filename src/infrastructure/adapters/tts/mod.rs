//! TTS Adapter - 远程合成客户端实现

mod fake_synthesis_engine;
mod gradio_tts_client;

pub use fake_synthesis_engine::{FakeSynthesisEngine, FakeSynthesisEngineConfig};
pub use gradio_tts_client::*;
