//! Command Handlers 实现

mod upload_handlers;

pub use upload_handlers::*;
