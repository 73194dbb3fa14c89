//! Query Handlers 实现

mod result_handlers;

pub use result_handlers::*;
