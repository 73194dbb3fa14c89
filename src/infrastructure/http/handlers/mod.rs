//! HTTP Handlers

mod ping;
mod results;
mod upload;

pub use ping::*;
pub use results::*;
pub use upload::*;
