//! Domain models for the AgriScore platform

mod application;
mod evaluation;
mod farmer;
mod score;
mod weather;

pub use application::*;
pub use evaluation::*;
pub use farmer::*;
pub use score::*;
pub use weather::*;
