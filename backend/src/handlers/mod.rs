//! HTTP request handlers

pub mod application;
pub mod dashboard;
pub mod evaluation;
pub mod health;
pub mod profile;
pub mod score;
pub mod weather;

pub use application::*;
pub use dashboard::*;
pub use evaluation::*;
pub use health::*;
pub use profile::*;
pub use score::*;
pub use weather::*;
