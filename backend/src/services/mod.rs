//! Business logic services for the AgriScore platform

pub mod application;
pub mod dashboard;
pub mod evaluation;
pub mod history;
pub mod profile;
pub mod weather;

pub use application::ApplicationService;
pub use dashboard::DashboardService;
pub use evaluation::EvaluationService;
pub use history::{Clock, ScoreHistoryService, SystemClock};
pub use profile::ProfileService;
pub use weather::WeatherService;
