mod app;
pub mod cli;
mod effects;
mod input;
mod logging;
mod ui;

pub use app::run_app;
