// The binary in main.rs drives the terminal; everything it needs lives here so
// integration tests and benchmarks can reach it as `dlquiz::...`.

pub mod app;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod logging;
pub mod session;
pub mod ui;
