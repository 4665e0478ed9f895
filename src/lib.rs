#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod comments;
pub mod composer;
pub mod config;
pub mod data;
pub mod feed;
pub mod logging;
pub mod model;
pub mod render;
pub mod richtext;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
