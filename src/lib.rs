pub mod charts;
pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod map;
pub mod pipeline;
pub mod preprocess;
pub mod records;
pub mod snapshot;
