pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod review;
pub mod storage;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use error::{Result, ReviewError};
