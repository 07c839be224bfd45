pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod lexicon;
pub mod logging;
pub mod ports;
pub mod utils;

pub use config::Config;
