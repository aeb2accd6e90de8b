#![forbid(unsafe_code)]

pub mod build;
pub mod cli;
pub mod config;
pub mod deck;
pub mod error;
pub mod formats;
pub mod ids;
pub mod images;
pub mod logging;
pub mod mapping;
pub mod normalize;
pub mod package;
pub mod scan;
pub mod summary;
