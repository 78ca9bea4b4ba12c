#![doc = include_str!("../README.md")]
#![warn(
    missing_docs,
    clippy::missing_errors_doc,
    clippy::missing_docs_in_private_items,
    clippy::missing_panics_doc,
)]

pub mod bpcd;
pub mod color;
pub mod config;
pub mod error;
pub mod external;
pub mod heap;
pub mod image;
pub mod math;
pub mod noise;
pub mod rasterizer;
pub mod solver;
pub mod workers;
