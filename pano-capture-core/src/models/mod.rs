pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod mosaic;
pub mod panorama;
pub mod progress;
pub mod state;
