pub mod jpeg;
pub mod mosaic_buffer;
pub mod nv21;
pub mod sweep;
