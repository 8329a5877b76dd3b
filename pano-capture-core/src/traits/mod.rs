pub mod camera_source;
pub mod frame_surface;
pub mod panorama_delegate;
pub mod renderer;
pub mod stitching_engine;
pub mod storage;
