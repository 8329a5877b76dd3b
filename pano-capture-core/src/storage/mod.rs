pub mod directory;
pub mod file_name;
pub mod metadata;
pub mod panorama_writer;
