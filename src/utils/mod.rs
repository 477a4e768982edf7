pub mod clipboard;
pub mod color;
pub mod file_size;
