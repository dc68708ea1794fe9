pub mod file;
pub mod manager;
pub mod memory;
