pub mod config;
pub mod debugger;

pub mod buffer;
pub mod storage;
