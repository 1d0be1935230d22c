pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod storage;
pub mod sync;
pub mod ui;
