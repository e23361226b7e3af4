pub mod audio;
pub mod config;
pub mod event;
pub mod http;
pub mod session;
pub mod storage;
pub mod ui;
pub mod util;
