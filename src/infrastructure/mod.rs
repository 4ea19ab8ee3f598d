pub mod config;
pub mod csv;
pub mod response;
pub mod storage;
pub mod xlsx;
