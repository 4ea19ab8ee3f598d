pub mod artifact;
pub mod error;
pub mod frame;
pub mod upload;
