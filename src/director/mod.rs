pub mod chunks;
pub mod enums;
pub mod error;
pub mod file;
pub mod movie;
pub mod rifx;
pub mod utils;
