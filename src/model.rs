pub mod error;
pub mod info;
