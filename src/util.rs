pub mod path;
pub mod translate;
