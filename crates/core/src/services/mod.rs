pub mod classify;
pub mod details;
pub mod diffkemp;
pub mod runner;
pub mod summary;
pub mod sweep;
pub mod tool;

pub use diffkemp::DiffKempTool;
