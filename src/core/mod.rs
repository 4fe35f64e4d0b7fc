pub mod export;
pub mod list;
pub mod log;
pub mod select;
