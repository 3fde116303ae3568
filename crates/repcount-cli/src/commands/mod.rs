pub mod config;
pub mod history;
pub mod interval;
pub mod sync;
pub mod workout;
