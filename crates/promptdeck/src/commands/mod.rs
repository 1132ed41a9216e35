pub mod categories;
pub mod completion;
pub mod config;
pub mod order;
