pub mod ambient;
pub mod card;
pub mod chrome;
pub mod transition;
