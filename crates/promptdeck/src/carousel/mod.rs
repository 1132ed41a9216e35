pub mod gesture;
pub mod layout;
pub mod session;
