pub mod forms;
pub mod models;
pub mod requirement;
pub mod session;
