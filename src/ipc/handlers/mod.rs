pub mod core;
pub mod evaluations;
pub mod reports;
pub mod session;
pub mod students;
