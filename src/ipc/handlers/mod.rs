pub mod core;
pub mod profiles;
pub mod students;
