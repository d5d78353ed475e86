pub mod backend;
pub mod backends;
