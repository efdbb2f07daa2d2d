pub mod core;
pub mod error;
pub mod rights;
pub mod securitydescriptor;
pub mod utils;
