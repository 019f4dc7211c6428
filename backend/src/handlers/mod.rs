pub mod admin;
pub mod employees;
pub mod requests;

pub use admin::*;
pub use employees::*;
pub use requests::*;
