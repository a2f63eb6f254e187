pub mod error;
pub mod password;
