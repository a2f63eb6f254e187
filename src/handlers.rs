pub mod service_accounts;
pub mod scaling;
