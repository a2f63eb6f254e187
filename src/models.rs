pub mod privileges;
pub mod service_account;
pub mod scaling;
pub mod log_record;
