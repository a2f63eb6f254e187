pub mod account_service;
pub use account_service::AccountService;
pub mod scaling_service;
pub use scaling_service::ScalingService;
pub mod log_emitter;
