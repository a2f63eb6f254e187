pub mod statements;
pub use statements::Statement;
pub mod role_session;
pub use role_session::{PgRoleDatabase, RoleDatabase, RoleSession};
