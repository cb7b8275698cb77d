pub mod auth;
pub mod integrations;
pub mod tasks;
pub mod user;

pub use auth::AuthService;
pub use integrations::{IntegrationCatalog, IntegrationsService, Provider};
pub use tasks::TasksService;
pub use user::UserService;
