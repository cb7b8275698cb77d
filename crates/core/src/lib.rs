pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod services;
pub mod session;
pub mod view;

pub use client::ApiClient;
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use model::*;
pub use services::{AuthService, IntegrationCatalog, IntegrationsService, TasksService, UserService};
pub use session::{Session, SessionStore};
pub use view::{TaskFilter, TaskQuery, TasksView};
