pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;

pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedUser};
pub use routes::AuthSettings;
