pub mod dynamodb_repository;
pub mod memory_repository;
pub mod models;
pub mod user_repository;

pub use dynamodb_repository::DynamoDbUserRepository;
pub use memory_repository::InMemoryUserRepository;
pub use models::{NewUser, User};
pub use user_repository::{RepositoryError, UserRepository};
