pub mod cache;
pub mod handlers;
pub mod indexers;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod settings;

pub use routes::create_router;
