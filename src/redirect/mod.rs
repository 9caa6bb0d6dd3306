pub mod handlers;
pub mod routes;

pub use handlers::visitor_from_headers;
pub use routes::create_redirect_router;
