pub mod auth_extractor;
pub mod route_guard;
