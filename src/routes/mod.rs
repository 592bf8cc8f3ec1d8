// src/routes/mod.rs
pub mod auth_routes;
pub mod friend_routes;
pub mod project_routes;
pub mod team_routes;
