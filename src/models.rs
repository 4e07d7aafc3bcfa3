pub mod app;
pub mod auth;
pub mod membership;
pub mod organization;
pub mod query;
pub mod resource;
pub mod screen;
pub mod source_file;
