pub mod apps;
pub mod auth;
pub mod controllers;
pub mod members;
pub mod organizations;
pub mod queries;
pub mod resources;
pub mod screens;
