pub mod app_service;
pub mod auth;
pub mod authorizer;
pub mod child_service;
pub mod cross_reference;
pub mod membership_service;
pub mod organization_service;
pub mod query_service;
pub mod resource_service;
pub mod screen_service;
pub mod soft_delete;
pub mod source_file_service;
pub mod transaction;
