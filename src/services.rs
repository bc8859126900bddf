pub mod auth;
pub mod catalog_service;
pub mod member_service;
pub mod plan;
pub mod provisioning;
