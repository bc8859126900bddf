pub mod auth;
pub mod catalog;
pub mod member;
pub mod tenancy;
