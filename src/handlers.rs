pub mod auth;
pub mod catalog;
pub mod masks;
pub mod members;
