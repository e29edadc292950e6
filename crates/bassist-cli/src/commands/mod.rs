pub mod auth;
pub mod config;
pub mod integrations;
pub mod oauth_result;
pub mod providers;
