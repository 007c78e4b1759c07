pub mod app_config;
pub mod archive;
pub mod profiles;
pub mod search;
