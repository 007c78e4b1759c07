pub mod prelude;

pub mod app_config;
pub mod landingsplasser;
pub mod user_profiles;
pub mod vass_vann;
