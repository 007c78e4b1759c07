pub use super::app_config::Entity as AppConfig;
pub use super::landingsplasser::Entity as Landingsplasser;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::vass_vann::Entity as VassVann;
