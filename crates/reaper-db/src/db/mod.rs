//! Database repositories for data access layer
//!
//! `upload` covers the uploads table and the orphan scan over the tables that
//! reference it. `site_setting` reads the forum's `site_settings` table.

pub mod site_setting;
pub mod upload;

pub use site_setting::SiteSettingRepository;
pub use upload::{UploadRepository, UploadRow};
