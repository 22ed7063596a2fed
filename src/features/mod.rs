pub mod files;
pub mod home;
pub mod reporting;
