pub mod import;
pub mod sessions;
