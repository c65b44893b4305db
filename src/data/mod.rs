pub mod records;
pub mod registry;
pub mod timeline;
