pub mod catalog;
pub mod handlers;

pub use catalog::TemplateCatalog;
