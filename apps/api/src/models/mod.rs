pub mod record;
pub mod status;
pub mod template;
