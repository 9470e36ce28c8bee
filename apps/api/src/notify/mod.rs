pub mod handlers;
pub mod relay;

pub use relay::{Notification, NotificationId, NotificationRelay};
