mod business;
mod dispatch_outcome;
mod notification_payload;
mod notification_request;

pub use business::{Business, Subscription, User, UNKNOWN_BUSINESS_NAME};
pub use dispatch_outcome::DispatchOutcome;
pub use notification_payload::NotificationPayload;
pub use notification_request::{NotificationRequest, OfferNotificationBody};
