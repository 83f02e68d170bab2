//! Rule aggregate, lifecycle and notifications.

pub mod classification;
pub mod entity;
pub mod notification;
pub mod status;

pub use classification::{BalanceType, ProfileType};
pub use entity::{Mutation, NewRule, RuleEntity, RuleRecord};
pub use notification::{EventType, Notification, NotificationLog};
pub use status::RuleStatus;
