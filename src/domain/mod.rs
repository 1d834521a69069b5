mod new_subscription;
mod service_name;
mod subscription;

pub use new_subscription::{parse_date, CreateSubscription, NewSubscription, ValidationError};
pub use service_name::ServiceName;
pub use subscription::Subscription;
