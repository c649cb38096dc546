mod intent;
mod new_subscriber;
mod subscriber_email;
mod subscriber_name;
mod subscription_request;
mod subscription_result;
// allow external `use` statements to skip `new_subscriber` etc
pub use intent::contains_crisis_keywords;
pub use intent::Intent;
pub use new_subscriber::NewSubscriber;
pub use subscriber_email::trim_input;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_name::SubscriberName;
pub use subscription_request::Rejection;
pub use subscription_request::RequestBodyError;
pub use subscription_request::SubscriptionRequest;
pub use subscription_result::SubscriptionResult;
