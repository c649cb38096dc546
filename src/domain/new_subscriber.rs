use super::SubscriberEmail;
use super::SubscriberName;

/// A validated subscription, ready for dispatch.
#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub name: SubscriberName,
}
