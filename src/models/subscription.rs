//! Subscription types
//!
//! Readers subscribe to journalists and publishers. The two edge kinds
//! are kept distinct because journalist targets carry a role constraint
//! that publisher targets do not.

use serde::{Deserialize, Serialize};

/// Target of a reader subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTarget {
    /// An individual journalist (the target user must have that role)
    Journalist(i64),
    /// A publisher organization
    Publisher(i64),
}

impl SubscriptionTarget {
    /// ID of the target entity, regardless of kind.
    pub fn id(&self) -> i64 {
        match self {
            SubscriptionTarget::Journalist(id) | SubscriptionTarget::Publisher(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_id() {
        assert_eq!(SubscriptionTarget::Journalist(4).id(), 4);
        assert_eq!(SubscriptionTarget::Publisher(11).id(), 11);
    }
}
