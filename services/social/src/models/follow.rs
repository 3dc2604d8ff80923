//! Follow edge state and policy

use serde::Serialize;
use std::{fmt, str::FromStr};

/// State of one follower → followee pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FollowState {
    NotFollowing,
    Following,
}

impl FollowState {
    pub fn from_following(following: bool) -> Self {
        if following {
            FollowState::Following
        } else {
            FollowState::NotFollowing
        }
    }

    /// The state a toggle moves to
    pub fn toggled(self) -> Self {
        match self {
            FollowState::NotFollowing => FollowState::Following,
            FollowState::Following => FollowState::NotFollowing,
        }
    }

    pub fn is_following(self) -> bool {
        self == FollowState::Following
    }
}

/// Whether users may follow their own profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowPolicy {
    Allow,
    #[default]
    Forbid,
}

impl FromStr for FollowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(FollowPolicy::Allow),
            "forbid" => Ok(FollowPolicy::Forbid),
            other => Err(format!(
                "unknown self-follow policy '{other}', expected 'allow' or 'forbid'"
            )),
        }
    }
}

impl fmt::Display for FollowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowPolicy::Allow => write!(f, "allow"),
            FollowPolicy::Forbid => write!(f, "forbid"),
        }
    }
}
