//! Social network models

pub mod follow;
pub mod post;
pub mod profile;
pub mod user;

// Re-export for convenience
pub use follow::{FollowPolicy, FollowState};
pub use post::{FeedPost, ImageChange, NewPost, Post, UpdatePost};
pub use profile::{DEFAULT_PROFILE_PICTURE, Follower, Profile, ProfileCard, UpdateProfile};
pub use user::{AuthUser, LoginCredentials, NewUser, User};
