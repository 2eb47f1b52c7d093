//! Document shapes persisted by the store.

pub mod category;
pub mod comment;
pub mod group;
pub mod ledger;
pub mod post;
pub mod user;

pub use category::{Category, NewCategory};
pub use comment::{Comment, NewComment, NewReply, Reply};
pub use group::{Group, NewGroup};
pub use ledger::{Follow, FollowState, Like};
pub use post::{
    MediaKind, MediaRef, NewPoll, NewPollOption, NewPost, Poll, PollOption, Post, extract_hashtags,
    validate_content,
};
pub use user::{AvatarType, College, NewUser, PersonalInfo, Role, User};
