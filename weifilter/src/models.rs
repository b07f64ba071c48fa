pub mod common;
pub mod filtered_user;
pub mod user_profile;

pub use filtered_user::{FilteredUserEntry, Page};
pub use user_profile::{Scalar, UserProfile};
