//! Avatar Core — profile, display-state, image and configuration types shared
//! by the record store and its callers.

pub mod types;

pub use types::{
    Avatar, AvatarImage, AvatarList, AvatarState, AVATAR_ASSETS_DIR, DEFAULT_AVATAR_ID,
};
