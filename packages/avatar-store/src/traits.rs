use avatar_core::{Avatar, AvatarImage, AvatarList};

use crate::error::StoreResult;

/// Durable access to avatar profiles, image metadata and the configuration
/// document. Implementations: [`AvatarStore`](crate::AvatarStore).
///
/// Every method is one independent transaction; nothing spans two calls.
pub trait AvatarStorage: Send + Sync {
    /// Upsert a profile. An empty `id` gets a fresh identifier and creation
    /// time; the stored record is returned.
    fn save_avatar(&self, avatar: Avatar) -> StoreResult<Avatar>;

    /// Fetch a profile by identifier.
    fn get_avatar(&self, id: &str) -> StoreResult<Avatar>;

    /// All stored profiles in key order, or the built-in default profile
    /// when none are stored.
    fn list_avatars(&self) -> StoreResult<Vec<Avatar>>;

    /// The first stored profile flagged as default, otherwise the built-in one.
    fn default_avatar(&self) -> StoreResult<Avatar> {
        let avatars = self.list_avatars()?;
        Ok(avatars
            .into_iter()
            .find(|avatar| avatar.is_default)
            .unwrap_or_else(|| Avatar::default_profile(crate::store::now_secs())))
    }

    /// Replace the configuration document.
    fn save_config(&self, config: &AvatarList) -> StoreResult<()>;

    /// Fetch the configuration document.
    fn get_config(&self) -> StoreResult<AvatarList>;

    /// Upsert image metadata keyed by its path.
    fn save_avatar_image(&self, image: &AvatarImage) -> StoreResult<()>;

    /// Fetch image metadata by path.
    fn get_avatar_image(&self, path: &str) -> StoreResult<AvatarImage>;

    /// All image metadata in path order. Empty if no image was ever saved.
    fn list_avatar_images(&self) -> StoreResult<Vec<AvatarImage>>;

    /// Remove image metadata. Succeeds for an absent path once any image
    /// has been saved.
    fn delete_avatar_image(&self, path: &str) -> StoreResult<()>;
}
