//! Typed record store over a [`KeyspaceEngine`].
//!
//! [`AvatarStore`] turns domain values into JSON documents and back, assigns
//! identifiers to new profiles, and synthesizes the default profile when the
//! avatars keyspace is empty.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use avatar_core::{Avatar, AvatarImage, AvatarList};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{StoreConfig, CONFIG_KEY};
use crate::engine::KeyspaceEngine;
use crate::error::{StoreError, StoreResult};
use crate::traits::AvatarStorage;

/// Returns the current wall-clock time as seconds since the Unix epoch.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn generate_avatar_id() -> String {
    format!("avatar_{}", Uuid::new_v4().simple())
}

fn decode<T: DeserializeOwned>(keyspace: &str, key: &str, bytes: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(bytes).map_err(|source| {
        warn!(
            keyspace,
            key,
            payload = %String::from_utf8_lossy(bytes),
            error = %source,
            "stored record failed to decode"
        );
        StoreError::Decode {
            keyspace: keyspace.to_string(),
            key: key.to_string(),
            source,
        }
    })
}

/// Record store for avatar profiles, image metadata and configuration.
///
/// Holds a shared engine handle; it never opens or closes the underlying
/// database. Cheap to share behind `Arc` across threads.
pub struct AvatarStore {
    engine: Arc<dyn KeyspaceEngine>,
    config: StoreConfig,
}

impl AvatarStore {
    /// Creates a store using the default keyspace names.
    #[must_use]
    pub fn new(engine: Arc<dyn KeyspaceEngine>) -> Self {
        Self::with_config(engine, StoreConfig::default())
    }

    /// Creates a store with explicit keyspace names.
    #[must_use]
    pub fn with_config(engine: Arc<dyn KeyspaceEngine>, config: StoreConfig) -> Self {
        Self { engine, config }
    }

    /// Keyspace names in use.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn put_record<T: Serialize>(
        &self,
        keyspace: &str,
        key: &str,
        kind: &'static str,
        record: &T,
    ) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec(record).map_err(|source| StoreError::Encode { kind, source })?;
        self.engine.put(keyspace, key, &bytes)?;
        debug!(keyspace, key, kind, bytes = bytes.len(), "stored record");
        Ok(())
    }

    fn get_record<T: DeserializeOwned>(&self, keyspace: &str, key: &str) -> StoreResult<T> {
        let bytes = self
            .engine
            .get(keyspace, key)?
            .ok_or_else(|| StoreError::not_found(keyspace, key))?;
        decode(keyspace, key, &bytes)
    }
}

impl AvatarStorage for AvatarStore {
    fn save_avatar(&self, mut avatar: Avatar) -> StoreResult<Avatar> {
        if avatar.is_new() {
            avatar.id = generate_avatar_id();
            avatar.created_at = now_secs();
        }
        self.put_record(&self.config.avatars_keyspace, &avatar.id, "avatar", &avatar)?;
        Ok(avatar)
    }

    fn get_avatar(&self, id: &str) -> StoreResult<Avatar> {
        self.get_record(&self.config.avatars_keyspace, id)
    }

    fn list_avatars(&self) -> StoreResult<Vec<Avatar>> {
        let keyspace = self.config.avatars_keyspace.as_str();
        let mut avatars: Vec<Avatar> = Vec::new();

        let scan = self.engine.for_each(keyspace, &mut |key, value| {
            // Older databases kept the configuration document here.
            if key == CONFIG_KEY {
                return Ok(());
            }
            avatars.push(decode(keyspace, key, value)?);
            Ok(())
        });
        match scan {
            Ok(()) | Err(StoreError::KeyspaceNotFound { .. }) => {}
            Err(err) => return Err(err),
        }

        if avatars.is_empty() {
            debug!(keyspace, "no stored avatars, returning built-in default");
            avatars.push(Avatar::default_profile(now_secs()));
        }
        Ok(avatars)
    }

    fn save_config(&self, config: &AvatarList) -> StoreResult<()> {
        self.put_record(&self.config.config_keyspace, CONFIG_KEY, "config", config)
    }

    fn get_config(&self) -> StoreResult<AvatarList> {
        self.get_record(&self.config.config_keyspace, CONFIG_KEY)
    }

    fn save_avatar_image(&self, image: &AvatarImage) -> StoreResult<()> {
        self.put_record(&self.config.images_keyspace, &image.path, "image", image)
    }

    fn get_avatar_image(&self, path: &str) -> StoreResult<AvatarImage> {
        self.get_record(&self.config.images_keyspace, path)
    }

    fn list_avatar_images(&self) -> StoreResult<Vec<AvatarImage>> {
        let keyspace = self.config.images_keyspace.as_str();
        let mut images: Vec<AvatarImage> = Vec::new();

        let scan = self.engine.for_each(keyspace, &mut |key, value| {
            images.push(decode(keyspace, key, value)?);
            Ok(())
        });
        match scan {
            Ok(()) | Err(StoreError::KeyspaceNotFound { .. }) => Ok(images),
            Err(err) => Err(err),
        }
    }

    fn delete_avatar_image(&self, path: &str) -> StoreResult<()> {
        let keyspace = self.config.images_keyspace.as_str();
        let removed = self.engine.delete(keyspace, path)?;
        debug!(keyspace, key = path, removed, "deleted record");
        Ok(())
    }
}

#[cfg(all(test, feature = "redb"))]
mod tests {
    use std::collections::HashSet;

    use avatar_core::{AvatarState, DEFAULT_AVATAR_ID};
    use proptest::prelude::*;

    use super::*;
    use crate::engines::{MemoryEngine, RedbEngine};

    fn make_store() -> AvatarStore {
        AvatarStore::new(Arc::new(RedbEngine::in_memory().unwrap()))
    }

    fn make_avatar(name: &str) -> Avatar {
        Avatar::new(name, format!("{name} avatar"))
            .with_state(AvatarState::Idle, format!("/avatars/{name}/idle.png"))
            .with_state(AvatarState::Talking, format!("/avatars/{name}/talking.gif"))
    }

    fn make_image(path: &str) -> AvatarImage {
        AvatarImage {
            path: path.to_string(),
            name: "robot.png".to_string(),
            content_type: "image/png".to_string(),
            size_bytes: 2048,
            width: Some(256),
            height: Some(256),
            uploaded_at: 1_700_000_000,
        }
    }

    // --- Avatars ---

    #[test]
    fn save_new_avatar_assigns_id_and_creation_time() {
        let store = make_store();
        let avatar = make_avatar("robot");

        let saved = store.save_avatar(avatar.clone()).unwrap();
        assert!(!saved.id.is_empty());
        assert!(saved.id.starts_with("avatar_"));
        assert!(saved.created_at > 0);

        let fetched = store.get_avatar(&saved.id).unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(fetched.name, avatar.name);
        assert_eq!(fetched.description, avatar.description);
        assert_eq!(fetched.states, avatar.states);
        assert_eq!(fetched.is_default, avatar.is_default);
    }

    #[test]
    fn new_avatars_get_distinct_ids() {
        let store = make_store();
        let a = store.save_avatar(make_avatar("a")).unwrap();
        let b = store.save_avatar(make_avatar("a")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn save_existing_avatar_keeps_id_and_creation_time() {
        let store = make_store();
        let mut saved = store.save_avatar(make_avatar("robot")).unwrap();
        let id = saved.id.clone();
        let created_at = saved.created_at;

        saved.name = "Renamed".to_string();
        saved.is_default = true;
        let updated = store.save_avatar(saved).unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.created_at, created_at);

        let fetched = store.get_avatar(&id).unwrap();
        assert_eq!(fetched.name, "Renamed");
        assert!(fetched.is_default);

        let listed = store.list_avatars().unwrap();
        assert_eq!(listed.len(), 1, "upsert must not append");
    }

    #[test]
    fn get_avatar_distinguishes_missing_keyspace_and_key() {
        let store = make_store();
        let err = store.get_avatar("avatar_x").unwrap_err();
        assert!(matches!(err, StoreError::KeyspaceNotFound { .. }));

        store.save_avatar(make_avatar("robot")).unwrap();
        let err = store.get_avatar("avatar_x").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref key, .. } if key == "avatar_x"));
    }

    #[test]
    fn get_avatar_reports_corrupt_record() {
        let engine = Arc::new(MemoryEngine::new());
        engine.put("avatars", "avatar_bad", b"{not json").unwrap();
        let store = AvatarStore::new(engine);

        let err = store.get_avatar("avatar_bad").unwrap_err();
        assert!(err.is_corrupt());
        assert!(!err.is_not_found());
    }

    #[test]
    fn list_avatars_on_fresh_store_returns_default() {
        let store = make_store();
        let avatars = store.list_avatars().unwrap();
        assert_eq!(avatars.len(), 1);
        let default = &avatars[0];
        assert!(default.is_default);
        assert!(!default.name.is_empty());
        assert_eq!(default.id, DEFAULT_AVATAR_ID);
        assert!(default.created_at > 0);
        assert_eq!(default.states.len(), 2);
    }

    #[test]
    fn listed_default_is_not_persisted() {
        let store = make_store();
        store.list_avatars().unwrap();
        let err = store.get_avatar(DEFAULT_AVATAR_ID).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn list_avatars_returns_stored_records_only() {
        let store = make_store();
        let a = store.save_avatar(make_avatar("a")).unwrap();
        let b = store.save_avatar(make_avatar("b")).unwrap();

        let listed = store.list_avatars().unwrap();
        assert_eq!(listed.len(), 2);
        let ids: HashSet<_> = listed.iter().map(|a| a.id.clone()).collect();
        assert!(ids.contains(&a.id));
        assert!(ids.contains(&b.id));
        assert!(listed.iter().all(|a| !a.is_default));
    }

    #[test]
    fn list_avatars_ignores_config_document() {
        let store = make_store();
        store.save_config(&AvatarList::default()).unwrap();
        let saved = store.save_avatar(make_avatar("robot")).unwrap();

        let listed = store.list_avatars().unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[test]
    fn list_avatars_skips_legacy_config_key() {
        let engine = Arc::new(MemoryEngine::new());
        engine
            .put("avatars", CONFIG_KEY, br#"{"avatars":[]}"#)
            .unwrap();
        let store = AvatarStore::new(engine);

        // Only the legacy config entry is present, so the default is synthesized.
        let listed = store.list_avatars().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, DEFAULT_AVATAR_ID);
    }

    #[test]
    fn list_avatars_fails_on_any_corrupt_record() {
        let engine = Arc::new(MemoryEngine::new());
        let store = AvatarStore::new(engine.clone());
        store.save_avatar(make_avatar("good")).unwrap();
        engine.put("avatars", "avatar_zzz", b"/avatars/x.png").unwrap();

        let err = store.list_avatars().unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "avatar_zzz"));
    }

    #[test]
    fn default_avatar_prefers_flagged_record() {
        let store = make_store();
        assert_eq!(store.default_avatar().unwrap().id, DEFAULT_AVATAR_ID);

        store.save_avatar(make_avatar("plain")).unwrap();
        assert_eq!(store.default_avatar().unwrap().id, DEFAULT_AVATAR_ID);

        let mut flagged = make_avatar("flagged");
        flagged.is_default = true;
        let flagged = store.save_avatar(flagged).unwrap();
        assert_eq!(store.default_avatar().unwrap(), flagged);
    }

    // --- Config ---

    #[test]
    fn get_config_before_save_is_not_found() {
        let store = make_store();
        let err = store.get_config().unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_corrupt());

        // Avatars existing does not create the config keyspace.
        store.save_avatar(make_avatar("robot")).unwrap();
        assert!(store.get_config().unwrap_err().is_not_found());
    }

    #[test]
    fn config_round_trip_and_overwrite() {
        let store = make_store();
        let robot = store.save_avatar(make_avatar("robot")).unwrap();
        let config = AvatarList {
            active_avatar_id: Some(robot.id.clone()),
            avatars: vec![robot.clone()],
        };
        store.save_config(&config).unwrap();
        assert_eq!(store.get_config().unwrap(), config);

        let cleared = AvatarList::default();
        store.save_config(&cleared).unwrap();
        assert_eq!(store.get_config().unwrap(), cleared);
    }

    // --- Images ---

    #[test]
    fn image_round_trip_and_overwrite() {
        let store = make_store();
        let image = make_image("/avatars/robot.png");
        store.save_avatar_image(&image).unwrap();
        assert_eq!(store.get_avatar_image(&image.path).unwrap(), image);

        let mut resized = image.clone();
        resized.width = Some(128);
        resized.size_bytes = 1024;
        store.save_avatar_image(&resized).unwrap();
        assert_eq!(store.get_avatar_image(&image.path).unwrap(), resized);
        assert_eq!(store.list_avatar_images().unwrap().len(), 1);
    }

    #[test]
    fn get_image_distinguishes_missing_keyspace_and_key() {
        let store = make_store();
        let err = store.get_avatar_image("/avatars/a.png").unwrap_err();
        assert!(matches!(err, StoreError::KeyspaceNotFound { .. }));

        store.save_avatar_image(&make_image("/avatars/b.png")).unwrap();
        let err = store.get_avatar_image("/avatars/a.png").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn list_images_without_keyspace_is_empty() {
        let store = make_store();
        assert!(store.list_avatar_images().unwrap().is_empty());
    }

    #[test]
    fn list_images_in_path_order() {
        let store = make_store();
        for path in ["/avatars/c.png", "/avatars/a.png", "/avatars/b.png"] {
            store.save_avatar_image(&make_image(path)).unwrap();
        }
        let paths: Vec<_> = store
            .list_avatar_images()
            .unwrap()
            .into_iter()
            .map(|image| image.path)
            .collect();
        assert_eq!(paths, vec!["/avatars/a.png", "/avatars/b.png", "/avatars/c.png"]);
    }

    #[test]
    fn list_images_fails_on_corrupt_record() {
        let engine = Arc::new(MemoryEngine::new());
        let store = AvatarStore::new(engine.clone());
        store.save_avatar_image(&make_image("/avatars/a.png")).unwrap();
        engine.put("avatar_images", "/avatars/b.png", b"[1,2]").unwrap();

        assert!(store.list_avatar_images().unwrap_err().is_corrupt());
    }

    #[test]
    fn delete_image_semantics() {
        let store = make_store();
        let err = store.delete_avatar_image("/avatars/a.png").unwrap_err();
        assert!(matches!(err, StoreError::KeyspaceNotFound { .. }));

        let image = make_image("/avatars/a.png");
        store.save_avatar_image(&image).unwrap();
        store.delete_avatar_image(&image.path).unwrap();
        assert!(store.get_avatar_image(&image.path).unwrap_err().is_not_found());

        // Deleting again is a no-op once the keyspace exists.
        store.delete_avatar_image(&image.path).unwrap();
        store.delete_avatar_image("/avatars/never.png").unwrap();
        assert!(store.list_avatar_images().unwrap().is_empty());
    }

    // --- Configuration and concurrency ---

    #[test]
    fn custom_keyspace_names_are_honored() {
        let engine = Arc::new(MemoryEngine::new());
        let config = StoreConfig {
            avatars_keyspace: "profiles".to_string(),
            images_keyspace: "uploads".to_string(),
            config_keyspace: "settings".to_string(),
        };
        let store = AvatarStore::with_config(engine.clone(), config);
        let saved = store.save_avatar(make_avatar("robot")).unwrap();
        store.save_avatar_image(&make_image("/x.png")).unwrap();
        store.save_config(&AvatarList::default()).unwrap();

        assert!(engine.get("profiles", &saved.id).unwrap().is_some());
        assert!(engine.get("uploads", "/x.png").unwrap().is_some());
        assert!(engine.get("settings", CONFIG_KEY).unwrap().is_some());
        assert!(!engine.has_keyspace("avatars").unwrap());
        assert_eq!(store.config().avatars_keyspace, "profiles");
    }

    #[test]
    fn concurrent_saves_are_all_retrievable() {
        let store = make_store();
        let saved: Vec<Avatar> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    scope.spawn(move || {
                        (0..10)
                            .map(|j| store.save_avatar(make_avatar(&format!("t{i}-{j}"))).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(saved.len(), 80);
        for avatar in &saved {
            assert_eq!(&store.get_avatar(&avatar.id).unwrap(), avatar);
        }
        assert_eq!(store.list_avatars().unwrap().len(), 80);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::DatabaseConfig {
            path: dir.path().join("avatars.redb"),
            ..crate::DatabaseConfig::default()
        };

        let saved = {
            let store = AvatarStore::new(Arc::new(RedbEngine::open(&config).unwrap()));
            store.save_avatar_image(&make_image("/avatars/a.png")).unwrap();
            store.save_avatar(make_avatar("robot")).unwrap()
        };

        let store = AvatarStore::new(Arc::new(RedbEngine::open(&config).unwrap()));
        assert_eq!(store.get_avatar(&saved.id).unwrap(), saved);
        assert_eq!(store.list_avatar_images().unwrap().len(), 1);
    }

    fn arb_state_paths() -> impl Strategy<Value = Vec<(AvatarState, String)>> {
        prop::collection::vec(
            (
                prop::sample::select(AvatarState::ALL.to_vec()),
                "/[a-z0-9_/]{1,24}\\.(png|gif)",
            ),
            0..3,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn avatar_round_trips_losslessly(
            name in "\\PC{0,40}",
            description in "\\PC{0,80}",
            states in arb_state_paths(),
            is_default in any::<bool>(),
        ) {
            let store = AvatarStore::new(Arc::new(MemoryEngine::new()));
            let mut avatar = Avatar::new(name, description);
            avatar.is_default = is_default;
            for (state, path) in states {
                avatar = avatar.with_state(state, path);
            }

            let saved = store.save_avatar(avatar).unwrap();
            prop_assert_eq!(store.get_avatar(&saved.id).unwrap(), saved);
        }
    }
}
