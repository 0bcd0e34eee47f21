//! In-memory entity store.
//!
//! All tables live behind a single `RwLock`. Seeding happens before the
//! server starts taking requests; request handling only ever takes read
//! locks, so concurrent in-flight requests never contend.
//!
//! Seeding constructors allocate identifiers from a shared counter and
//! register the backing CDN blob for anything downloadable, so a seeded
//! fixture is internally consistent by construction.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;

use crate::models::{Build, BuildFile, CdnFile, Game, Storage, Upload, User};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<i64, User>,
    api_keys: HashMap<String, i64>,
    games: HashMap<i64, Game>,
    uploads: HashMap<i64, Upload>,
    builds: HashMap<i64, Build>,
    cdn_files: HashMap<String, CdnFile>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared entity repository, read-only from the request path.
#[derive(Debug, Default)]
pub struct Store {
    inner: RwLock<Inner>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Read path ------------------------------------------------------------

    /// Resolve an API key to its user.
    pub fn user_for_api_key(&self, key: &str) -> Option<User> {
        let inner = self.inner.read().expect("rwlock poisoned");
        let user_id = inner.api_keys.get(key)?;
        inner.users.get(user_id).cloned()
    }

    pub fn find_game(&self, id: i64) -> Option<Game> {
        let inner = self.inner.read().expect("rwlock poisoned");
        inner.games.get(&id).cloned()
    }

    pub fn find_upload(&self, id: i64) -> Option<Upload> {
        let inner = self.inner.read().expect("rwlock poisoned");
        inner.uploads.get(&id).cloned()
    }

    pub fn find_build(&self, id: i64) -> Option<Build> {
        let inner = self.inner.read().expect("rwlock poisoned");
        inner.builds.get(&id).cloned()
    }

    /// All uploads belonging to a game, ordered by id.
    pub fn list_uploads_by_game(&self, game_id: i64) -> Vec<Upload> {
        let inner = self.inner.read().expect("rwlock poisoned");
        let mut uploads: Vec<Upload> = inner
            .uploads
            .values()
            .filter(|u| u.game_id == game_id)
            .cloned()
            .collect();
        uploads.sort_by_key(|u| u.id);
        uploads
    }

    /// Look up a CDN file by its path, e.g. `/uploads/3/game.zip`.
    pub fn cdn_file(&self, path: &str) -> Option<CdnFile> {
        let inner = self.inner.read().expect("rwlock poisoned");
        inner.cdn_files.get(path).cloned()
    }

    // -- Seeding --------------------------------------------------------------

    pub fn make_user(&self, display_name: &str) -> User {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let id = inner.next_id();
        let user = User {
            id,
            gamer: true,
            developer: false,
            press_user: false,
            display_name: display_name.to_string(),
            username: display_name.to_lowercase().replace(' ', "-"),
            allow_telemetry: false,
        };
        inner.users.insert(id, user.clone());
        user
    }

    /// Register an API key resolving to `user_id`.
    pub fn make_api_key(&self, user_id: i64, key: &str) {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        inner.api_keys.insert(key.to_string(), user_id);
    }

    /// A free, published game.
    pub fn make_game(&self, user_id: i64, title: &str) -> Game {
        self.insert_game(user_id, title, 0, true)
    }

    /// A published game with a non-zero minimum price.
    pub fn make_paid_game(&self, user_id: i64, title: &str, min_price: i64) -> Game {
        self.insert_game(user_id, title, min_price, true)
    }

    /// An unpublished game, visible to its owner only.
    pub fn make_hidden_game(&self, user_id: i64, title: &str) -> Game {
        self.insert_game(user_id, title, 0, false)
    }

    fn insert_game(&self, user_id: i64, title: &str, min_price: i64, published: bool) -> Game {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let id = inner.next_id();
        let game = Game {
            id,
            user_id,
            title: title.to_string(),
            min_price,
            kind: "default".to_string(),
            classification: "game".to_string(),
            published,
        };
        inner.games.insert(id, game.clone());
        game
    }

    /// A hosted upload whose bytes are registered at its CDN path.
    pub fn make_hosted_upload(&self, game_id: i64, filename: &str, contents: Bytes) -> Upload {
        let upload = self.insert_upload(game_id, filename, Storage::Hosted, contents.len() as u64);
        self.put_cdn_file(&upload.cdn_path(), filename, contents);
        upload
    }

    /// A build-backed upload. Delivery fails until [`Store::make_build`]
    /// attaches a head build.
    pub fn make_build_upload(&self, game_id: i64, filename: &str) -> Upload {
        self.insert_upload(game_id, filename, Storage::Build, 0)
    }

    /// An upload with an arbitrary storage kind, for exercising the
    /// unsupported-storage failure path.
    pub fn make_upload_with_storage(
        &self,
        game_id: i64,
        filename: &str,
        storage: Storage,
    ) -> Upload {
        self.insert_upload(game_id, filename, storage, 0)
    }

    fn insert_upload(
        &self,
        game_id: i64,
        filename: &str,
        storage: Storage,
        size: u64,
    ) -> Upload {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let id = inner.next_id();
        let upload = Upload {
            id,
            game_id,
            kind: "default".to_string(),
            storage,
            size,
            filename: filename.to_string(),
            url: None,
            platform_linux: true,
            platform_windows: true,
            platform_mac: false,
            head: None,
        };
        inner.uploads.insert(id, upload.clone());
        upload
    }

    /// Attach a new build to an upload and mark it as the upload's head.
    pub fn make_build(&self, upload_id: i64) -> Build {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        let id = inner.next_id();
        let build = Build {
            id,
            upload_id,
            files: Vec::new(),
        };
        inner.builds.insert(id, build.clone());
        if let Some(upload) = inner.uploads.get_mut(&upload_id) {
            upload.head = Some(id);
        }
        build
    }

    /// Add a named file to a build and register its bytes at the build
    /// file's CDN path.
    pub fn make_build_file(
        &self,
        build_id: i64,
        kind: &str,
        sub_kind: &str,
        filename: &str,
        contents: Bytes,
    ) -> BuildFile {
        let file = BuildFile {
            build_id,
            kind: kind.to_string(),
            sub_kind: sub_kind.to_string(),
            filename: filename.to_string(),
            size: contents.len() as u64,
        };
        {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            if let Some(build) = inner.builds.get_mut(&build_id) {
                build.files.push(file.clone());
            }
        }
        self.put_cdn_file(&file.cdn_path(), filename, contents);
        file
    }

    /// Register a raw CDN blob at an arbitrary path.
    pub fn put_cdn_file(&self, path: &str, filename: &str, contents: Bytes) {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        inner.cdn_files.insert(
            path.to_string(),
            CdnFile {
                filename: filename.to_string(),
                size: contents.len() as u64,
                contents,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_resolves_to_user() {
        let store = Store::new();
        let user = store.make_user("Alice Dev");
        store.make_api_key(user.id, "key-alice");

        let resolved = store.user_for_api_key("key-alice").unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.username, "alice-dev");
        assert!(store.user_for_api_key("key-bob").is_none());
    }

    #[test]
    fn uploads_listed_in_id_order() {
        let store = Store::new();
        let user = store.make_user("Dev");
        let game = store.make_game(user.id, "Sorted");
        let first = store.make_hosted_upload(game.id, "a.zip", Bytes::from_static(b"aa"));
        let second = store.make_hosted_upload(game.id, "b.zip", Bytes::from_static(b"bb"));

        let uploads = store.list_uploads_by_game(game.id);
        assert_eq!(
            uploads.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert!(store.list_uploads_by_game(9999).is_empty());
    }

    #[test]
    fn hosted_upload_registers_cdn_file() {
        let store = Store::new();
        let user = store.make_user("Dev");
        let game = store.make_game(user.id, "Hosted");
        let upload = store.make_hosted_upload(game.id, "game.zip", Bytes::from_static(b"payload"));

        assert_eq!(upload.size, 7);
        let file = store.cdn_file(&upload.cdn_path()).unwrap();
        assert_eq!(file.filename, "game.zip");
        assert_eq!(file.contents, Bytes::from_static(b"payload"));
    }

    #[test]
    fn build_becomes_upload_head() {
        let store = Store::new();
        let user = store.make_user("Dev");
        let game = store.make_game(user.id, "Built");
        let upload = store.make_build_upload(game.id, "build.zip");
        assert_eq!(store.find_upload(upload.id).unwrap().head, None);

        let build = store.make_build(upload.id);
        assert_eq!(store.find_upload(upload.id).unwrap().head, Some(build.id));
    }

    #[test]
    fn build_file_registered_at_cdn_path() {
        let store = Store::new();
        let user = store.make_user("Dev");
        let game = store.make_game(user.id, "Built");
        let upload = store.make_build_upload(game.id, "build.zip");
        let build = store.make_build(upload.id);
        let file = store.make_build_file(
            build.id,
            "archive",
            "default",
            "build.zip",
            Bytes::from_static(b"archive-bytes"),
        );

        let fetched = store.find_build(build.id).unwrap();
        assert!(fetched.file("archive", "default").is_some());
        assert!(store.cdn_file(&file.cdn_path()).is_some());
    }
}
