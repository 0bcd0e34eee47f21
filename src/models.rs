//! Entity types served by the API.
//!
//! These are plain data carriers: the store hands out clones and request
//! handling never mutates them. The only behavior they carry is the pair
//! of capability predicates that authorization checks evaluate against
//! the current user.

use bytes::Bytes;

/// A registered account. Resolved from an API key at the start of every
/// authenticated request.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub gamer: bool,
    pub developer: bool,
    pub press_user: bool,
    pub display_name: String,
    pub username: String,
    pub allow_telemetry: bool,
}

/// A game page. Owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// Minimum price in cents; 0 means free.
    pub min_price: i64,
    /// Serialized as `type` in API responses.
    pub kind: String,
    pub classification: String,
    /// Unpublished games are visible to their owner only.
    pub published: bool,
}

impl Game {
    /// Whether `user` may see this game's page and uploads.
    pub fn can_be_viewed_by(&self, user: &User) -> bool {
        self.published || self.user_id == user.id
    }
}

/// How an upload's bytes are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// A single CDN file served directly.
    Hosted,
    /// Delivered through the upload's head build.
    Build,
    /// Anything else. Downloads of these fail with an internal error,
    /// which lets fixtures exercise the unsupported-storage path.
    Other(String),
}

impl Storage {
    pub fn as_str(&self) -> &str {
        match self {
            Storage::Hosted => "hosted",
            Storage::Build => "build",
            Storage::Other(s) => s,
        }
    }
}

/// A downloadable artifact attached to a game.
#[derive(Debug, Clone)]
pub struct Upload {
    pub id: i64,
    pub game_id: i64,
    /// Serialized as `type` in API responses.
    pub kind: String,
    pub storage: Storage,
    pub size: u64,
    pub filename: String,
    pub url: Option<String>,
    pub platform_linux: bool,
    pub platform_windows: bool,
    pub platform_mac: bool,
    /// Head build id, set when `storage` is [`Storage::Build`].
    pub head: Option<i64>,
}

impl Upload {
    /// CDN path a hosted upload's bytes live at.
    pub fn cdn_path(&self) -> String {
        format!("/uploads/{}/{}", self.id, self.filename)
    }

    /// Whether `user` may download this upload. Requires view access to
    /// the owning game, and the game must be free or owned by `user`.
    pub fn can_be_downloaded_by(&self, game: &Game, user: &User) -> bool {
        game.can_be_viewed_by(user) && (game.min_price == 0 || game.user_id == user.id)
    }
}

/// A versioned build of an upload, holding one or more named files.
#[derive(Debug, Clone)]
pub struct Build {
    pub id: i64,
    pub upload_id: i64,
    pub files: Vec<BuildFile>,
}

impl Build {
    /// Look up a file by its `(kind, sub_kind)` pair, e.g.
    /// `("archive", "default")`.
    pub fn file(&self, kind: &str, sub_kind: &str) -> Option<&BuildFile> {
        self.files
            .iter()
            .find(|f| f.kind == kind && f.sub_kind == sub_kind)
    }
}

/// One named file inside a build.
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub build_id: i64,
    pub kind: String,
    pub sub_kind: String,
    pub filename: String,
    pub size: u64,
}

impl BuildFile {
    /// CDN path this build file's bytes live at.
    pub fn cdn_path(&self) -> String {
        format!("/builds/{}/{}", self.build_id, self.filename)
    }
}

/// A binary blob addressed by CDN path rather than numeric id.
#[derive(Debug, Clone)]
pub struct CdnFile {
    pub filename: String,
    pub size: u64,
    pub contents: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        User {
            id,
            gamer: true,
            developer: false,
            press_user: false,
            display_name: format!("User {id}"),
            username: format!("user-{id}"),
            allow_telemetry: false,
        }
    }

    fn game(owner: i64, min_price: i64, published: bool) -> Game {
        Game {
            id: 100,
            user_id: owner,
            title: "Test Game".to_string(),
            min_price,
            kind: "default".to_string(),
            classification: "game".to_string(),
            published,
        }
    }

    fn upload(game_id: i64) -> Upload {
        Upload {
            id: 200,
            game_id,
            kind: "default".to_string(),
            storage: Storage::Hosted,
            size: 4,
            filename: "game.zip".to_string(),
            url: None,
            platform_linux: true,
            platform_windows: false,
            platform_mac: false,
            head: None,
        }
    }

    #[test]
    fn published_game_viewable_by_anyone() {
        let g = game(1, 0, true);
        assert!(g.can_be_viewed_by(&user(1)));
        assert!(g.can_be_viewed_by(&user(2)));
    }

    #[test]
    fn unpublished_game_viewable_by_owner_only() {
        let g = game(1, 0, false);
        assert!(g.can_be_viewed_by(&user(1)));
        assert!(!g.can_be_viewed_by(&user(2)));
    }

    #[test]
    fn free_upload_downloadable_by_non_owner() {
        let g = game(1, 0, true);
        assert!(upload(g.id).can_be_downloaded_by(&g, &user(2)));
    }

    #[test]
    fn paid_upload_downloadable_by_owner_only() {
        let g = game(1, 500, true);
        assert!(upload(g.id).can_be_downloaded_by(&g, &user(1)));
        assert!(!upload(g.id).can_be_downloaded_by(&g, &user(2)));
    }

    #[test]
    fn build_file_lookup_by_kind_pair() {
        let b = Build {
            id: 1,
            upload_id: 2,
            files: vec![BuildFile {
                build_id: 1,
                kind: "archive".to_string(),
                sub_kind: "default".to_string(),
                filename: "build.zip".to_string(),
                size: 8,
            }],
        };
        assert!(b.file("archive", "default").is_some());
        assert!(b.file("archive", "signature").is_none());
        assert!(b.file("manifest", "default").is_none());
    }
}
