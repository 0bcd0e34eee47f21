//! Public JSON representations of entities.
//!
//! Pure functions from an entity to the exact field set the API exposes.
//! Anything the real service would compute (cover images, page URLs) is
//! pinned to a constant so clients get stable, parseable values.

use serde_json::{json, Map, Value};

use crate::models::{Game, Upload, User};

pub fn format_user(user: &User) -> Value {
    let mut res = json!({
        "id": user.id,
        "gamer": user.gamer,
        "developer": user.developer,
        "press_user": user.press_user,
        "display_name": user.display_name,
        "username": user.username,
        "url": "http://example.org",
        "cover_url": "http://example.org",
    });
    // Omitted entirely when false, matching the sparse style of the real API.
    if user.allow_telemetry {
        res["allow_telemetry"] = json!(true);
    }
    res
}

pub fn format_game(game: &Game) -> Value {
    json!({
        "id": game.id,
        "user_id": game.user_id,
        "title": game.title,
        "min_price": game.min_price,
        "type": game.kind,
        "classification": game.classification,
    })
}

pub fn format_upload(upload: &Upload) -> Value {
    let mut platforms = Map::new();
    if upload.platform_linux {
        platforms.insert("linux".to_string(), json!("all"));
    }
    if upload.platform_windows {
        platforms.insert("windows".to_string(), json!("all"));
    }
    if upload.platform_mac {
        platforms.insert("osx".to_string(), json!("all"));
    }

    json!({
        "id": upload.id,
        "game_id": upload.game_id,
        "type": upload.kind,
        "storage": upload.storage.as_str(),
        "size": upload.size,
        "filename": upload.filename,
        "url": upload.url,
        "platforms": platforms,
    })
}

pub fn format_uploads(uploads: &[Upload]) -> Value {
    Value::Array(uploads.iter().map(format_upload).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Storage;

    fn sample_user() -> User {
        User {
            id: 1,
            gamer: true,
            developer: true,
            press_user: false,
            display_name: "Alice".to_string(),
            username: "alice".to_string(),
            allow_telemetry: false,
        }
    }

    fn sample_upload(linux: bool, windows: bool, mac: bool) -> Upload {
        Upload {
            id: 10,
            game_id: 5,
            kind: "default".to_string(),
            storage: Storage::Hosted,
            size: 1024,
            filename: "game.zip".to_string(),
            url: None,
            platform_linux: linux,
            platform_windows: windows,
            platform_mac: mac,
            head: None,
        }
    }

    #[test]
    fn user_telemetry_field_only_when_opted_in() {
        let mut user = sample_user();
        let out = format_user(&user);
        assert!(out.get("allow_telemetry").is_none());
        assert_eq!(out["username"], "alice");
        assert_eq!(out["url"], "http://example.org");

        user.allow_telemetry = true;
        assert_eq!(format_user(&user)["allow_telemetry"], json!(true));
    }

    #[test]
    fn game_fields() {
        let game = Game {
            id: 5,
            user_id: 1,
            title: "Test".to_string(),
            min_price: 500,
            kind: "default".to_string(),
            classification: "game".to_string(),
            published: true,
        };
        let out = format_game(&game);
        assert_eq!(out["id"], 5);
        assert_eq!(out["user_id"], 1);
        assert_eq!(out["min_price"], 500);
        assert_eq!(out["type"], "default");
        // `published` drives authorization, it is not part of the wire shape.
        assert!(out.get("published").is_none());
    }

    #[test]
    fn platforms_object_contains_only_true_flags() {
        let out = format_upload(&sample_upload(true, false, true));
        let platforms = out["platforms"].as_object().unwrap();
        assert_eq!(platforms.get("linux"), Some(&json!("all")));
        assert_eq!(platforms.get("osx"), Some(&json!("all")));
        assert!(!platforms.contains_key("windows"));

        let none = format_upload(&sample_upload(false, false, false));
        assert!(none["platforms"].as_object().unwrap().is_empty());
    }

    #[test]
    fn upload_storage_serialized_as_string() {
        let mut upload = sample_upload(true, true, false);
        assert_eq!(format_upload(&upload)["storage"], "hosted");
        upload.storage = Storage::Other("carrier-pigeon".to_string());
        assert_eq!(format_upload(&upload)["storage"], "carrier-pigeon");
    }

    #[test]
    fn uploads_formatted_in_order() {
        let uploads = vec![sample_upload(true, true, false)];
        let out = format_uploads(&uploads);
        assert_eq!(out.as_array().unwrap().len(), 1);
        assert_eq!(out[0]["id"], 10);
    }
}
