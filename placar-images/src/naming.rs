use chrono::Utc;
use placar_core::EntityKind;
use rand::{distributions::Alphanumeric, Rng};

pub const DEFAULT_EXTENSION: &str = "png";
pub const DEFAULT_IMAGE_TYPE: &str = "image/png";

const TOKEN_LEN: usize = 6;
const MAX_BASE_LEN: usize = 48;

/// Replace every non-alphanumeric character with `_`.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Split `name.ext` into base and lowercased extension.
fn split_name(original: &str) -> (&str, String) {
    match original.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() && !ext.is_empty() => {
            let ext: String = ext
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_lowercase();
            if ext.is_empty() {
                (base, DEFAULT_EXTENSION.to_string())
            } else {
                (base, ext)
            }
        }
        _ => (original, DEFAULT_EXTENSION.to_string()),
    }
}

/// Collision-free object name for a migrated image:
/// `{dupla|item}_{id}_{unix-millis}_{token}_{base}.{ext}`.
pub fn unique_object_name(original: &str, kind: EntityKind, entity_id: &str) -> String {
    let (base, ext) = split_name(original.trim());
    let mut base = sanitize(base);
    base.truncate(MAX_BASE_LEN);
    if base.is_empty() {
        base.push_str("imagem");
    }

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();

    format!(
        "{}_{}_{}_{}_{}.{}",
        kind.name_prefix(),
        sanitize(entity_id),
        Utc::now().timestamp_millis(),
        token,
        base,
        ext
    )
}

/// Content type to store an image with: the upstream `image/*` header, else a
/// guess from the filename, else `image/png`.
pub fn upload_content_type(upstream: Option<&str>, filename: &str) -> String {
    if let Some(essence) = upstream.map(essence).filter(|ct| ct.starts_with("image/")) {
        return essence;
    }
    mime_guess::from_path(filename)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string())
}

/// Content type for a proxied body: upstream header, else a guess, else
/// `application/octet-stream`.
pub fn proxy_content_type(upstream: Option<&str>, filename: Option<&str>) -> String {
    if let Some(ct) = upstream.filter(|ct| !ct.trim().is_empty()) {
        return ct.trim().to_string();
    }
    filename
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
