//! Key deriver: isolates the canonical filename (and its folder) from any
//! reference shape.

use placar_blob::{BUCKET_BANNER_PREFIX, BUCKET_ITEM_PREFIX};
use placar_core::Category;
use serde::Serialize;

use crate::{Backend, LEGACY_BANNER_FOLDER, LEGACY_ITEM_FOLDER, LEGACY_PUBLIC_DIR};

/// Filename plus the folder it was found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedKey {
    pub filename: String,
    /// Segment directly above the filename, if any.
    pub folder: Option<String>,
    /// Category implied by the folder, when it is one of the known ones.
    pub category: Option<Category>,
}

/// Category a folder name stands for under either naming convention.
pub fn category_for_folder(folder: &str) -> Option<Category> {
    let folder = folder.trim_matches('/');
    if folder == BUCKET_BANNER_PREFIX.trim_end_matches('/') || folder == LEGACY_BANNER_FOLDER {
        Some(Category::Banner)
    } else if folder == BUCKET_ITEM_PREFIX.trim_end_matches('/') || folder == LEGACY_ITEM_FOLDER {
        Some(Category::Item)
    } else {
        None
    }
}

/// Drop the query string and fragment.
pub(crate) fn strip_suffixes(reference: &str) -> &str {
    let end = reference.find(|c: char| c == '?' || c == '#').unwrap_or(reference.len());
    &reference[..end]
}

/// The path part of an absolute URL, without the leading slash.
pub(crate) fn url_path(url: &str) -> &str {
    let url = strip_suffixes(url);
    let after_scheme = match url.find("://") {
        Some(index) => &url[index + 3..],
        None => url,
    };
    match after_scheme.find('/') {
        Some(index) => &after_scheme[index + 1..],
        None => "",
    }
}

/// Path of a local reference relative to `public/`.
pub(crate) fn local_path(reference: &str) -> &str {
    let mut path = strip_suffixes(reference.trim());
    loop {
        let trimmed = path.trim_start_matches("./").trim_start_matches('/');
        let trimmed = trimmed
            .strip_prefix(LEGACY_PUBLIC_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(trimmed);
        if trimmed == path {
            return path;
        }
        path = trimmed;
    }
}

pub(crate) fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

pub(crate) fn key_from_path(path: &str) -> Option<DerivedKey> {
    let segments: Vec<&str> = path.split('/').collect();
    let filename = decode(segments.last()?.trim());
    if filename.is_empty() {
        return None;
    }

    let folder = segments
        .len()
        .checked_sub(2)
        .map(|index| decode(segments[index]))
        .filter(|folder| !folder.is_empty());
    let category = folder.as_deref().and_then(category_for_folder);

    Some(DerivedKey {
        filename,
        folder,
        category,
    })
}

/// Extract the filename a reference points at.
///
/// Returns `None` for unknown references and for references with nothing after
/// the last `/`; callers treat that as "cannot migrate", never as fatal.
pub fn derive_key(reference: &str, backend: Backend) -> Option<DerivedKey> {
    match backend {
        Backend::Unknown => None,
        Backend::Local => key_from_path(local_path(reference)),
        Backend::ObjectStore | Backend::Legacy => key_from_path(url_path(reference.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_conventions_yield_the_same_filename() {
        let hyphen = "https://raw.githubusercontent.com/org/repo/main/public/banners-duplas/ana-e-bia.png";
        let underscore = "https://raw.githubusercontent.com/org/repo/main/public/banners_dupla/ana-e-bia.png";

        let a = derive_key(hyphen, Backend::Legacy).unwrap();
        let b = derive_key(underscore, Backend::Legacy).unwrap();
        assert_eq!(a.filename, "ana-e-bia.png");
        assert_eq!(a.filename, b.filename);
        assert_eq!(a.category, Some(Category::Banner));
        assert_eq!(b.category, Some(Category::Banner));
        assert_eq!(a.folder.as_deref(), Some("banners-duplas"));
    }

    #[test]
    fn object_store_keys_carry_their_prefix() {
        let key = derive_key(
            "https://placar.s3.amazonaws.com/itens/ba%C3%BA%20velho.png?v=2#top",
            Backend::ObjectStore,
        )
        .unwrap();
        assert_eq!(key.filename, "baú velho.png");
        assert_eq!(key.folder.as_deref(), Some("itens"));
        assert_eq!(key.category, Some(Category::Item));
    }

    #[test]
    fn local_paths_drop_public_root() {
        let key = derive_key("./public/itens/chest.png", Backend::Local).unwrap();
        assert_eq!(key.filename, "chest.png");
        assert_eq!(key.category, Some(Category::Item));

        let bare = derive_key("logo.png", Backend::Local).unwrap();
        assert_eq!(bare.folder, None);
        assert_eq!(bare.category, None);
    }

    #[test]
    fn nothing_to_derive() {
        assert_eq!(derive_key("https://raw.githubusercontent.com/org/repo/main/public/itens/", Backend::Legacy), None);
        assert_eq!(derive_key("https://placar.s3.amazonaws.com", Backend::ObjectStore), None);
        assert_eq!(derive_key("data:image/png;base64,AAAA", Backend::Unknown), None);
    }

    #[test]
    fn unknown_folders_have_no_category() {
        assert_eq!(category_for_folder("fotos"), None);
        assert_eq!(category_for_folder("banners_dupla/"), Some(Category::Banner));
    }
}
