use placar_core::{Category, PlacarConfigSnapshot};

/// Host fragment of every legacy raw-content URL.
pub const LEGACY_RAW_HOST: &str = "raw.githubusercontent.com";

pub const LEGACY_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Legacy folder for team banners. Hyphenated and plural, unlike the bucket prefix.
pub const LEGACY_BANNER_FOLDER: &str = "banners-duplas";

pub const LEGACY_ITEM_FOLDER: &str = "itens";

/// Folder every legacy image path is rooted at.
pub const LEGACY_PUBLIC_DIR: &str = "public";

/// The repository the images were originally served from.
#[derive(Clone)]
pub struct LegacySource {
    raw_base: String,
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
}

impl std::fmt::Debug for LegacySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacySource")
            .field("raw_base", &self.raw_base)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl LegacySource {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            raw_base: LEGACY_RAW_BASE.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token: None,
        }
    }

    pub fn from_config(config: &PlacarConfigSnapshot) -> Self {
        let mut source = Self::new(
            config.get_or("legacy.owner", ""),
            config.get_or("legacy.repo", ""),
            config.get_or("legacy.branch", "main"),
        );
        source.token = config.get_string("legacy.token");
        source
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_configured(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }

    pub fn folder(category: Category) -> &'static str {
        match category {
            Category::Banner => LEGACY_BANNER_FOLDER,
            Category::Item => LEGACY_ITEM_FOLDER,
        }
    }

    fn public_root(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base, self.owner, self.repo, self.branch, LEGACY_PUBLIC_DIR
        )
    }

    /// `.../public/{legacy folder}/{filename}`
    pub fn url_for(&self, category: Category, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_root(),
            Self::folder(category),
            urlencoding::encode(filename)
        )
    }

    /// URL of a path relative to `public/`, as stored by local references.
    pub fn url_for_path(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.public_root(), encoded.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placar_core::PlacarConfig;

    #[test]
    fn builds_category_urls() {
        let source = LegacySource::new("org", "repo", "main");
        assert_eq!(
            source.url_for(Category::Item, "chest.png"),
            "https://raw.githubusercontent.com/org/repo/main/public/itens/chest.png"
        );
        assert_eq!(
            source.url_for(Category::Banner, "joao e maria.png"),
            "https://raw.githubusercontent.com/org/repo/main/public/banners-duplas/joao%20e%20maria.png"
        );
    }

    #[test]
    fn builds_path_urls() {
        let source = LegacySource::new("org", "repo", "dev");
        assert_eq!(
            source.url_for_path("images/logo.png"),
            "https://raw.githubusercontent.com/org/repo/dev/public/images/logo.png"
        );
    }

    #[test]
    fn reads_config_and_hides_token() {
        let mut config = PlacarConfig::new();
        config.set("legacy.owner", "org");
        config.set("legacy.repo", "placar");
        config.set("legacy.token", "ghp_secret");
        let source = LegacySource::from_config(&config.snapshot());

        assert!(source.is_configured());
        assert!(source.has_token());
        assert!(source.url_for(Category::Item, "a.png").contains("/placar/main/"));
        assert!(!format!("{source:?}").contains("ghp_secret"));
    }
}
