use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage category of an image. Controls which folder/prefix an image lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Banner,
    Item,
}

/// Tokens that mark a reference as a team banner.
const BANNER_TOKENS: &[&str] = &["banner", "dupla"];

/// Separators used between the two names of a team ("joao-e-maria").
const PAIR_SEPARATORS: &[&str] = &["-e-", "_e_", " e ", "&"];

/// Tokens that mark a reference as a shop item.
const ITEM_TOKENS: &[&str] = &["item", "itens", "loja", "shop"];

impl Category {
    /// Infer the category from free text (a filename, path or URL).
    ///
    /// Banner markers win over item markers; anything ambiguous is a banner.
    pub fn infer(text: &str) -> Self {
        let lower = text.to_lowercase();

        let is_banner = BANNER_TOKENS.iter().any(|t| lower.contains(t))
            || PAIR_SEPARATORS.iter().any(|s| lower.contains(s));
        if is_banner {
            return Category::Banner;
        }

        if ITEM_TOKENS.iter().any(|t| lower.contains(t)) {
            return Category::Item;
        }

        Category::Banner
    }

    /// Parse an explicit hint such as `banner`, `item`, `itens`.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "banner" | "banners" | "dupla" | "duplas" => Some(Category::Banner),
            "item" | "itens" | "items" => Some(Category::Item),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Banner => "banner",
            Category::Item => "item",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted entities holding an image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A team ("dupla") and its banner field.
    TeamBanner,
    /// A shop item and its image field.
    ShopItem,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::TeamBanner, EntityKind::ShopItem];

    pub fn category(&self) -> Category {
        match self {
            EntityKind::TeamBanner => Category::Banner,
            EntityKind::ShopItem => Category::Item,
        }
    }

    /// Prefix used when generating object names for this entity.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            EntityKind::TeamBanner => "dupla",
            EntityKind::ShopItem => "item",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::TeamBanner => "team_banner",
            EntityKind::ShopItem => "shop_item",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
