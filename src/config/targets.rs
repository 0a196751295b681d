// src/config/targets.rs
//! Target descriptors.
//!
//! A target is one store/region (detail page of a tracked item) or one
//! category listing. Site markup differences are expressed here as ordered
//! data (label variants, selector priority lists, stock phrases) so the
//! extractors in `specs` stay site-agnostic.
//!
//! The configuration is loaded once at startup (JSON file or the builtin
//! table) and passed explicitly into the collection routine.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::consts::PLACEHOLDER_PREFIX;
use crate::core::html;
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Product detail page; ranks come from the best-sellers block.
    #[default]
    Detail,
    /// Category best-seller listing; rank is the item's position.
    Listing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub region: String,
    /// May contain `{id}`, replaced by `item_id`.
    pub url: String,
    #[serde(default, alias = "asin")]
    pub item_id: String,
    pub currency: String,
    #[serde(default)]
    pub kind: TargetKind,
    /// Display name of the category-scoped rank ("Video Games", "TVゲーム").
    #[serde(default)]
    pub category: String,
    /// Listing only: item title must contain one of these.
    #[serde(default)]
    pub match_keywords: Vec<String>,
    /// Detail only: falls back to `category` when empty.
    #[serde(default)]
    pub category_keywords: Vec<String>,
    /// Best-sellers label variants, localized first.
    #[serde(default = "default_rank_labels")]
    pub rank_labels: Vec<String>,
    #[serde(default = "default_stock_phrases")]
    pub stock_phrases: Vec<String>,
    #[serde(default = "default_item_selectors")]
    pub item_selectors: Vec<String>,
    #[serde(default = "default_price_selectors")]
    pub price_selectors: Vec<String>,
}

fn default_rank_labels() -> Vec<String> {
    vec![s!("Best Sellers Rank")]
}

fn default_stock_phrases() -> Vec<String> {
    vec![s!("in stock")]
}

fn default_item_selectors() -> Vec<String> {
    [
        "div[id^='gridItemRoot']",
        "li.zg-item-immersion",
        "div.zg-grid-general-faceout",
        "div[data-component-type='s-search-result']",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_price_selectors() -> Vec<String> {
    [
        "span.a-price-whole",
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        "span.a-offscreen",
        "span.p13n-sc-price",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl TargetSpec {
    pub fn url(&self) -> String {
        self.url.replace("{id}", &self.item_id)
    }

    /// Item id missing or still a placeholder: never fetched.
    pub fn is_unconfigured(&self) -> bool {
        if self.item_id.starts_with(PLACEHOLDER_PREFIX) {
            return true;
        }
        self.url.contains("{id}") && self.item_id.trim().is_empty()
    }

    pub fn effective_category_keywords(&self) -> Vec<String> {
        if !self.category_keywords.is_empty() {
            return self.category_keywords.clone();
        }
        if self.category.trim().is_empty() { Vec::new() } else { vec![self.category.clone()] }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid { key: self.key.clone(), reason };

        if self.key.trim().is_empty() {
            return Err(invalid(s!("empty key")));
        }
        if self.url.trim().is_empty() {
            return Err(invalid(s!("empty url")));
        }
        match self.kind {
            TargetKind::Listing => {
                if self.match_keywords.iter().all(|k| k.trim().is_empty()) {
                    return Err(invalid(s!("listing target needs match_keywords")));
                }
                html::compile_all(&self.item_selectors).map_err(invalid)?;
            }
            TargetKind::Detail => {
                if self.rank_labels.is_empty() {
                    return Err(invalid(s!("detail target needs rank_labels")));
                }
            }
        }
        html::compile_all(&self.price_selectors).map_err(invalid)?;
        Ok(())
    }
}

/// Scalar tracker: SteamSpy owner estimate for one app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamSpec {
    pub app_id: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_metric_type")]
    pub metric_type: String,
    #[serde(default = "default_steamspy_url")]
    pub url: String,
}

fn default_platform() -> String {
    s!("Steam")
}

fn default_metric_type() -> String {
    s!("wishlist")
}

fn default_steamspy_url() -> String {
    s!("https://steamspy.com/api.php?request=appdetails&appid={id}")
}

impl SteamSpec {
    pub fn new(app_id: &str) -> Self {
        Self {
            app_id: s!(app_id),
            platform: default_platform(),
            metric_type: default_metric_type(),
            url: default_steamspy_url(),
        }
    }

    pub fn url(&self) -> String {
        self.url.replace("{id}", &self.app_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub steam: Option<SteamSpec>,
}

impl TrackerConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let cfg: TrackerConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// One record per key per cycle: keys must be unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for t in &self.targets {
            if !seen.insert(t.key.as_str()) {
                return Err(ConfigError::DuplicateKey(t.key.clone()));
            }
            t.validate()?;
        }
        Ok(())
    }

    /// Physical-edition detail pages across Amazon regions, ordered by
    /// console market size, plus the SteamSpy owner estimate.
    pub fn builtin() -> Self {
        let targets = BUILTIN_REGIONS
            .iter()
            .map(|r| TargetSpec {
                key: join!("amazon_", r.code),
                label: join!("Amazon ", &r.code.to_ascii_uppercase()),
                region: s!(r.region),
                url: join!("https://www.", r.host, "/dp/{id}"),
                item_id: s!(r.item_id),
                currency: s!(r.currency),
                kind: TargetKind::Detail,
                category: s!(r.category),
                match_keywords: Vec::new(),
                category_keywords: Vec::new(),
                rank_labels: localized(r.rank_label, "Best Sellers Rank"),
                stock_phrases: localized(r.stock_phrase, "in stock"),
                item_selectors: default_item_selectors(),
                price_selectors: default_price_selectors(),
            })
            .collect();

        Self { targets, steam: Some(SteamSpec::new("3321460")) }
    }
}

fn localized(local: Option<&str>, english: &str) -> Vec<String> {
    match local {
        Some(l) => vec![s!(l), s!(english)],
        None => vec![s!(english)],
    }
}

struct Region {
    code: &'static str,
    region: &'static str,
    host: &'static str,
    item_id: &'static str,
    currency: &'static str,
    rank_label: Option<&'static str>,
    stock_phrase: Option<&'static str>,
    category: &'static str,
}

const fn region(
    code: &'static str,
    region: &'static str,
    host: &'static str,
    item_id: &'static str,
    currency: &'static str,
    rank_label: Option<&'static str>,
    stock_phrase: Option<&'static str>,
    category: &'static str,
) -> Region {
    Region { code, region, host, item_id, currency, rank_label, stock_phrase, category }
}

const BUILTIN_REGIONS: [Region; 18] = [
    region("us", "North America", "amazon.com", "B0FST4FTPQ", "USD", None, None, "Video Games"),
    region("jp", "Asia", "amazon.co.jp", "PLACEHOLDER_JP", "JPY", Some("Amazon 売れ筋ランキング"), Some("在庫あり"), "TVゲーム"),
    region("uk", "Europe", "amazon.co.uk", "B0FSF47H8H", "GBP", None, None, "PC & Video Games"),
    region("de", "Europe", "amazon.de", "B0FSSRPFB5", "EUR", Some("Bestseller-Rang"), Some("auf lager"), "Games"),
    region("fr", "Europe", "amazon.fr", "B0FTFFF5J6", "EUR", Some("Classement des meilleures ventes"), Some("en stock"), "Jeux vidéo"),
    region("ca", "North America", "amazon.ca", "PLACEHOLDER_CA", "CAD", None, None, "Video Games"),
    region("au", "Oceania", "amazon.com.au", "PLACEHOLDER_AU", "AUD", None, None, "Video Games"),
    region("it", "Europe", "amazon.it", "PLACEHOLDER_IT", "EUR", Some("Posizione nella classifica"), Some("disponibile"), "Videogiochi"),
    region("es", "Europe", "amazon.es", "PLACEHOLDER_ES", "EUR", Some("Posición en los más vendidos"), Some("en stock"), "Videojuegos"),
    region("mx", "Latin America", "amazon.com.mx", "PLACEHOLDER_MX", "MXN", Some("Lugar en Más vendidos"), Some("en existencias"), "Videojuegos"),
    region("br", "Latin America", "amazon.com.br", "PLACEHOLDER_BR", "BRL", Some("Posição na categoria"), Some("em estoque"), "Games e Consoles"),
    region("in", "Asia", "amazon.in", "PLACEHOLDER_IN", "INR", None, None, "Video Games"),
    region("sg", "Asia", "amazon.sg", "PLACEHOLDER_SG", "SGD", None, None, "Video Games"),
    region("nl", "Europe", "amazon.nl", "PLACEHOLDER_NL", "EUR", Some("Bestsellerranglijst"), Some("op voorraad"), "Games"),
    region("se", "Europe", "amazon.se", "PLACEHOLDER_SE", "SEK", Some("Bästsäljarranking"), Some("i lager"), "Dator och TV-spel"),
    region("pl", "Europe", "amazon.pl", "PLACEHOLDER_PL", "PLN", Some("Ranking bestsellerów"), Some("na stanie"), "Gry i konsole"),
    region("ae", "Middle East", "amazon.ae", "PLACEHOLDER_AE", "AED", None, None, "Video Games"),
    region("tr", "Europe", "amazon.com.tr", "PLACEHOLDER_TR", "TRY", Some("En Çok Satanlar"), Some("stokta var"), "Video Oyunları"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_valid_and_unique() {
        let cfg = TrackerConfig::builtin();
        assert_eq!(cfg.targets.len(), 18);
        cfg.validate().unwrap();

        let jp = cfg.targets.iter().find(|t| t.key == "amazon_jp").unwrap();
        assert_eq!(jp.rank_labels, vec!["Amazon 売れ筋ランキング", "Best Sellers Rank"]);
        assert!(jp.is_unconfigured());

        let us = &cfg.targets[0];
        assert_eq!(us.url(), "https://www.amazon.com/dp/B0FST4FTPQ");
        assert!(!us.is_unconfigured());
    }

    #[test]
    fn json_defaults_fill_selector_lists() {
        let text = r#"{
            "targets": [
                {"key": "zg_us", "label": "US top 100", "url": "https://example.test/zg",
                 "currency": "USD", "kind": "listing", "match_keywords": ["crimson desert"]}
            ]
        }"#;
        let cfg: TrackerConfig = serde_json::from_str(text).unwrap();
        cfg.validate().unwrap();
        let t = &cfg.targets[0];
        assert_eq!(t.kind, TargetKind::Listing);
        assert_eq!(t.item_selectors[0], "div[id^='gridItemRoot']");
        assert_eq!(t.rank_labels, vec!["Best Sellers Rank"]);
        assert!(cfg.steam.is_none());
        assert!(!t.is_unconfigured());
    }

    #[test]
    fn duplicate_keys_rejected() {
        let mut cfg = TrackerConfig::builtin();
        let dup = cfg.targets[0].clone();
        cfg.targets.push(dup);
        assert!(matches!(cfg.validate(), Err(ConfigError::DuplicateKey(k)) if k == "amazon_us"));
    }

    #[test]
    fn listing_without_keywords_rejected() {
        let mut t = TrackerConfig::builtin().targets.remove(0);
        t.kind = TargetKind::Listing;
        assert!(t.validate().is_err());
    }

    #[test]
    fn category_keywords_fall_back_to_category() {
        let mut t = TrackerConfig::builtin().targets.remove(0);
        assert_eq!(t.effective_category_keywords(), vec!["Video Games"]);
        t.category_keywords = vec![s!("PC Accessories")];
        assert_eq!(t.effective_category_keywords(), vec!["PC Accessories"]);
    }
}
