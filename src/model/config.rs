use serde::{Deserialize, Serialize};

use super::item::{Item, Rarity};
use super::list::{ItemList, ListKind};

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub sort: SortConfig,
    /// Lists seeded at startup. Replaces the built-in set when present.
    #[serde(default = "builtin_seeds")]
    pub default_lists: Vec<SeedList>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        TallyConfig {
            sort: SortConfig::default(),
            default_lists: builtin_seeds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Quiet period after the last quantity tap before rows are re-sorted
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

fn default_cooldown_ms() -> u64 {
    3000
}

/// A default list definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub need: u32,
    #[serde(default)]
    pub subcategory: Option<String>,
}

impl SeedList {
    /// Materialize this seed as a fresh default list
    pub fn to_list(&self) -> ItemList {
        let mut list = ItemList::new(
            self.id.clone(),
            self.name.trim().to_string(),
            ListKind::Default,
            self.category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            self.subcategories.clone(),
        );
        for seed in &self.items {
            if seed.id.trim().is_empty() || list.contains_item(&seed.id) {
                continue;
            }
            let name = if seed.name.trim().is_empty() {
                seed.id.clone()
            } else {
                seed.name.clone()
            };
            let mut item = Item::new(seed.id.clone(), name, seed.need);
            item.image = seed.image.clone();
            item.rarity = seed.rarity;
            item.subcategories = seed.subcategory.iter().cloned().collect();
            list.items.push(item);
        }
        list.normalize();
        list
    }
}

fn seed_item(id: &str, name: &str, rarity: Rarity, need: u32, subcategory: &str) -> SeedItem {
    SeedItem {
        id: id.to_string(),
        name: name.to_string(),
        image: format!("items/{}.png", id),
        rarity,
        need,
        subcategory: Some(subcategory.to_string()),
    }
}

/// Seeds used when config.toml does not define `default_lists`
pub fn builtin_seeds() -> Vec<SeedList> {
    vec![
        SeedList {
            id: "workbench-upgrades".into(),
            name: "Workbench Upgrades".into(),
            category: Some("Crafting".into()),
            subcategories: vec!["Metal".into(), "Tech".into(), "Cores".into()],
            items: vec![
                seed_item("metal-parts", "Metal Parts", Rarity::Common, 40, "Metal"),
                seed_item("steel-spring", "Steel Spring", Rarity::Uncommon, 12, "Metal"),
                seed_item("wires", "Wires", Rarity::Uncommon, 20, "Tech"),
                seed_item("energy-cell", "Energy Cell", Rarity::Rare, 8, "Cores"),
            ],
        },
        SeedList {
            id: "expedition-project".into(),
            name: "Expedition Project".into(),
            category: Some("Progression".into()),
            subcategories: vec!["Phase 1".into(), "Phase 2".into()],
            items: vec![
                seed_item("metal-parts", "Metal Parts", Rarity::Common, 150, "Phase 1"),
                seed_item("energy-cell", "Energy Cell", Rarity::Rare, 6, "Phase 2"),
                seed_item("reactor-core", "Reactor Core", Rarity::Epic, 2, "Phase 2"),
            ],
        },
        SeedList {
            id: "quest-items".into(),
            name: "Quest Items".into(),
            category: Some("Progression".into()),
            subcategories: Vec::new(),
            items: vec![seed_item(
                "ancient-relic",
                "Ancient Relic",
                Rarity::Legendary,
                1,
                "General",
            )],
        },
    ]
}
