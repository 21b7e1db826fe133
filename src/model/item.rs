use serde::{Deserialize, Serialize};

/// Item rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Parse a rarity name, case-insensitively
    pub fn parse_rarity(s: &str) -> Option<Rarity> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A trackable entity with its have/need counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity, shared across lists
    pub id: String,
    pub name: String,
    /// Image reference (URL or asset key); hosting is external
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rarity: Rarity,
    pub have: u32,
    pub need: u32,
    /// Labels this item is grouped under; always a non-empty subset of the
    /// owning list's subcategory order
    pub subcategories: Vec<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, need: u32) -> Self {
        Item {
            id: id.into(),
            name: name.into(),
            image: String::new(),
            rarity: Rarity::Common,
            have: 0,
            need,
            subcategories: Vec::new(),
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_subcategories(mut self, labels: &[&str]) -> Self {
        self.subcategories = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_have(mut self, have: u32) -> Self {
        self.have = have;
        self.clamp();
        self
    }

    /// Complete means there is a target and it has been reached
    pub fn is_complete(&self) -> bool {
        self.need > 0 && self.have >= self.need
    }

    /// Re-establish `have <= need`
    pub fn clamp(&mut self) {
        if self.have > self.need {
            self.have = self.need;
        }
    }
}
