//! Catalog categories matching the POS inventory tabs.
//!
//! Inventory documents describe their kind through overlapping signals: a
//! free-text `category`, `isAccessory`/`isCustomItem` flags, and the item
//! name itself. [`classify`] resolves them through a fixed, ordered rule
//! list so every call site agrees on the outcome.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Category assigned to every catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Devices,
    Accessories,
    Screens,
    /// Labelled "Others" in the storefront.
    Custom,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Devices, Self::Accessories, Self::Screens, Self::Custom];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Devices => "Devices",
            Self::Accessories => "Accessories",
            Self::Screens => "Screens",
            Self::Custom => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Devices => "devices",
            Self::Accessories => "accessories",
            Self::Screens => "screens",
            Self::Custom => "custom",
        })
    }
}

/// Tab selection for browsing. `All` is a filter only and is never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "devices" => Ok(Self::Only(Category::Devices)),
            "accessories" => Ok(Self::Only(Category::Accessories)),
            "screens" => Ok(Self::Only(Category::Screens)),
            "custom" | "others" => Ok(Self::Only(Category::Custom)),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// The attributes classification looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryInput<'a> {
    pub name: &'a str,
    /// Raw, store-defined category string.
    pub category: &'a str,
    pub is_accessory: bool,
    pub is_custom_item: bool,
}

/// Lower-cased view computed once per classification.
struct Signals {
    name: String,
    category: String,
    is_accessory: bool,
    is_custom_item: bool,
}

type Rule = (Category, fn(&Signals) -> bool);

/// Evaluated top to bottom; the first match wins.
const RULES: [Rule; 3] = [
    (Category::Custom, |s| {
        s.is_custom_item || s.category == "custom item"
    }),
    (Category::Screens, |s| {
        s.category == "screen"
            || s.category == "screens"
            || s.name.contains("screen")
            || s.name.contains("display")
    }),
    (Category::Accessories, |s| {
        s.is_accessory || s.category == "accessory"
    }),
];

/// Assign exactly one [`Category`] to an item.
///
/// Custom items win over screens, screens over accessories, and anything
/// left over is a device.
#[must_use]
pub fn classify(item: CategoryInput<'_>) -> Category {
    let signals = Signals {
        name: item.name.to_lowercase(),
        category: item.category.to_lowercase(),
        is_accessory: item.is_accessory,
        is_custom_item: item.is_custom_item,
    };

    RULES
        .iter()
        .find(|(_, applies)| applies(&signals))
        .map_or(Category::Devices, |(category, _)| *category)
}
