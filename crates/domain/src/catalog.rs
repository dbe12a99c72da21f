//! The read-only menu a session orders from.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Identifier of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(u32);

impl MenuItemId {
    /// Creates a menu item ID from its numeric value.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MenuItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for MenuItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Unique item identifier.
    pub id: MenuItemId,

    /// Display name.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Short description shown under the name.
    #[serde(default)]
    pub description: String,

    /// Image reference (URL or asset path).
    #[serde(default, alias = "image")]
    pub image_ref: String,
}

impl MenuItem {
    /// Creates a new menu item.
    pub fn new(
        id: impl Into<MenuItemId>,
        name: impl Into<String>,
        price: Money,
        description: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            description: description.into(),
            image_ref: image_ref.into(),
        }
    }
}

/// Errors that can occur while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The menu file could not be read.
    #[error("Failed to read menu file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The menu file is not a valid JSON item list.
    #[error("Invalid menu data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two items share an ID.
    #[error("Duplicate menu item id: {0}")]
    DuplicateItem(MenuItemId),

    /// An item has a negative price.
    #[error("Menu item {id} has a negative price: {price}")]
    NegativePrice { id: MenuItemId, price: Money },

    /// An item costs more than [`MAX_ITEM_PRICE`].
    #[error("Menu item {id} price {price} exceeds the maximum of {MAX_ITEM_PRICE}")]
    PriceTooLarge { id: MenuItemId, price: Money },
}

/// Highest price a menu item may carry (RM1,000,000.00).
pub const MAX_ITEM_PRICE: Money = Money::from_cents(100_000_000);

/// Ordered, read-only list of orderable items with unique IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<MenuItem>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate IDs and out-of-range prices.
    pub fn new(items: Vec<MenuItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateItem(item.id));
            }
            if item.price.is_negative() {
                return Err(CatalogError::NegativePrice {
                    id: item.id,
                    price: item.price,
                });
            }
            if item.price > MAX_ITEM_PRICE {
                return Err(CatalogError::PriceTooLarge {
                    id: item.id,
                    price: item.price,
                });
            }
        }
        Ok(Self { items })
    }

    /// The restaurant's built-in demo menu.
    pub fn demo() -> Self {
        let items = vec![
            MenuItem::new(
                1,
                "Classic Burger",
                Money::from_cents(1899),
                "Beef patty with lettuce, tomato, and cheese",
                "images/classic-burger.jpg",
            ),
            MenuItem::new(
                2,
                "Chicken Sandwich",
                Money::from_cents(1599),
                "Grilled chicken breast with avocado and mayo",
                "images/chicken-sandwich.jpg",
            ),
            MenuItem::new(
                3,
                "Caesar Salad",
                Money::from_cents(1450),
                "Fresh romaine lettuce with Caesar dressing and croutons",
                "images/caesar-salad.jpg",
            ),
            MenuItem::new(
                4,
                "French Fries",
                Money::from_cents(850),
                "Crispy golden fries with sea salt",
                "images/french-fries.jpg",
            ),
            MenuItem::new(
                5,
                "Chocolate Milkshake",
                Money::from_cents(1099),
                "Rich chocolate shake with whipped cream",
                "images/chocolate-milkshake.jpg",
            ),
        ];
        Self { items }
    }

    /// Parses a JSON array of menu items.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<MenuItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    /// Loads a JSON menu file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), items = catalog.len(), "menu loaded");
        Ok(catalog)
    }

    /// Looks up an item by ID.
    pub fn get(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns all items in menu order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the menu has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
