//! Client-side cart: the browser cart widget's model, persisted through a
//! key/value store under [`STORAGE_KEY`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STORAGE_KEY: &str = "restaurantHubCart";
pub const CURRENCY_SYMBOL: &str = "₵";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cart storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Minimal key/value store, shaped like browser `localStorage`.
pub trait CartStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Keeps every key in one JSON object file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl CartStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Fails without writing when the existing file cannot be read, so other keys survive.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    /// Minor units.
    pub price: i64,
    pub quantity: u32,
    pub restaurant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartLine>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    /// `"<name> (<qty>x) - ₵<amount>"` per line.
    pub lines: Vec<String>,
    /// Distinct restaurants, first-seen order.
    pub restaurants: Vec<String>,
    pub total: String,
}

/// `1250` -> `"₵12.50"`.
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{CURRENCY_SYMBOL}{}.{:02}", abs / 100, abs % 100)
}

pub struct LocalCart<S: CartStorage> {
    storage: S,
    state: CartState,
}

impl<S: CartStorage> LocalCart<S> {
    /// Missing data gives an empty cart; unreadable data is logged and reset.
    pub fn load(storage: S) -> Self {
        let mut cart = Self {
            storage,
            state: CartState::default(),
        };

        let stored = match cart.storage.get(STORAGE_KEY) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "cart storage unreadable, starting empty");
                None
            }
        };

        if let Some(raw) = stored {
            match serde_json::from_str::<CartState>(&raw) {
                Ok(mut state) => {
                    state.total = compute_total(&state.items);
                    cart.state = state;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "corrupt cart data, resetting");
                    if let Err(err) = cart.save() {
                        tracing::warn!(error = %err, "failed to reset cart storage");
                    }
                }
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartLine] {
        &self.state.items
    }

    pub fn total(&self) -> i64 {
        self.state.total
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.state.items.iter().map(|line| line.quantity).sum()
    }

    pub fn currency_symbol(&self) -> &'static str {
        CURRENCY_SYMBOL
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Same name and restaurant bumps the quantity, anything else appends a line.
    pub fn add_item(
        &mut self,
        name: &str,
        price: i64,
        restaurant: &str,
        image: Option<&str>,
    ) -> Result<(), StorageError> {
        match self
            .state
            .items
            .iter_mut()
            .find(|line| line.name == name && line.restaurant == restaurant)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.state.items.push(CartLine {
                name: name.to_string(),
                price,
                quantity: 1,
                restaurant: restaurant.to_string(),
                image: image.map(str::to_string),
            }),
        }
        self.commit()
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_item(&mut self, index: usize) -> Result<(), StorageError> {
        if index >= self.state.items.len() {
            return Ok(());
        }
        self.state.items.remove(index);
        self.commit()
    }

    /// Adds `delta` to the line's quantity; a result of zero or less removes it.
    pub fn update_quantity(&mut self, index: usize, delta: i64) -> Result<(), StorageError> {
        let Some(line) = self.state.items.get_mut(index) else {
            return Ok(());
        };
        let next = i64::from(line.quantity).saturating_add(delta);
        if next <= 0 {
            self.state.items.remove(index);
        } else {
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
        self.commit()
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.state.items.clear();
        self.commit()
    }

    pub fn summary(&self) -> Option<CartSummary> {
        if self.is_empty() {
            return None;
        }

        let lines = self
            .state
            .items
            .iter()
            .map(|line| {
                format!(
                    "{} ({}x) - {}",
                    line.name,
                    line.quantity,
                    format_amount(line.line_total())
                )
            })
            .collect();

        let mut restaurants: Vec<String> = Vec::new();
        for line in &self.state.items {
            if !restaurants.contains(&line.restaurant) {
                restaurants.push(line.restaurant.clone());
            }
        }

        Some(CartSummary {
            lines,
            restaurants,
            total: format_amount(self.state.total),
        })
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.state.total = compute_total(&self.state.items);
        self.save()
    }

    fn save(&mut self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.state)?;
        self.storage.set(STORAGE_KEY, raw)
    }
}

fn compute_total(items: &[CartLine]) -> i64 {
    items
        .iter()
        .fold(0i64, |acc, line| acc.saturating_add(line.line_total()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> LocalCart<MemoryStorage> {
        LocalCart::load(MemoryStorage::new())
    }

    #[test]
    fn same_item_from_same_restaurant_is_merged() {
        let mut cart = cart();
        cart.add_item("Jollof Rice", 4500, "Sika Kitchen", None).unwrap();
        cart.add_item("Jollof Rice", 4500, "Sika Kitchen", None).unwrap();
        cart.add_item("Jollof Rice", 5000, "Auntie Muni", Some("/img/jollof.jpg"))
            .unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), 14_000);
    }

    #[test]
    fn quantity_changes_and_removal() {
        let mut cart = cart();
        cart.add_item("Waakye", 3000, "Sika Kitchen", None).unwrap();
        cart.add_item("Sobolo", 800, "Sika Kitchen", None).unwrap();

        cart.update_quantity(0, 2).unwrap();
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), 9_800);

        cart.update_quantity(1, -1).unwrap();
        assert_eq!(cart.items().len(), 1);

        cart.remove_item(5).unwrap();
        assert_eq!(cart.items().len(), 1);

        cart.remove_item(0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn mutations_are_persisted() {
        let mut cart = cart();
        cart.add_item("Kelewele", 1500, "Osu Grill", None).unwrap();

        let raw = cart.storage().get(STORAGE_KEY).unwrap().unwrap();
        let stored: CartState = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.total, 1500);

        let reloaded = LocalCart::load(cart.storage().clone());
        assert_eq!(reloaded.items(), cart.items());

        cart.clear().unwrap();
        let raw = cart.storage().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"items":[],"total":0}"#);
    }

    #[test]
    fn corrupt_data_resets_to_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "{not json".to_string()).unwrap();

        let cart = LocalCart::load(storage);
        assert!(cart.is_empty());
        assert_eq!(
            cart.storage().get(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"items":[],"total":0}"#)
        );
    }

    #[test]
    fn summary_lists_lines_restaurants_and_total() {
        let mut cart = cart();
        assert!(cart.summary().is_none());

        cart.add_item("Jollof Rice", 4500, "Sika Kitchen", None).unwrap();
        cart.add_item("Jollof Rice", 4500, "Sika Kitchen", None).unwrap();
        cart.add_item("Sobolo", 850, "Osu Grill", None).unwrap();
        cart.add_item("Banku", 2000, "Sika Kitchen", None).unwrap();

        let summary = cart.summary().unwrap();
        assert_eq!(
            summary.lines,
            [
                "Jollof Rice (2x) - ₵90.00",
                "Sobolo (1x) - ₵8.50",
                "Banku (1x) - ₵20.00",
            ]
        );
        assert_eq!(summary.restaurants, ["Sika Kitchen", "Osu Grill"]);
        assert_eq!(summary.total, "₵118.50");
        assert_eq!(cart.currency_symbol(), "₵");
    }

    #[test]
    fn amounts_are_formatted_with_two_decimals() {
        assert_eq!(format_amount(0), "₵0.00");
        assert_eq!(format_amount(5), "₵0.05");
        assert_eq!(format_amount(123_456), "₵1234.56");
        assert_eq!(format_amount(-250), "-₵2.50");
    }

    #[test]
    fn file_storage_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local-storage.json");

        let mut cart = LocalCart::load(FileStorage::new(&path));
        assert!(cart.is_empty());
        cart.add_item("Red Red", 2500, "Chop Bar", None).unwrap();
        cart.update_quantity(0, 1).unwrap();

        let mut other = FileStorage::new(&path);
        other.set("theme", "dark".to_string()).unwrap();

        let reloaded = LocalCart::load(FileStorage::new(&path));
        assert_eq!(reloaded.item_count(), 2);
        assert_eq!(reloaded.total(), 5000);
        assert_eq!(
            reloaded.storage().get("theme").unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn unreadable_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local-storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut storage = FileStorage::new(&path);
        let err = storage.set(STORAGE_KEY, "{}".to_string()).unwrap_err();
        assert!(matches!(err, StorageError::Encoding(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");

        let mut cart = LocalCart::load(FileStorage::new(&path));
        assert!(cart.is_empty());
        assert!(cart.add_item("Kelewele", 1500, "Chop Bar", None).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}
