//! # Cart store
//!
//! The cart is a session-scoped list of [`CartLine`]s. Two lines with the same product id and the same variation
//! signature are the same line, so adding the same product/variation combination again bumps the quantity instead of
//! appending a duplicate.
//!
//! None of the cart operations fail. Nonsensical input (zero or negative quantities, unknown product ids) degrades to
//! a no-op or a removal. Persistence goes through the [`CartStorage`] trait so that the store can be backed by memory,
//! a session file, or anything else; storage failures are logged and otherwise ignored.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{variation_label, Product, Shillings, Variations};

#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("Could not access cart storage. {0}")]
    Io(#[from] std::io::Error),
    #[error("Cart data is corrupt. {0}")]
    Serialization(#[from] serde_json::Error),
}

//--------------------------------------      CartLine       ----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    #[serde(default)]
    pub variations: Variations,
}

/// The merge identity of a cart line: product id plus the variation signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartLineKey {
    pub product_id: i64,
    pub signature: String,
}

impl CartLine {
    pub fn key(&self) -> CartLineKey {
        CartLineKey { product_id: self.product.id, signature: variation_signature(&self.variations) }
    }

    /// Uses the price currently held on the product reference.
    pub fn line_total(&self) -> Shillings {
        self.product.price * self.quantity
    }

    pub fn variation_label(&self) -> Option<String> {
        variation_label(&self.variations)
    }
}

/// Canonical serialization of a set of variation choices. Keys come out sorted because `Variations` is a `BTreeMap`.
pub fn variation_signature(variations: &Variations) -> String {
    variations.iter().map(|(k, v)| format!("{k:?}={v:?}")).collect::<Vec<_>>().join(";")
}

//--------------------------------------    CartStorage      ----------------------------------------------------------
/// Load/save interface for cart persistence. Implementations only need to survive for one browsing session.
pub trait CartStorage {
    fn load(&self) -> Result<Vec<CartLine>, CartStorageError>;
    fn save(&mut self, lines: &[CartLine]) -> Result<(), CartStorageError>;
    fn clear(&mut self) -> Result<(), CartStorageError>;
}

/// Keeps the cart in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    lines: Vec<CartLine>,
    saves: usize,
}

impl MemoryCartStorage {
    pub fn with_lines(lines: Vec<CartLine>) -> Self {
        Self { lines, saves: 0 }
    }

    pub fn saved_lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Result<Vec<CartLine>, CartStorageError> {
        Ok(self.lines.clone())
    }

    fn save(&mut self, lines: &[CartLine]) -> Result<(), CartStorageError> {
        self.lines = lines.to_vec();
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CartStorageError> {
        self.lines.clear();
        Ok(())
    }
}

/// Stores the cart as JSON in a per-session file. Removing the file ends the session's cart.
#[derive(Debug, Clone)]
pub struct JsonFileCartStorage {
    path: PathBuf,
}

impl JsonFileCartStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileCartStorage {
    fn load(&self) -> Result<Vec<CartLine>, CartStorageError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, lines: &[CartLine]) -> Result<(), CartStorageError> {
        let data = serde_json::to_string(lines)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CartStorageError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

//--------------------------------------     CartStore       ----------------------------------------------------------
#[derive(Debug)]
pub struct CartStore<S> {
    lines: Vec<CartLine>,
    storage: S,
    open: bool,
}

impl<S: CartStorage> CartStore<S> {
    /// Creates a cart, restoring any lines that the storage already holds for this session.
    pub fn new(storage: S) -> Self {
        let lines = storage.load().unwrap_or_else(|e| {
            warn!("🛒 Could not restore the saved cart, starting with an empty one. {e}");
            Vec::new()
        });
        Self { lines, storage, open: false }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Presentation signal only: true once something has been added and the cart has not been closed since.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Adds `quantity` of the product with the given variations, merging into an existing line with the same key.
    /// Non-positive quantities are ignored.
    pub fn add_line(&mut self, product: Product, quantity: i64, variations: Option<Variations>) {
        if quantity <= 0 {
            debug!("🛒 Ignoring add of {quantity} x {}", product.name);
            return;
        }
        let line = CartLine { product, quantity, variations: variations.unwrap_or_default() };
        let key = line.key();
        match self.lines.iter_mut().find(|l| l.key() == key) {
            Some(existing) => {
                existing.quantity += quantity;
                trace!("🛒 {} now has quantity {}", existing.product.name, existing.quantity);
            },
            None => {
                trace!("🛒 New cart line for {}", line.product.name);
                self.lines.push(line);
            },
        }
        self.open = true;
        self.persist();
    }

    /// Removes every line for this product, whatever variations were chosen.
    pub fn remove_line(&mut self, product_id: i64) {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        if self.lines.len() != before {
            self.persist();
        }
    }

    /// Sets the quantity on the first line for this product. `n <= 0` removes the product entirely.
    pub fn set_quantity(&mut self, product_id: i64, n: i64) {
        if n <= 0 {
            self.remove_line(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = n;
            self.persist();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        if let Err(e) = self.storage.clear() {
            warn!("🛒 Could not clear cart storage. {e}");
        }
    }

    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total_price(&self) -> Shillings {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Replaces each line's product reference with the current catalog record so that totals reflect today's prices.
    /// Lines whose product is no longer in `catalog` are dropped. Returns the number of dropped lines.
    pub fn refresh_products(&mut self, catalog: &[Product]) -> usize {
        let before = self.lines.len();
        self.lines.retain_mut(|line| match catalog.iter().find(|p| p.id == line.product.id) {
            Some(current) => {
                if current.price != line.product.price {
                    debug!("🛒 Price of {} changed from {} to {}", current.name, line.product.price, current.price);
                }
                line.product = current.clone();
                true
            },
            None => {
                info!("🛒 {} is no longer available and was removed from the cart", line.product.name);
                false
            },
        });
        let dropped = before - self.lines.len();
        self.persist();
        dropped
    }

    fn persist(&mut self) {
        if let Err(e) = self.storage.save(&self.lines) {
            warn!("🛒 Could not save the cart. Changes will be lost when the session ends. {e}");
        }
    }
}
