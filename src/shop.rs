//! Cosmetic catalogs
//!
//! Two fixed price lists, one per vehicle mode. Entries are plain data; the
//! ownership rules live in `progression`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ID of the free starter skin every player owns
pub const STARTER_ID: &str = "c1";

/// Which catalog an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Car,
    Plane,
}

/// A purchasable colour/style variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cosmetic {
    pub id: String,
    pub color: String,
    pub cost: f64,
    #[serde(default = "default_style", alias = "design")]
    pub style: String,
}

fn default_style() -> String {
    "default".to_string()
}

/// Static catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub color: &'static str,
    pub cost: f64,
    pub style: &'static str,
}

impl CatalogEntry {
    const fn new(id: &'static str, color: &'static str, cost: f64, style: &'static str) -> Self {
        Self {
            id,
            color,
            cost,
            style,
        }
    }

    pub fn to_cosmetic(&self) -> Cosmetic {
        Cosmetic {
            id: self.id.to_string(),
            color: self.color.to_string(),
            cost: self.cost,
            style: self.style.to_string(),
        }
    }
}

pub const CAR_SHOP: [CatalogEntry; 8] = [
    CatalogEntry::new("c1", "#ec4899", 0.0, "default"),
    CatalogEntry::new("c2", "#ef4444", 100.0, "default"),
    CatalogEntry::new("c3", "#10b981", 200.0, "default"),
    CatalogEntry::new("c4", "#f59e0b", 500.0, "sport"),
    CatalogEntry::new("c5", "#8b5cf6", 1000.0, "sport"),
    CatalogEntry::new("c6", "#ffffff", 2000.0, "sport"),
    CatalogEntry::new("c7", "#3b82f6", 5000.0, "sport"),
    CatalogEntry::new("c8", "#000000", 10000.0, "sport"),
];

pub const PLANE_SHOP: [CatalogEntry; 8] = [
    CatalogEntry::new("p1", "#0ea5e9", 1000.0, "default"),
    CatalogEntry::new("p2", "#a855f7", 4000.0, "default"),
    CatalogEntry::new("p3", "#f97316", 7000.0, "default"),
    CatalogEntry::new("p4", "#22c55e", 10000.0, "default"),
    CatalogEntry::new("p5", "#ef4444", 17000.0, "default"),
    CatalogEntry::new("p6", "#ffffff", 20000.0, "default"),
    CatalogEntry::new("p7", "#facc15", 50000.0, "default"),
    CatalogEntry::new("p8", "#000000", 100000.0, "default"),
];

/// Entries of one catalog
pub fn catalog(kind: CatalogKind) -> &'static [CatalogEntry] {
    match kind {
        CatalogKind::Car => &CAR_SHOP,
        CatalogKind::Plane => &PLANE_SHOP,
    }
}

/// Look an ID up across both catalogs
pub fn find(id: &str) -> Option<&'static CatalogEntry> {
    CAR_SHOP.iter().chain(PLANE_SHOP.iter()).find(|e| e.id == id)
}

/// The free starter skin
pub fn starter() -> Cosmetic {
    CAR_SHOP[0].to_cosmetic()
}

/// Why a purchase-class operation was rejected. State is unchanged on every error.
#[derive(Debug, Error, PartialEq)]
pub enum ShopError {
    #[error("no catalog entry with id `{0}`")]
    UnknownItem(String),
    #[error("`{0}` is already owned")]
    AlreadyOwned(String),
    #[error("`{0}` is not owned")]
    NotOwned(String),
    #[error("costs {cost} but only {available:.2} available")]
    InsufficientFunds { cost: f64, available: f64 },
    #[error("invalid cost {0}")]
    InvalidCost(f64),
    #[error("map is already expanded")]
    AlreadyExpanded,
}
