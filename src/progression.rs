//! Persistent player progression
//!
//! Currency and playtime accrue every frame and are written back only when
//! playtime crosses a flush boundary. Ownership, the equipped skin and the map
//! expansion are written immediately when they change.
//!
//! Every key is read independently at load; anything missing or unreadable
//! falls back to its default without affecting the others.

use std::collections::BTreeSet;

use crate::persistence::{KeyValueStore, write_best_effort};
use crate::shop::{self, Cosmetic, STARTER_ID, ShopError};
use crate::tuning::EconomyTuning;

/// Storage keys
pub mod keys {
    pub const CURRENCY: &str = "currency";
    pub const PLAYTIME: &str = "playtimeSeconds";
    pub const OWNED: &str = "ownedCosmetics";
    pub const ACTIVE: &str = "activeCosmetic";
    pub const MAP_EXPANDED: &str = "mapExpanded";
}

/// Player progression backed by a key-value store
#[derive(Debug)]
pub struct ProgressionStore<S: KeyValueStore> {
    storage: S,
    economy: EconomyTuning,
    currency: f64,
    playtime: f64,
    owned: BTreeSet<String>,
    active: Cosmetic,
    map_expanded: bool,
    /// Flush interval index of the last periodic write
    last_flush_bucket: u64,
}

impl<S: KeyValueStore> ProgressionStore<S> {
    /// Read progression from `storage`, using defaults for anything absent or malformed
    pub fn load(storage: S, economy: EconomyTuning) -> Self {
        let currency = read_amount(&storage, keys::CURRENCY);
        let playtime = read_amount(&storage, keys::PLAYTIME);

        let mut owned: BTreeSet<String> = match storage.get(keys::OWNED) {
            Some(json) => match serde_json::from_str::<Vec<String>>(&json) {
                Ok(ids) => ids.into_iter().filter(|id| shop::find(id).is_some()).collect(),
                Err(e) => {
                    log::warn!("Unreadable owned cosmetics, resetting: {}", e);
                    BTreeSet::new()
                }
            },
            None => BTreeSet::new(),
        };
        owned.insert(STARTER_ID.to_string());

        let active = storage
            .get(keys::ACTIVE)
            .and_then(|json| match serde_json::from_str::<Cosmetic>(&json) {
                Ok(c) => Some(c),
                Err(e) => {
                    log::warn!("Unreadable active cosmetic, using starter: {}", e);
                    None
                }
            })
            .filter(|c| owned.contains(&c.id))
            .and_then(|c| shop::find(&c.id))
            .map(|entry| entry.to_cosmetic())
            .unwrap_or_else(shop::starter);

        let map_expanded = storage
            .get(keys::MAP_EXPANDED)
            .is_some_and(|v| v.trim() == "true");

        let last_flush_bucket = playtime.floor() as u64 / economy.flush_interval_secs.max(1);

        log::info!(
            "Loaded progression: {:.4} currency, {:.0}s played, {} cosmetics owned, expanded: {}",
            currency,
            playtime,
            owned.len(),
            map_expanded
        );

        Self {
            storage,
            economy,
            currency,
            playtime,
            owned,
            active,
            map_expanded,
            last_flush_bucket,
        }
    }

    pub fn currency(&self) -> f64 {
        self.currency
    }

    pub fn playtime(&self) -> f64 {
        self.playtime
    }

    pub fn owned(&self) -> impl Iterator<Item = &str> {
        self.owned.iter().map(String::as_str)
    }

    pub fn is_owned(&self, id: &str) -> bool {
        self.owned.contains(id)
    }

    pub fn active(&self) -> &Cosmetic {
        &self.active
    }

    pub fn map_expanded(&self) -> bool {
        self.map_expanded
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Earn currency for `dt_seconds` of play
    pub fn accrue(&mut self, dt_seconds: f64) {
        if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return;
        }
        self.currency += dt_seconds * self.economy.rate_per_second();
        self.playtime += dt_seconds;
    }

    /// Persist currency and playtime if playtime crossed a flush boundary.
    ///
    /// This writes once per interval, when `floor(playtime) / interval` changes,
    /// rather than on every frame while `floor(playtime) % interval == 0`. A
    /// frame that jumps over a boundary still writes, and a fresh save's first
    /// second is not written until the first boundary.
    ///
    /// Returns whether a write happened.
    pub fn flush_periodic(&mut self) -> bool {
        let bucket = self.playtime.floor() as u64 / self.economy.flush_interval_secs.max(1);
        if bucket == self.last_flush_bucket {
            return false;
        }
        self.last_flush_bucket = bucket;
        self.write_balance();
        log::debug!("Progress flushed at {:.0}s", self.playtime);
        true
    }

    /// Persist everything (e.g. before the page unloads)
    pub fn flush_all(&mut self) {
        self.write_balance();
        self.write_cosmetics();
        self.write_expansion();
    }

    /// Buy `item_id` for `cost` and equip it
    pub fn purchase(&mut self, item_id: &str, cost: f64) -> Result<(), ShopError> {
        self.check_cost(cost)?;
        if self.owned.contains(item_id) {
            return Err(self.reject(ShopError::AlreadyOwned(item_id.to_string())));
        }
        let Some(entry) = shop::find(item_id) else {
            return Err(self.reject(ShopError::UnknownItem(item_id.to_string())));
        };
        if self.currency < cost {
            let err = ShopError::InsufficientFunds {
                cost,
                available: self.currency,
            };
            return Err(self.reject(err));
        }

        self.currency -= cost;
        self.owned.insert(item_id.to_string());
        self.active = entry.to_cosmetic();
        self.write_cosmetics();
        self.write_balance();
        log::info!("Purchased {} for {}", item_id, cost);
        Ok(())
    }

    /// Equip an already-owned cosmetic
    pub fn select_owned(&mut self, item_id: &str) -> Result<(), ShopError> {
        if !self.owned.contains(item_id) {
            return Err(self.reject(ShopError::NotOwned(item_id.to_string())));
        }
        if self.active.id == item_id {
            return Ok(());
        }
        let Some(entry) = shop::find(item_id) else {
            return Err(self.reject(ShopError::UnknownItem(item_id.to_string())));
        };
        self.active = entry.to_cosmetic();
        let json = self.active_json();
        write_best_effort(&mut self.storage, keys::ACTIVE, &json);
        log::info!("Equipped {}", item_id);
        Ok(())
    }

    /// Shop button behaviour: equip if owned, otherwise buy at catalog price
    pub fn buy_or_equip(&mut self, item_id: &str) -> Result<(), ShopError> {
        if self.owned.contains(item_id) {
            return self.select_owned(item_id);
        }
        match shop::find(item_id) {
            Some(entry) => self.purchase(item_id, entry.cost),
            None => Err(self.reject(ShopError::UnknownItem(item_id.to_string()))),
        }
    }

    /// Buy the one-time map expansion.
    ///
    /// `Ok` means the world has to be rebuilt with the larger bounds.
    pub fn apply_map_expansion(&mut self, cost: f64) -> Result<(), ShopError> {
        self.check_cost(cost)?;
        if self.map_expanded {
            return Err(self.reject(ShopError::AlreadyExpanded));
        }
        if self.currency < cost {
            let err = ShopError::InsufficientFunds {
                cost,
                available: self.currency,
            };
            return Err(self.reject(err));
        }

        self.currency -= cost;
        self.map_expanded = true;
        self.write_expansion();
        self.write_balance();
        log::info!("Map expansion purchased for {}", cost);
        Ok(())
    }

    /// Costs come from the caller, so keep currency finite and non-negative
    fn check_cost(&self, cost: f64) -> Result<(), ShopError> {
        if cost.is_finite() && cost >= 0.0 {
            Ok(())
        } else {
            Err(self.reject(ShopError::InvalidCost(cost)))
        }
    }

    fn reject(&self, err: ShopError) -> ShopError {
        log::debug!("Shop action rejected: {}", err);
        err
    }

    fn active_json(&self) -> String {
        serde_json::to_string(&self.active).unwrap_or_default()
    }

    fn write_balance(&mut self) {
        write_best_effort(&mut self.storage, keys::CURRENCY, &self.currency.to_string());
        write_best_effort(&mut self.storage, keys::PLAYTIME, &self.playtime.to_string());
    }

    fn write_cosmetics(&mut self) {
        let owned: Vec<&str> = self.owned.iter().map(String::as_str).collect();
        if let Ok(json) = serde_json::to_string(&owned) {
            write_best_effort(&mut self.storage, keys::OWNED, &json);
        }
        let active = self.active_json();
        write_best_effort(&mut self.storage, keys::ACTIVE, &active);
    }

    fn write_expansion(&mut self) {
        let flag = if self.map_expanded { "true" } else { "false" };
        write_best_effort(&mut self.storage, keys::MAP_EXPANDED, flag);
    }
}

/// Non-negative finite number, or 0
fn read_amount(storage: &impl KeyValueStore, key: &str) -> f64 {
    let Some(raw) = storage.get(key) else {
        return 0.0;
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            log::warn!("Ignoring malformed `{}` value {:?}", key, raw);
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::persistence::testing::ReadOnlyStore;

    fn fresh() -> ProgressionStore<MemoryStore> {
        ProgressionStore::load(MemoryStore::new(), EconomyTuning::default())
    }

    fn with_currency(amount: f64) -> ProgressionStore<MemoryStore> {
        let amount = amount.to_string();
        let store = MemoryStore::with_values([(keys::CURRENCY, amount.as_str())]);
        ProgressionStore::load(store, EconomyTuning::default())
    }

    #[test]
    fn test_defaults_on_empty_storage() {
        let p = fresh();
        assert_eq!(p.currency(), 0.0);
        assert_eq!(p.playtime(), 0.0);
        assert_eq!(p.owned().collect::<Vec<_>>(), vec!["c1"]);
        assert_eq!(p.active().id, "c1");
        assert!(!p.map_expanded());
    }

    #[test]
    fn test_malformed_values_fall_back_independently() {
        let store = MemoryStore::with_values([
            (keys::CURRENCY, "lots"),
            (keys::PLAYTIME, "120.5"),
            (keys::OWNED, "[c2"),
            (keys::ACTIVE, "{not json"),
            (keys::MAP_EXPANDED, "true"),
        ]);
        let p = ProgressionStore::load(store, EconomyTuning::default());
        assert_eq!(p.currency(), 0.0);
        assert_eq!(p.playtime(), 120.5);
        assert_eq!(p.owned().collect::<Vec<_>>(), vec!["c1"]);
        assert_eq!(p.active().id, "c1");
        assert!(p.map_expanded());
    }

    #[test]
    fn test_negative_and_nan_amounts_rejected() {
        let store = MemoryStore::with_values([(keys::CURRENCY, "-50"), (keys::PLAYTIME, "NaN")]);
        let p = ProgressionStore::load(store, EconomyTuning::default());
        assert_eq!(p.currency(), 0.0);
        assert_eq!(p.playtime(), 0.0);
    }

    #[test]
    fn test_loads_saved_state() {
        let store = MemoryStore::with_values([
            (keys::CURRENCY, "250.5"),
            (keys::OWNED, r#"["c1","c3","p2"]"#),
            (keys::ACTIVE, r##"{"id":"c3","color":"#10b981","cost":200,"design":"default"}"##),
        ]);
        let p = ProgressionStore::load(store, EconomyTuning::default());
        assert_eq!(p.currency(), 250.5);
        assert!(p.is_owned("c3") && p.is_owned("p2"));
        assert_eq!(p.active().color, "#10b981");
    }

    #[test]
    fn test_active_must_be_owned() {
        let store = MemoryStore::with_values([(
            keys::ACTIVE,
            r##"{"id":"p8","color":"#000000","cost":100000}"##,
        )]);
        let p = ProgressionStore::load(store, EconomyTuning::default());
        assert_eq!(p.active().id, "c1");
    }

    #[test]
    fn test_accrue_five_seconds() {
        let mut p = fresh();
        p.accrue(5.0);
        assert!((p.currency() - 5.0 * 10.0 / 86400.0).abs() < 1e-15);
        assert_eq!(p.playtime(), 5.0);
    }

    #[test]
    fn test_accrue_ignores_bad_deltas() {
        let mut p = fresh();
        p.accrue(-3.0);
        p.accrue(f64::NAN);
        assert_eq!(p.playtime(), 0.0);
    }

    #[test]
    fn test_periodic_flush_on_boundaries_only() {
        let mut p = fresh();
        p.accrue(4.9);
        assert!(!p.flush_periodic());
        assert_eq!(p.storage().get(keys::PLAYTIME), None);

        p.accrue(0.2);
        assert!(p.flush_periodic());
        let saved: f64 = p.storage().get(keys::PLAYTIME).unwrap().parse().unwrap();
        assert!((saved - 5.1).abs() < 1e-9);

        // Same interval: no rewrite
        p.accrue(1.0);
        assert!(!p.flush_periodic());

        // A long frame that skips past 10 still flushes
        p.accrue(7.0);
        assert!(p.flush_periodic());
    }

    #[test]
    fn test_purchase_insufficient_funds_is_noop() {
        let mut p = with_currency(50.0);
        let err = p.purchase("c2", 100.0).unwrap_err();
        assert!(matches!(err, ShopError::InsufficientFunds { .. }));
        assert_eq!(p.currency(), 50.0);
        assert!(!p.is_owned("c2"));
        assert_eq!(p.active().id, "c1");
        assert_eq!(p.storage().get(keys::OWNED), None);
    }

    #[test]
    fn test_purchase_success() {
        let mut p = with_currency(150.0);
        p.purchase("c2", 100.0).unwrap();
        assert_eq!(p.currency(), 50.0);
        assert!(p.is_owned("c2"));
        assert_eq!(p.active().id, "c2");
        assert_eq!(p.active().color, "#ef4444");

        // Flushed immediately
        let owned: Vec<String> =
            serde_json::from_str(&p.storage().get(keys::OWNED).unwrap()).unwrap();
        assert_eq!(owned, vec!["c1", "c2"]);
        let active: Cosmetic =
            serde_json::from_str(&p.storage().get(keys::ACTIVE).unwrap()).unwrap();
        assert_eq!(active.id, "c2");

        // Survives a reload
        let reloaded = ProgressionStore::load(p.storage().clone(), EconomyTuning::default());
        assert_eq!(reloaded.active().id, "c2");
        assert_eq!(reloaded.currency(), 50.0);
    }

    #[test]
    fn test_purchase_already_owned_or_unknown() {
        let mut p = with_currency(1000.0);
        assert_eq!(p.purchase("c1", 0.0), Err(ShopError::AlreadyOwned("c1".into())));
        assert_eq!(p.purchase("zz", 1.0), Err(ShopError::UnknownItem("zz".into())));
        assert_eq!(p.currency(), 1000.0);
    }

    #[test]
    fn test_negative_or_nan_cost_rejected() {
        let mut p = with_currency(50.0);
        assert!(matches!(p.purchase("c2", -1000.0), Err(ShopError::InvalidCost(_))));
        assert!(matches!(p.purchase("c3", f64::NAN), Err(ShopError::InvalidCost(_))));
        assert!(matches!(
            p.apply_map_expansion(f64::INFINITY),
            Err(ShopError::InvalidCost(_))
        ));
        assert!(matches!(p.apply_map_expansion(-1.0), Err(ShopError::InvalidCost(_))));
        assert_eq!(p.currency(), 50.0);
        assert!(!p.is_owned("c2") && !p.is_owned("c3"));
        assert!(!p.map_expanded());
        assert_eq!(p.storage().get(keys::OWNED), None);
    }

    #[test]
    fn test_select_owned() {
        let mut p = with_currency(500.0);
        p.purchase("c3", 200.0).unwrap();
        p.select_owned("c1").unwrap();
        assert_eq!(p.active().id, "c1");

        // Written straight away and restored on reload
        let stored: Cosmetic =
            serde_json::from_str(&p.storage().get(keys::ACTIVE).unwrap()).unwrap();
        assert_eq!(stored.id, "c1");
        p.select_owned("c3").unwrap();
        let reloaded = ProgressionStore::load(p.storage().clone(), EconomyTuning::default());
        assert_eq!(reloaded.active().id, "c3");
        assert_eq!(reloaded.active().color, "#10b981");

        // Cannot equip what you do not own
        assert_eq!(p.select_owned("c8"), Err(ShopError::NotOwned("c8".into())));
        assert_eq!(p.active().id, "c3");
    }

    #[test]
    fn test_select_active_is_idempotent() {
        let mut p = with_currency(42.0);
        p.select_owned("c1").unwrap();
        p.select_owned("c1").unwrap();
        assert_eq!(p.active().id, "c1");
        assert_eq!(p.currency(), 42.0);
    }

    #[test]
    fn test_buy_or_equip() {
        let mut p = with_currency(120.0);
        p.buy_or_equip("c2").unwrap();
        assert_eq!(p.currency(), 20.0);
        p.buy_or_equip("c1").unwrap();
        assert_eq!(p.active().id, "c1");
        // Re-buying an owned item only equips it
        p.buy_or_equip("c2").unwrap();
        assert_eq!(p.currency(), 20.0);
        assert_eq!(p.active().id, "c2");
    }

    #[test]
    fn test_map_expansion() {
        let mut p = with_currency(9000.0);
        p.apply_map_expansion(8000.0).unwrap();
        assert_eq!(p.currency(), 1000.0);
        assert!(p.map_expanded());
        assert_eq!(p.storage().get(keys::MAP_EXPANDED).as_deref(), Some("true"));

        assert_eq!(p.apply_map_expansion(8000.0), Err(ShopError::AlreadyExpanded));
        assert_eq!(p.currency(), 1000.0);
    }

    #[test]
    fn test_map_expansion_needs_funds() {
        let mut p = with_currency(7999.0);
        assert!(p.apply_map_expansion(8000.0).is_err());
        assert!(!p.map_expanded());
        assert_eq!(p.currency(), 7999.0);
    }

    #[test]
    fn test_write_failures_do_not_block_progress() {
        let store = ReadOnlyStore {
            inner: MemoryStore::with_values([(keys::CURRENCY, "300")]),
        };
        let mut p = ProgressionStore::load(store, EconomyTuning::default());
        p.purchase("c2", 100.0).unwrap();
        assert_eq!(p.currency(), 200.0);
        assert_eq!(p.active().id, "c2");
    }
}
