//! Top-level game owner
//!
//! `Engine` owns the world, the progression store and the pending input, and
//! is driven one frame at a time by the host. Shop actions arrive here as
//! discrete calls between frames, never from inside a tick.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::hud::HudSnapshot;
use crate::persistence::KeyValueStore;
use crate::progression::ProgressionStore;
use crate::shop::ShopError;
use crate::sim::{CommandQueue, GameState, InputState, Viewport, tick};
use crate::tuning::Tuning;

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Fixed ticks simulated
    pub ticks: u32,
    /// Vehicle bounced off an obstacle during this frame
    pub hit_obstacle: bool,
    /// Progress was written to storage
    pub flushed: bool,
}

pub struct Engine<S: KeyValueStore> {
    pub state: GameState,
    pub progression: ProgressionStore<S>,
    pub input: InputState,
    pub commands: CommandQueue,
    tuning: Tuning,
    viewport: Viewport,
    /// Seeds world rebuilds
    rng: Pcg32,
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl<S: KeyValueStore> Engine<S> {
    /// Load progression from `storage` and build the matching world
    pub fn new(storage: S, tuning: Tuning, seed: u64) -> Self {
        let progression = ProgressionStore::load(storage, tuning.economy.clone());
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = GameState::with_rng(
            &mut rng,
            progression.map_expanded(),
            &tuning.world,
            &progression.active().color,
        );

        Self {
            state,
            progression,
            input: InputState::default(),
            commands: CommandQueue::new(),
            tuning,
            viewport: Viewport::new(0.0, 0.0),
            rng,
            accumulator: 0.0,
            last_time_ms: None,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.state.refresh_camera(viewport);
    }

    /// Run one host frame stamped with `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let dt = match self.last_time_ms {
            Some(last) => (now_ms - last) / 1000.0,
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        self.advance(dt)
    }

    /// Advance by `dt_secs` of real time.
    ///
    /// The full delta counts toward playtime and currency; vehicle stepping
    /// is capped so a long stall does not fast-forward the vehicle.
    pub fn advance(&mut self, dt_secs: f64) -> FrameReport {
        let dt_secs = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
        let mut report = FrameReport::default();

        self.progression.accrue(dt_secs);

        self.accumulator += (dt_secs as f32).min(MAX_FRAME_DT);
        while self.accumulator >= SIM_DT && report.ticks < MAX_SUBSTEPS {
            let outcome = tick(
                &mut self.state,
                &self.input,
                &mut self.commands,
                &self.tuning.vehicle,
            );
            report.hit_obstacle |= outcome.hit_obstacle;
            self.accumulator -= SIM_DT;
            report.ticks += 1;
        }
        if report.ticks == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.state.refresh_camera(self.viewport);
        report.flushed = self.progression.flush_periodic();
        report
    }

    /// Release all held directions (focus loss, tab hidden)
    pub fn release_input(&mut self) {
        self.input.clear();
        self.commands.toggle_released();
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::new(
            self.state.vehicle.speed,
            self.progression.playtime(),
            self.progression.currency(),
            self.state.vehicle.mode,
        )
    }

    pub fn purchase(&mut self, item_id: &str, cost: f64) -> Result<(), ShopError> {
        self.progression.purchase(item_id, cost)?;
        self.sync_color();
        Ok(())
    }

    pub fn select_owned(&mut self, item_id: &str) -> Result<(), ShopError> {
        self.progression.select_owned(item_id)?;
        self.sync_color();
        Ok(())
    }

    pub fn buy_or_equip(&mut self, item_id: &str) -> Result<(), ShopError> {
        self.progression.buy_or_equip(item_id)?;
        self.sync_color();
        Ok(())
    }

    /// Buy the map expansion and rebuild the world with the larger bounds
    pub fn apply_map_expansion(&mut self) -> Result<(), ShopError> {
        self.progression
            .apply_map_expansion(self.tuning.economy.expansion_cost)?;
        let seed = self.rng.random::<u64>();
        self.rebuild_world(seed);
        Ok(())
    }

    /// Replace the world wholesale; the vehicle respawns at the map centre
    pub fn rebuild_world(&mut self, seed: u64) {
        self.state = GameState::new(
            seed,
            self.progression.map_expanded(),
            &self.tuning.world,
            &self.progression.active().color,
        );
        self.accumulator = 0.0;
        self.input.clear();
        self.state.refresh_camera(self.viewport);
        log::info!("World rebuilt (seed {}, expanded: {})", seed, self.state.expanded);
    }

    /// Persist all progression (page unload)
    pub fn save(&mut self) {
        self.progression.flush_all();
    }

    fn sync_color(&mut self) {
        self.state.vehicle.color = self.progression.active().color.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::progression::keys;
    use crate::sim::VehicleMode;
    use glam::Vec2;

    fn engine_with(values: &[(&str, &str)]) -> Engine<MemoryStore> {
        let store = MemoryStore::with_values(values.iter().copied());
        Engine::new(store, Tuning::default(), 1234)
    }

    #[test]
    fn test_one_tick_per_sixtieth() {
        let mut engine = engine_with(&[]);
        for _ in 0..60 {
            let report = engine.advance(1.0 / 60.0);
            assert_eq!(report.ticks, 1);
        }
        assert_eq!(engine.state.time_ticks, 60);
        assert!((engine.progression.playtime() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut engine = engine_with(&[]);
        let report = engine.advance(30.0);
        assert_eq!(report.ticks, MAX_SUBSTEPS);
        // Playtime still counts the whole stall
        assert_eq!(engine.progression.playtime(), 30.0);
        assert!(report.flushed);
    }

    #[test]
    fn test_frame_uses_timestamps() {
        let mut engine = engine_with(&[]);
        assert_eq!(engine.frame(1000.0).ticks, 0);
        engine.frame(1000.0 + 1000.0 / 60.0);
        assert!((engine.progression.playtime() - 1.0 / 60.0).abs() < 1e-9);
        // Clock going backwards is ignored
        engine.frame(500.0);
        assert!((engine.progression.playtime() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_camera_centres_vehicle() {
        let mut engine = engine_with(&[]);
        engine.set_viewport(Viewport::new(1280.0, 720.0));
        engine.advance(1.0 / 60.0);
        let screen = engine.state.camera.world_to_screen(engine.state.vehicle.pos);
        assert!((screen - Vec2::new(640.0, 360.0)).length() < 1e-3);
    }

    #[test]
    fn test_toggle_command_reaches_vehicle() {
        let mut engine = engine_with(&[]);
        engine.commands.toggle_pressed();
        engine.advance(1.0 / 60.0);
        assert_eq!(engine.state.vehicle.mode, VehicleMode::Plane);
        assert_eq!(engine.hud().mode_label(), "PLANE");
    }

    #[test]
    fn test_purchase_recolours_vehicle() {
        let mut engine = engine_with(&[(keys::CURRENCY, "150")]);
        assert_eq!(engine.state.vehicle.color, "#ec4899");
        engine.buy_or_equip("c2").unwrap();
        assert_eq!(engine.state.vehicle.color, "#ef4444");

        // Rejected purchase leaves everything alone
        assert!(engine.buy_or_equip("c8").is_err());
        assert_eq!(engine.state.vehicle.color, "#ef4444");
        assert_eq!(engine.progression.currency(), 50.0);

        // A negative cost must not mint currency
        assert_eq!(engine.purchase("c3", -500.0), Err(ShopError::InvalidCost(-500.0)));
        assert_eq!(engine.progression.currency(), 50.0);
        assert_eq!(engine.state.vehicle.color, "#ef4444");
    }

    #[test]
    fn test_map_expansion_rebuilds_world() {
        let mut engine = engine_with(&[(keys::CURRENCY, "9000")]);
        assert_eq!(engine.state.field.len(), 300);
        assert_eq!(engine.state.map_size(), Vec2::new(8000.0, 8000.0));

        engine.apply_map_expansion().unwrap();
        assert_eq!(engine.progression.currency(), 1000.0);
        assert!(engine.progression.map_expanded());
        assert_eq!(engine.state.field.len(), 800);
        assert_eq!(engine.state.map_size(), Vec2::new(18000.0, 18000.0));
        assert_eq!(engine.state.vehicle.pos, Vec2::new(9000.0, 9000.0));

        // One-time purchase
        assert_eq!(engine.apply_map_expansion(), Err(ShopError::AlreadyExpanded));
        assert_eq!(engine.state.field.len(), 800);
    }

    #[test]
    fn test_expanded_flag_loads_large_world() {
        let engine = engine_with(&[(keys::MAP_EXPANDED, "true")]);
        assert_eq!(engine.state.field.len(), 800);
        assert!(engine.state.expanded);
    }

    #[test]
    fn test_save_writes_everything() {
        let mut engine = engine_with(&[]);
        engine.advance(1.0);
        engine.save();
        let store = engine.progression.storage();
        assert!(store.get(keys::CURRENCY).is_some());
        assert!(store.get(keys::PLAYTIME).is_some());
        assert_eq!(store.get(keys::MAP_EXPANDED).as_deref(), Some("false"));
    }
}
