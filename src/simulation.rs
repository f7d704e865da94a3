//! Simulation state, the per-frame loop, and the Bevy plugin that drives it.
//!
//! ## Frame order
//!
//! | Step | Schedule      | System                        | Purpose                                      |
//! |------|---------------|-------------------------------|----------------------------------------------|
//! | 1    | `FixedUpdate` | `field_step_system`           | Move, record, link, and deflect every particle |
//! | 2    | `Update`      | `tick_notification_system`    | Advance the notification timer               |
//! | 3    | `Update`      | `intent_clear_system` + input | Read pointer and keys into `FieldIntent`     |
//! | 4    | `Update`      | `apply_intent_system`         | Spawn/delete/clear, mode and overlay toggles |
//! | 5    | `Update`      | `notification_display_system` | Fade/grow the notification text              |
//! | 6    | `Update`      | `debug_overlay_system` etc.   | FPS, live count, key help                    |
//!
//! Velocities are in units per step, so the step runs on the fixed clock
//! (`simulation_hz`, 60 by default) rather than once per rendered frame.  It
//! records into [`DrawList`], which the render plugin replays every frame.
//!
//! The collection is only mutated in step 4, outside the fixed step, so step 1
//! can walk it by index without any invalidation concerns.

use crate::config::FieldConfig;
use crate::force_field::{self, FieldMode, ForceParams};
use crate::constants::SIMULATION_HZ;
use crate::graphics::{Canvas, DrawList};
use crate::input::{
    intent_clear_system, keyboard_to_intent_system, pointer_to_intent_system, FieldIntent,
};
use crate::links::{render_link, Endpoint, LinkStyle};
use crate::notification::Notification;
use crate::particle::{Bounce, Bounds, ParticleField};
use crate::rendering::{
    debug_overlay_system, help_overlay_system, notification_display_system, OverlayState,
};
use crate::spatial_partition::{NeighborSearch, NeighborSelector};
use bevy::color::Alpha;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Colour of the pointer end of pointer links and of the pointer ring.
pub const POINTER_COLOR: Srgba = Srgba::WHITE;

// ── Resources ─────────────────────────────────────────────────────────────────

/// Random source for spawning and bounce jitter.
#[derive(Resource)]
pub struct FieldRng(pub StdRng);

impl FieldRng {
    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl Default for FieldRng {
    fn default() -> Self {
        Self::new(None)
    }
}

/// All mutable simulation state, owned by the frame loop.
#[derive(Resource, Debug, Clone, Default)]
pub struct FieldState {
    pub field: ParticleField,
    pub mode: FieldMode,
    /// While set, particles are drawn and deflected but do not move.
    pub paused: bool,
    pub notification: Notification,
    /// Fixed steps run so far.
    pub steps: u64,
}

impl FieldState {
    pub fn new(config: &FieldConfig) -> Self {
        Self {
            notification: Notification::from_config(config),
            ..Default::default()
        }
    }

    fn set_mode(&mut self, mode: FieldMode) {
        self.mode = mode;
        self.notification.trigger(mode.label());
        debug!("Mode set to {}", mode.label());
    }

    /// Apply one frame of user intent.  Runs strictly before [`FieldState::step`].
    pub fn apply_intent<R: Rng + ?Sized>(
        &mut self,
        intent: &FieldIntent,
        overlay: &mut OverlayState,
        bounds: Bounds,
        config: &FieldConfig,
        rng: &mut R,
    ) {
        if intent.toggle_pause {
            self.paused = !self.paused;
            self.notification
                .trigger(if self.paused { "PAUSE" } else { "RESUME" });
        }
        if intent.clear {
            self.field.clear();
            self.notification.trigger("CLEAR");
            debug!("Cleared all particles");
        }
        if let Some(mode) = intent.select_mode {
            self.set_mode(mode);
        }
        if intent.cycle_mode {
            self.set_mode(self.mode.next());
        }
        if intent.toggle_ring {
            overlay.show_ring = !overlay.show_ring;
        }
        if intent.toggle_debug {
            overlay.show_debug = !overlay.show_debug;
        }
        if intent.toggle_help {
            overlay.show_help = !overlay.show_help;
        }

        let Some(pointer) = intent.pointer else {
            return;
        };
        let batch = if intent.batch { config.batch_size } else { 1 };

        if intent.spawn {
            for _ in 0..batch {
                self.field.spawn_near(pointer, bounds, config, rng);
            }
            debug!("Spawned {batch} particle(s); live = {}", self.field.count());
        }
        if intent.delete {
            let mut removed = 0;
            while removed < batch
                && self
                    .field
                    .remove_nearest(pointer, config.interaction_radius)
                    .is_some()
            {
                removed += 1;
            }
            if removed > 0 {
                debug!("Deleted {removed} particle(s); live = {}", self.field.count());
            }
        }
    }

    /// Run one frame over every particle, drawing through `canvas`.
    ///
    /// For each particle in collection order: advance (unless paused), draw,
    /// link to its nearest neighbours, then apply the force field.  Afterwards
    /// the pointer is linked to its own nearest particles.
    #[allow(clippy::too_many_arguments)]
    pub fn step<S, R, C>(
        &mut self,
        pointer: Option<Vec2>,
        bounds: Bounds,
        config: &FieldConfig,
        overlay: &OverlayState,
        selector: &mut S,
        rng: &mut R,
        canvas: &mut C,
    ) where
        S: NeighborSelector + ?Sized,
        R: Rng + ?Sized,
        C: Canvas + ?Sized,
    {
        let bounce = Bounce::from(config);
        let force = ForceParams::from(config);
        let style = LinkStyle::from(config);
        let k = config.neighbor_count;

        self.steps += 1;
        selector.prepare(self.field.particles(), bounds);
        let mut neighbors = Vec::with_capacity(k);

        for i in 0..self.field.len() {
            if !self.paused {
                self.field.particles_mut()[i].advance(bounds, bounce, rng);
            }

            let particles = self.field.particles();
            let p = &particles[i];
            canvas.circle(p.position, p.radius, p.color);

            selector.nearest(p.position, particles, k, &mut neighbors);
            let a = endpoint(p.position, p.color);
            for &j in &neighbors {
                let q = &particles[j];
                render_link(canvas, a, endpoint(q.position, q.color), style);
            }

            if let Some(focus) = pointer {
                let p = &mut self.field.particles_mut()[i];
                force_field::apply(p.position, &mut p.velocity, focus, self.mode, force);
            }
        }

        let Some(focus) = pointer else {
            return;
        };
        let particles = self.field.particles();
        selector.nearest(focus, particles, k, &mut neighbors);
        let b = endpoint(focus, POINTER_COLOR);
        for &j in &neighbors {
            let q = &particles[j];
            render_link(canvas, endpoint(q.position, q.color), b, style);
        }
        if overlay.show_ring {
            canvas.ring(focus, config.interaction_radius, POINTER_COLOR.with_alpha(0.6));
        }
    }
}

fn endpoint(position: Vec2, color: Srgba) -> Endpoint {
    Endpoint { position, color }
}

/// Current primary-window size, or the configured size when there is no window.
pub fn viewport_bounds(windows: &Query<&Window, With<PrimaryWindow>>, config: &FieldConfig) -> Bounds {
    match windows.single() {
        Ok(window) => Bounds::new(window.width(), window.height()),
        Err(_) => Bounds::new(config.window_width, config.window_height),
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ParticleFieldPlugin;

impl Plugin for ParticleFieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FieldState>()
            .init_resource::<FieldRng>()
            .init_resource::<FieldIntent>()
            .init_resource::<OverlayState>()
            .init_resource::<NeighborSearch>()
            .init_resource::<DrawList>()
            .insert_resource(Time::<Fixed>::from_hz(f64::from(SIMULATION_HZ)))
            .add_systems(FixedUpdate, field_step_system)
            .add_systems(
                Update,
                (
                    tick_notification_system,
                    intent_clear_system,
                    keyboard_to_intent_system,
                    pointer_to_intent_system,
                    apply_intent_system,
                    notification_display_system,
                    debug_overlay_system,
                    help_overlay_system,
                )
                    .chain(),
            );
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Rebuild state from the loaded config and generate the initial population.
///
/// Must run after [`crate::config::load_field_config`].
pub fn setup_field_state(
    mut commands: Commands,
    config: Res<FieldConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let bounds = viewport_bounds(&windows, &config);
    let mut rng = FieldRng::new(config.rng_seed);
    let mut state = FieldState::new(&config);
    state
        .field
        .populate(config.initial_count, bounds, &config, &mut rng.0);
    info!(
        "Generated {} particles in {}x{}",
        state.field.count(),
        bounds.width,
        bounds.height
    );
    commands.insert_resource(state);
    commands.insert_resource(rng);
}

/// Apply the configured step rate to the fixed clock.
///
/// Must run after [`crate::config::load_field_config`].
pub fn setup_simulation_rate(config: Res<FieldConfig>, mut time: ResMut<Time<Fixed>>) {
    time.set_timestep_hz(f64::from(config.simulation_hz));
    info!("Simulation stepping at {} Hz", config.simulation_hz);
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Advance the notification timer by this frame's delta.
pub fn tick_notification_system(time: Res<Time>, mut state: ResMut<FieldState>) {
    state.notification.tick(time.delta_secs());
}

/// Apply this frame's [`FieldIntent`] to the simulation state.
pub fn apply_intent_system(
    intent: Res<FieldIntent>,
    mut state: ResMut<FieldState>,
    mut overlay: ResMut<OverlayState>,
    mut rng: ResMut<FieldRng>,
    config: Res<FieldConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let bounds = viewport_bounds(&windows, &config);
    state.apply_intent(&intent, &mut overlay, bounds, &config, &mut rng.0);
}

/// Run one fixed step of the particle loop, recording what it draws.
///
/// The pointer is the one read by the most recent `Update` pass.
#[allow(clippy::too_many_arguments)]
pub fn field_step_system(
    mut state: ResMut<FieldState>,
    mut selector: ResMut<NeighborSearch>,
    mut rng: ResMut<FieldRng>,
    mut draw: ResMut<DrawList>,
    intent: Res<FieldIntent>,
    overlay: Res<OverlayState>,
    config: Res<FieldConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let bounds = viewport_bounds(&windows, &config);
    let viewport = Vec2::new(bounds.width, bounds.height);
    draw.begin(viewport, config.trail_frames, config.trail_fade);
    state.step(
        intent.pointer,
        bounds,
        &config,
        &overlay,
        &mut *selector,
        &mut rng.0,
        &mut *draw,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial_partition::{BruteForce, SpatialGrid};

    const BOUNDS: Bounds = Bounds {
        width: 800.0,
        height: 600.0,
    };

    #[derive(Default)]
    struct Recorder {
        circles: Vec<(Vec2, f32, Srgba)>,
        lines: Vec<(Vec2, Vec2, f32, Srgba)>,
        rings: Vec<(Vec2, f32)>,
    }

    impl Canvas for Recorder {
        fn circle(&mut self, center: Vec2, radius: f32, color: Srgba) {
            self.circles.push((center, radius, color));
        }
        fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Srgba) {
            self.lines.push((from, to, thickness, color));
        }
        fn ring(&mut self, center: Vec2, radius: f32, _color: Srgba) {
            self.rings.push((center, radius));
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn brute() -> BruteForce {
        BruteForce { epsilon_sq: 1e-6 }
    }

    fn state_with(points: &[(Vec2, Vec2)]) -> FieldState {
        let mut state = FieldState::new(&FieldConfig::default());
        for &(position, velocity) in points {
            state.field.spawn(position, velocity, 5.0, Srgba::WHITE);
        }
        state
    }

    // ── apply_intent ──────────────────────────────────────────────────────────

    #[test]
    fn batch_spawn_adds_exactly_five() {
        let config = FieldConfig::default();
        let mut state = FieldState::new(&config);
        let mut overlay = OverlayState::default();
        let intent = FieldIntent {
            pointer: Some(Vec2::new(400.0, 300.0)),
            spawn: true,
            batch: true,
            ..Default::default()
        };
        state.apply_intent(&intent, &mut overlay, BOUNDS, &config, &mut rng());
        assert_eq!(state.field.len(), 5);
        assert_eq!(state.field.count(), state.field.len());
    }

    #[test]
    fn spawn_without_pointer_is_noop() {
        let config = FieldConfig::default();
        let mut state = FieldState::new(&config);
        let intent = FieldIntent {
            spawn: true,
            ..Default::default()
        };
        state.apply_intent(&intent, &mut OverlayState::default(), BOUNDS, &config, &mut rng());
        assert!(state.field.is_empty());
    }

    #[test]
    fn batch_delete_stops_when_nothing_in_range() {
        let config = FieldConfig::default();
        let mut state = state_with(&[
            (Vec2::new(100.0, 100.0), Vec2::ZERO),
            (Vec2::new(110.0, 100.0), Vec2::ZERO),
            (Vec2::new(300.0, 300.0), Vec2::ZERO),
        ]);
        let intent = FieldIntent {
            pointer: Some(Vec2::new(105.0, 100.0)),
            delete: true,
            batch: true,
            ..Default::default()
        };
        state.apply_intent(&intent, &mut OverlayState::default(), BOUNDS, &config, &mut rng());
        assert_eq!(state.field.len(), 1);
        assert_eq!(state.field.particles()[0].position, Vec2::new(300.0, 300.0));
    }

    #[test]
    fn pause_toggle_notifies_pause_then_resume() {
        let config = FieldConfig::default();
        let mut state = FieldState::new(&config);
        let mut overlay = OverlayState::default();
        let intent = FieldIntent {
            toggle_pause: true,
            ..Default::default()
        };
        state.apply_intent(&intent, &mut overlay, BOUNDS, &config, &mut rng());
        assert!(state.paused);
        assert_eq!(state.notification.text(), "PAUSE");
        state.apply_intent(&intent, &mut overlay, BOUNDS, &config, &mut rng());
        assert!(!state.paused);
        assert_eq!(state.notification.text(), "RESUME");
    }

    #[test]
    fn cycle_mode_notifies_new_mode() {
        let config = FieldConfig::default();
        let mut state = FieldState::new(&config);
        state.mode = FieldMode::Attract;
        let intent = FieldIntent {
            cycle_mode: true,
            ..Default::default()
        };
        state.apply_intent(&intent, &mut OverlayState::default(), BOUNDS, &config, &mut rng());
        assert_eq!(state.mode, FieldMode::Orbit);
        assert_eq!(state.notification.text(), "ORBIT");
        assert!(state.notification.is_active());
    }

    #[test]
    fn overlay_toggles_flip_flags_without_notifying() {
        let config = FieldConfig::default();
        let mut state = FieldState::new(&config);
        let mut overlay = OverlayState::default();
        let before = overlay.clone();
        let intent = FieldIntent {
            toggle_ring: true,
            toggle_debug: true,
            toggle_help: true,
            ..Default::default()
        };
        state.apply_intent(&intent, &mut overlay, BOUNDS, &config, &mut rng());
        assert_ne!(overlay.show_ring, before.show_ring);
        assert_ne!(overlay.show_debug, before.show_debug);
        assert_ne!(overlay.show_help, before.show_help);
        assert!(!state.notification.is_active());
    }

    // ── step ──────────────────────────────────────────────────────────────────

    #[test]
    fn step_draws_every_particle_and_moves_it() {
        let config = FieldConfig::default();
        let mut state = state_with(&[
            (Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0)),
            (Vec2::new(400.0, 400.0), Vec2::new(0.0, -1.0)),
        ]);
        let mut canvas = Recorder::default();
        state.step(None, BOUNDS, &config, &OverlayState::default(), &mut brute(), &mut rng(), &mut canvas);

        assert_eq!(canvas.circles.len(), 2);
        assert_eq!(state.field.particles()[0].position, Vec2::new(101.0, 100.0));
        assert_eq!(state.field.particles()[1].position, Vec2::new(400.0, 399.0));
        assert!(canvas.lines.is_empty(), "particles are too far apart to link");
    }

    #[test]
    fn paused_step_draws_but_does_not_move() {
        let config = FieldConfig::default();
        let mut state = state_with(&[(Vec2::new(100.0, 100.0), Vec2::new(1.0, 1.0))]);
        state.paused = true;
        let mut canvas = Recorder::default();
        state.step(None, BOUNDS, &config, &OverlayState::default(), &mut brute(), &mut rng(), &mut canvas);
        assert_eq!(state.field.particles()[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(canvas.circles.len(), 1);
    }

    #[test]
    fn nearby_particles_link_both_ways() {
        let config = FieldConfig::default();
        let mut state = state_with(&[
            (Vec2::new(100.0, 100.0), Vec2::ZERO),
            (Vec2::new(125.0, 100.0), Vec2::ZERO),
        ]);
        let mut canvas = Recorder::default();
        state.step(None, BOUNDS, &config, &OverlayState::default(), &mut brute(), &mut rng(), &mut canvas);
        // 25 units → 3 segments, once from each end.
        assert_eq!(canvas.lines.len(), 6);
    }

    #[test]
    fn pointer_links_and_force_field_apply() {
        let config = FieldConfig::default();
        let mut state = state_with(&[(Vec2::new(110.0, 100.0), Vec2::ZERO)]);
        state.mode = FieldMode::Push;
        let overlay = OverlayState {
            show_ring: true,
            ..Default::default()
        };
        let mut canvas = Recorder::default();
        let pointer = Vec2::new(100.0, 100.0);
        state.step(Some(pointer), BOUNDS, &config, &overlay, &mut brute(), &mut rng(), &mut canvas);

        let v = state.field.particles()[0].velocity;
        assert!((v - Vec2::new(3.0, 0.0)).length() < 1e-5, "pushed away, got {v:?}");
        assert_eq!(canvas.lines.len(), 1, "10 units to the pointer → 1 segment");
        assert_eq!(canvas.rings, vec![(pointer, config.interaction_radius)]);
    }

    #[test]
    fn force_field_overrides_bounce_in_the_same_frame() {
        let config = FieldConfig::default();
        // Bounces off the left wall, then the pointer's attract field takes over.
        let mut state = state_with(&[(Vec2::new(6.0, 300.0), Vec2::new(-2.0, 0.0))]);
        state.mode = FieldMode::Attract;
        let mut canvas = Recorder::default();
        state.step(
            Some(Vec2::new(5.0, 320.0)),
            BOUNDS,
            &config,
            &OverlayState::default(),
            &mut brute(),
            &mut rng(),
            &mut canvas,
        );
        let v = state.field.particles()[0].velocity;
        assert!((v - Vec2::new(0.0, 3.0)).length() < 1e-5, "got {v:?}");
    }

    #[test]
    fn empty_field_step_is_noop() {
        let config = FieldConfig::default();
        let mut state = FieldState::new(&config);
        let mut canvas = Recorder::default();
        state.step(
            Some(Vec2::new(10.0, 10.0)),
            BOUNDS,
            &config,
            &OverlayState::default(),
            &mut brute(),
            &mut rng(),
            &mut canvas,
        );
        assert!(canvas.circles.is_empty() && canvas.lines.is_empty());
    }

    #[test]
    fn grid_and_brute_force_draw_the_same_frame() {
        let config = FieldConfig::default();
        let mut seed = rng();
        let mut a = FieldState::new(&config);
        a.field.populate(80, BOUNDS, &config, &mut seed);
        let mut b = a.clone();

        let pointer = Some(Vec2::new(400.0, 300.0));
        let overlay = OverlayState::default();
        let mut brute_canvas = Recorder::default();
        let mut grid_canvas = Recorder::default();
        let mut grid = SpatialGrid::new(config.grid_cell_size, config.neighbor_epsilon_sq);

        for _ in 0..10 {
            a.step(pointer, BOUNDS, &config, &overlay, &mut brute(), &mut StdRng::seed_from_u64(1), &mut brute_canvas);
            b.step(pointer, BOUNDS, &config, &overlay, &mut grid, &mut StdRng::seed_from_u64(1), &mut grid_canvas);
        }
        assert_eq!(brute_canvas.lines, grid_canvas.lines);
    }
}
