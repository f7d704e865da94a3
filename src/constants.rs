//! Centralised simulation and interaction constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::FieldConfig::default`] mirrors every value below; any of
//! them can be overridden at runtime from `assets/field.toml`.

// ── Window ────────────────────────────────────────────────────────────────────

/// Initial window width (logical pixels).
pub const WINDOW_WIDTH: f32 = 800.0;

/// Initial window height (logical pixels).
pub const WINDOW_HEIGHT: f32 = 600.0;

// ── Population ────────────────────────────────────────────────────────────────

/// Number of particles generated at startup.
pub const INITIAL_COUNT: usize = 50;

/// Distance kept clear from each window edge when generating the initial population.
pub const INITIAL_EDGE_MARGIN: f32 = 5.0;

/// Radius shared by every particle (units).
///
/// Also the inner wall offset: a particle's centre never gets closer than this
/// to any window edge.
pub const PARTICLE_RADIUS: f32 = 5.0;

/// Range of each initial velocity component; drawn uniformly from `[-x, x]`.
pub const INITIAL_SPEED_RANGE: f32 = 1.0;

/// Particles spawned by a click land within `±SPAWN_SCATTER` of the pointer on each axis.
pub const SPAWN_SCATTER: f32 = 10.0;

/// Particles spawned or deleted per click while Shift is held.
pub const BATCH_SIZE: usize = 5;

// ── Motion ────────────────────────────────────────────────────────────────────

/// Hard cap on a velocity component after a wall bounce (units/frame).
pub const MAX_SPEED: f32 = 3.0;

/// Scale of the uniform `[-1, 1]` jitter added to a reflected velocity component.
///
/// Zero gives a perfect mirror bounce; larger values scatter particles faster
/// and break up periodic orbits sooner.
pub const BOUNCE_JITTER: f32 = 0.2;

// ── Force Field ───────────────────────────────────────────────────────────────

/// Distance from the pointer within which the force field and deletion act.
pub const INTERACTION_RADIUS: f32 = 30.0;

/// Speed assigned by the push and attract modes (units/frame).
pub const PUSH_SPEED: f32 = 3.0;

/// Tangential speed assigned by the orbit mode (units/frame).
pub const ORBIT_SPEED: f32 = 2.0;

/// Orbit skips particles whose offset from the pointer is shorter than this,
/// since the tangent direction is undefined there.
pub const ORBIT_MIN_MAGNITUDE: f32 = 0.01;

// ── Neighbours ────────────────────────────────────────────────────────────────

/// Links drawn from each particle (and from the pointer) to its nearest neighbours.
pub const NEIGHBOR_COUNT: usize = 5;

/// Candidates at or below this squared distance are treated as the query point itself.
pub const NEIGHBOR_EPSILON_SQ: f32 = 1e-6;

/// World-space size of each spatial grid cell.
///
/// Should be close to the typical k-th neighbour distance.  Much smaller cells
/// make the ring search visit many empty cells; much larger cells degrade
/// towards brute force.
pub const GRID_CELL_SIZE: f32 = 60.0;

// ── Links ─────────────────────────────────────────────────────────────────────

/// Endpoints further apart than this draw no link.
pub const LINK_MAX_DIST: f32 = 150.0;

/// Line thickness of a zero-length link.
pub const LINK_MAX_THICKNESS: f32 = 4.0;

/// Line thickness of a link at `LINK_MAX_DIST`; also the lower clamp.
pub const LINK_MIN_THICKNESS: f32 = 0.5;

/// Length of each colour-gradient segment; a link of length `d` is split into
/// `ceil(d / LINK_SEGMENT_LENGTH)` segments.
pub const LINK_SEGMENT_LENGTH: f32 = 10.0;

/// Links shorter than this are degenerate and draw nothing.
pub const LINK_MIN_DIST: f32 = 1e-3;

// ── Timing & Trails ───────────────────────────────────────────────────────────

/// Simulation steps per second.  Velocities are in units per step, so motion
/// speed is independent of the display refresh rate.
pub const SIMULATION_HZ: f32 = 60.0;

/// Previous steps redrawn behind the current one, each fainter than the last.
pub const TRAIL_FRAMES: usize = 3;

/// Alpha kept per step of age: a step drawn `n` steps ago shows at `TRAIL_FADE^n`.
/// 0.5 matches a half-opacity black wash over the previous frame.
pub const TRAIL_FADE: f32 = 0.5;

// ── Notifications ─────────────────────────────────────────────────────────────

/// Timer value at which a notification goes inert.
pub const NOTIFICATION_DURATION: f32 = 2.0;

/// Timer units gained per second of real time; 2.0 shows a notification for
/// `NOTIFICATION_DURATION / 2` seconds.
pub const NOTIFICATION_DECAY_RATE: f32 = 2.0;

/// Font size of a notification at the moment it is triggered.
pub const NOTIFICATION_FONT_SIZE: f32 = 42.0;

// ── Overlays ──────────────────────────────────────────────────────────────────

/// Font size for the debug and help overlays.
pub const OVERLAY_FONT_SIZE: f32 = 16.0;
