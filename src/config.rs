//! Runtime configuration loaded from `assets/field.toml`.
//!
//! [`FieldConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_field_config`] reads
//! `assets/field.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the settings you care about:
//!
//! ```toml
//! interaction_radius = 45.0
//! selector = "grid"
//! rng_seed = 7
//! ```
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `FieldConfig::default()`.

use crate::constants::*;
use crate::error::{
    validate_at_most, validate_below, validate_count, validate_non_negative, validate_positive,
    validate_unit, FieldError, FieldResult,
};
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Default location of the runtime config file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/field.toml";

/// Which nearest-neighbour implementation the frame loop uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    /// Sort every candidate by distance.  Fine for tens to low hundreds of particles.
    #[default]
    BruteForce,
    /// Uniform grid ring search; same results, scales to larger populations.
    Grid,
}

/// Runtime-tunable simulation and interaction configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    // ── Window ───────────────────────────────────────────────────────────────
    pub window_width: f32,
    pub window_height: f32,

    // ── Population ───────────────────────────────────────────────────────────
    pub initial_count: usize,
    pub initial_edge_margin: f32,
    pub particle_radius: f32,
    pub initial_speed_range: f32,
    pub spawn_scatter: f32,
    pub batch_size: usize,
    /// Fixed seed for the particle RNG; `None` seeds from entropy.
    pub rng_seed: Option<u64>,

    // ── Motion ───────────────────────────────────────────────────────────────
    pub max_speed: f32,
    pub bounce_jitter: f32,

    // ── Force Field ──────────────────────────────────────────────────────────
    pub interaction_radius: f32,
    pub push_speed: f32,
    pub orbit_speed: f32,
    pub orbit_min_magnitude: f32,

    // ── Neighbours ───────────────────────────────────────────────────────────
    pub neighbor_count: usize,
    pub neighbor_epsilon_sq: f32,
    pub selector: SelectorKind,
    pub grid_cell_size: f32,

    // ── Links ────────────────────────────────────────────────────────────────
    pub link_max_dist: f32,
    pub link_max_thickness: f32,
    pub link_min_thickness: f32,
    pub link_segment_length: f32,
    pub link_min_dist: f32,

    // ── Timing & Trails ──────────────────────────────────────────────────────
    /// Fixed simulation steps per second.
    pub simulation_hz: f32,
    /// Previous simulation frames redrawn behind the current one; 0 disables trails.
    pub trail_frames: usize,
    /// Alpha multiplier applied once per frame of age.
    pub trail_fade: f32,

    // ── Notifications ────────────────────────────────────────────────────────
    pub notification_duration: f32,
    pub notification_decay_rate: f32,
    pub notification_font_size: f32,

    // ── Overlays ─────────────────────────────────────────────────────────────
    pub overlay_font_size: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            // Window
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            // Population
            initial_count: INITIAL_COUNT,
            initial_edge_margin: INITIAL_EDGE_MARGIN,
            particle_radius: PARTICLE_RADIUS,
            initial_speed_range: INITIAL_SPEED_RANGE,
            spawn_scatter: SPAWN_SCATTER,
            batch_size: BATCH_SIZE,
            rng_seed: None,
            // Motion
            max_speed: MAX_SPEED,
            bounce_jitter: BOUNCE_JITTER,
            // Force Field
            interaction_radius: INTERACTION_RADIUS,
            push_speed: PUSH_SPEED,
            orbit_speed: ORBIT_SPEED,
            orbit_min_magnitude: ORBIT_MIN_MAGNITUDE,
            // Neighbours
            neighbor_count: NEIGHBOR_COUNT,
            neighbor_epsilon_sq: NEIGHBOR_EPSILON_SQ,
            selector: SelectorKind::default(),
            grid_cell_size: GRID_CELL_SIZE,
            // Links
            link_max_dist: LINK_MAX_DIST,
            link_max_thickness: LINK_MAX_THICKNESS,
            link_min_thickness: LINK_MIN_THICKNESS,
            link_segment_length: LINK_SEGMENT_LENGTH,
            link_min_dist: LINK_MIN_DIST,
            // Timing & Trails
            simulation_hz: SIMULATION_HZ,
            trail_frames: TRAIL_FRAMES,
            trail_fade: TRAIL_FADE,
            // Notifications
            notification_duration: NOTIFICATION_DURATION,
            notification_decay_rate: NOTIFICATION_DECAY_RATE,
            notification_font_size: NOTIFICATION_FONT_SIZE,
            // Overlays
            overlay_font_size: OVERLAY_FONT_SIZE,
        }
    }
}

impl FieldConfig {
    /// Parse a config from TOML text and validate it.
    pub fn from_toml_str(path: &str, contents: &str) -> FieldResult<Self> {
        let config: FieldConfig =
            toml::from_str(contents).map_err(|source| FieldError::ConfigParse {
                path: path.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> FieldResult<Option<Self>> {
        let display = path.display().to_string();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(FieldError::ConfigRead {
                    path: display,
                    source,
                })
            }
        };
        Self::from_toml_str(&display, &contents).map(Some)
    }

    /// Reject settings that would make the simulation degenerate.
    pub fn validate(&self) -> FieldResult<()> {
        validate_positive("window_width", self.window_width)?;
        validate_positive("window_height", self.window_height)?;
        validate_positive("particle_radius", self.particle_radius)?;
        validate_non_negative("initial_edge_margin", self.initial_edge_margin)?;
        validate_non_negative("initial_speed_range", self.initial_speed_range)?;
        validate_non_negative("spawn_scatter", self.spawn_scatter)?;
        validate_count("batch_size", self.batch_size)?;
        validate_positive("max_speed", self.max_speed)?;
        validate_non_negative("bounce_jitter", self.bounce_jitter)?;
        validate_positive("interaction_radius", self.interaction_radius)?;
        validate_non_negative("push_speed", self.push_speed)?;
        validate_non_negative("orbit_speed", self.orbit_speed)?;
        validate_positive("orbit_min_magnitude", self.orbit_min_magnitude)?;
        validate_count("neighbor_count", self.neighbor_count)?;
        validate_non_negative("neighbor_epsilon_sq", self.neighbor_epsilon_sq)?;
        validate_positive("grid_cell_size", self.grid_cell_size)?;
        validate_positive("link_max_dist", self.link_max_dist)?;
        validate_positive("link_max_thickness", self.link_max_thickness)?;
        validate_positive("link_min_thickness", self.link_min_thickness)?;
        validate_positive("link_segment_length", self.link_segment_length)?;
        validate_non_negative("link_min_dist", self.link_min_dist)?;
        validate_at_most(
            ("link_min_thickness", self.link_min_thickness),
            ("link_max_thickness", self.link_max_thickness),
        )?;
        validate_below(
            ("link_min_dist", self.link_min_dist),
            ("link_max_dist", self.link_max_dist),
        )?;
        validate_positive("simulation_hz", self.simulation_hz)?;
        validate_unit("trail_fade", self.trail_fade)?;
        validate_positive("notification_duration", self.notification_duration)?;
        validate_positive("notification_decay_rate", self.notification_decay_rate)?;
        validate_positive("notification_font_size", self.notification_font_size)?;
        validate_positive("overlay_font_size", self.overlay_font_size)?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/field.toml` and overwrite the
/// `FieldConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Read, parse, and validation
/// errors are logged but do not abort the program.  A missing file is
/// silently ignored (defaults are already in place from `insert_resource`).
pub fn load_field_config(mut config: ResMut<FieldConfig>) {
    match FieldConfig::load(Path::new(CONFIG_PATH)) {
        Ok(Some(loaded)) => {
            *config = loaded;
            info!("Loaded field config from {CONFIG_PATH}");
        }
        Ok(None) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
        Err(e) => {
            warn!("{e}; using defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(FieldConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = FieldConfig::from_toml_str(
            "test.toml",
            "interaction_radius = 45.0\nselector = \"grid\"\nrng_seed = 7\n",
        )
        .expect("valid partial config");
        assert_eq!(cfg.interaction_radius, 45.0);
        assert_eq!(cfg.selector, SelectorKind::Grid);
        assert_eq!(cfg.rng_seed, Some(7));
        assert_eq!(cfg.max_speed, MAX_SPEED);
        assert_eq!(cfg.neighbor_count, NEIGHBOR_COUNT);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = FieldConfig::from_toml_str("bad.toml", "max_speed = \"fast\"").unwrap_err();
        assert!(matches!(err, FieldError::ConfigParse { .. }), "got {err}");
    }

    #[test]
    fn zero_neighbor_count_is_rejected() {
        let err = FieldConfig::from_toml_str("bad.toml", "neighbor_count = 0").unwrap_err();
        assert!(
            matches!(
                err,
                FieldError::UnsafeConstant {
                    name: "neighbor_count",
                    ..
                }
            ),
            "got {err}"
        );
    }

    #[test]
    fn thinner_max_than_min_thickness_is_rejected() {
        let err = FieldConfig::from_toml_str(
            "bad.toml",
            "link_min_thickness = 5.0\nlink_max_thickness = 4.0\n",
        )
        .unwrap_err();
        assert!(
            matches!(
                err,
                FieldError::InvertedRange {
                    low: "link_min_thickness",
                    high: "link_max_thickness",
                    ..
                }
            ),
            "got {err}"
        );
    }

    #[test]
    fn min_link_distance_at_or_past_max_is_rejected() {
        let err = FieldConfig::from_toml_str(
            "bad.toml",
            "link_min_dist = 150.0\nlink_max_dist = 150.0\n",
        )
        .unwrap_err();
        assert!(
            matches!(
                err,
                FieldError::InvertedRange {
                    low: "link_min_dist",
                    ..
                }
            ),
            "got {err}"
        );
    }

    #[test]
    fn equal_link_thicknesses_are_allowed() {
        let cfg = FieldConfig::from_toml_str(
            "flat.toml",
            "link_min_thickness = 2.0\nlink_max_thickness = 2.0\n",
        );
        assert!(cfg.is_ok());
    }

    #[test]
    fn trail_fade_above_one_is_rejected() {
        let err = FieldConfig::from_toml_str("bad.toml", "trail_fade = 1.5").unwrap_err();
        assert!(
            matches!(err, FieldError::UnsafeConstant { name: "trail_fade", .. }),
            "got {err}"
        );
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let loaded = FieldConfig::load(Path::new("definitely/not/here/field.toml"))
            .expect("missing file is not an error");
        assert!(loaded.is_none());
    }
}
