//! Pointer force field.
//!
//! When a particle is within `interaction_radius` of the pointer its velocity
//! is *replaced* (not nudged) according to the active [`FieldMode`].  The
//! override runs after the particle's own motion each frame, so inside the
//! radius the mode always wins over the wall bounce.

use crate::config::FieldConfig;
use bevy::prelude::*;

/// The active pointer behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMode {
    /// Pointer has no effect on motion.
    None,
    /// Fling particles radially away from the pointer.
    #[default]
    Push,
    /// Pull particles radially toward the pointer.
    Attract,
    /// Send particles around the pointer along the tangent.
    Orbit,
}

impl FieldMode {
    pub const ALL: [FieldMode; 4] = [
        FieldMode::None,
        FieldMode::Push,
        FieldMode::Attract,
        FieldMode::Orbit,
    ];

    /// Text shown in the mode-change notification.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Push => "PUSH",
            Self::Attract => "ATTRACT",
            Self::Orbit => "ORBIT",
        }
    }

    /// The mode after this one in `ALL` order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Push,
            Self::Push => Self::Attract,
            Self::Attract => Self::Orbit,
            Self::Orbit => Self::None,
        }
    }
}

/// Speeds and radius used by [`apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub radius: f32,
    pub push_speed: f32,
    pub orbit_speed: f32,
    pub orbit_min_magnitude: f32,
}

impl From<&FieldConfig> for ForceParams {
    fn from(config: &FieldConfig) -> Self {
        Self {
            radius: config.interaction_radius,
            push_speed: config.push_speed,
            orbit_speed: config.orbit_speed,
            orbit_min_magnitude: config.orbit_min_magnitude,
        }
    }
}

/// Return the overriding velocity for a particle at `position`, or `None` when
/// it is out of range, the mode is [`FieldMode::None`], or the orbit tangent is
/// undefined.
pub fn deflect(position: Vec2, focus: Vec2, mode: FieldMode, params: ForceParams) -> Option<Vec2> {
    let offset = position - focus;
    if offset.length_squared() > params.radius * params.radius {
        return None;
    }

    match mode {
        FieldMode::None => None,
        FieldMode::Push => {
            let angle = offset.y.atan2(offset.x);
            Some(Vec2::from_angle(angle) * params.push_speed)
        }
        FieldMode::Attract => {
            let angle = offset.y.atan2(offset.x);
            Some(-Vec2::from_angle(angle) * params.push_speed)
        }
        FieldMode::Orbit => {
            let tangent = offset.perp();
            let magnitude = tangent.length();
            if magnitude < params.orbit_min_magnitude {
                return None;
            }
            Some(tangent / magnitude * params.orbit_speed)
        }
    }
}

/// Overwrite `velocity` if the particle at `position` is inside the field.
pub fn apply(position: Vec2, velocity: &mut Vec2, focus: Vec2, mode: FieldMode, params: ForceParams) {
    if let Some(v) = deflect(position, focus, mode, params) {
        *velocity = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ForceParams {
        ForceParams::from(&FieldConfig::default())
    }

    const FOCUS: Vec2 = Vec2::new(100.0, 100.0);

    #[test]
    fn out_of_range_leaves_velocity_alone() {
        let mut v = Vec2::new(0.5, 0.5);
        apply(Vec2::new(131.0, 100.0), &mut v, FOCUS, FieldMode::Push, params());
        assert_eq!(v, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn exactly_at_radius_is_in_range() {
        let mut v = Vec2::ZERO;
        apply(Vec2::new(130.0, 100.0), &mut v, FOCUS, FieldMode::Push, params());
        assert!((v - Vec2::new(3.0, 0.0)).length() < 1e-5, "got {v:?}");
    }

    #[test]
    fn none_mode_has_no_effect() {
        let mut v = Vec2::new(1.0, -1.0);
        apply(Vec2::new(105.0, 100.0), &mut v, FOCUS, FieldMode::None, params());
        assert_eq!(v, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn push_points_away_at_fixed_speed() {
        let mut v = Vec2::new(-2.0, 0.0);
        apply(Vec2::new(110.0, 110.0), &mut v, FOCUS, FieldMode::Push, params());
        assert!((v.length() - 3.0).abs() < 1e-5);
        assert!(v.x > 0.0 && v.y > 0.0, "expected outward, got {v:?}");
        assert!((v.x - v.y).abs() < 1e-5, "expected 45°, got {v:?}");
    }

    #[test]
    fn attract_points_toward_at_fixed_speed() {
        let mut v = Vec2::ZERO;
        apply(Vec2::new(100.0, 80.0), &mut v, FOCUS, FieldMode::Attract, params());
        assert!((v - Vec2::new(0.0, 3.0)).length() < 1e-5, "got {v:?}");
    }

    #[test]
    fn orbit_is_tangential_at_orbit_speed() {
        let mut v = Vec2::ZERO;
        let position = Vec2::new(112.0, 95.0);
        apply(position, &mut v, FOCUS, FieldMode::Orbit, params());
        assert!((v.length() - 2.0).abs() < 1e-5);
        assert!(v.dot(position - FOCUS).abs() < 1e-4, "must be perpendicular, got {v:?}");
        assert!((v - Vec2::new(5.0, 12.0) / 13.0 * 2.0).length() < 1e-5);
    }

    #[test]
    fn orbit_at_focus_is_skipped() {
        let mut v = Vec2::new(0.7, -0.3);
        apply(FOCUS, &mut v, FOCUS, FieldMode::Orbit, params());
        assert_eq!(v, Vec2::new(0.7, -0.3));
        assert!(v.is_finite());
    }

    #[test]
    fn push_at_focus_stays_finite() {
        let mut v = Vec2::ZERO;
        apply(FOCUS, &mut v, FOCUS, FieldMode::Push, params());
        assert!(v.is_finite());
        assert!((v.length() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn cycling_visits_every_mode() {
        let mut mode = FieldMode::None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(seen, FieldMode::ALL.to_vec());
        assert_eq!(mode, FieldMode::None);
    }
}
