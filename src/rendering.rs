//! Text overlays: the transient notification, the debug readout, and key help.
//!
//! Particles, links, and the pointer ring are drawn by the frame loop through
//! [`crate::graphics::Canvas`]; this module only owns Bevy UI text.
//!
//! | Layer         | Technology | Default | Controlled by            |
//! |---------------|------------|---------|--------------------------|
//! | Notification  | Bevy UI    | hidden  | `Notification` timer     |
//! | Debug readout | Bevy UI    | OFF     | `show_debug` (F3)        |
//! | Key help      | Bevy UI    | ON      | `show_help` (H)          |
//! | Pointer ring  | Gizmos     | OFF     | `show_ring` (R)          |

use crate::config::FieldConfig;
use crate::simulation::FieldState;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

// ── Overlay state resource ────────────────────────────────────────────────────

/// Purely visual toggles.  Nothing here affects the simulation.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct OverlayState {
    /// Ring around the pointer at the interaction radius.
    pub show_ring: bool,
    /// FPS and live particle count.
    pub show_debug: bool,
    pub show_help: bool,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            show_ring: false,
            show_debug: false,
            show_help: true,
        }
    }
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Marker for the notification text entity.
#[derive(Component)]
pub struct NotificationText;

/// Marker for the debug readout text entity.
#[derive(Component)]
pub struct DebugText;

/// Marker for the key-help text entity.
#[derive(Component)]
pub struct HelpText;

const HELP: &str = "\
SPACE  pause / resume
C      clear
1-4    none / push / attract / orbit
G      cycle mode
R      pointer ring
F3     debug readout
H      hide this help
LMB    spawn (SHIFT: 5)
RMB    delete nearest (SHIFT: 5)";

// ── Notification look ─────────────────────────────────────────────────────────

/// How a notification looks at a given `elapsed / duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotificationLook {
    pub alpha: f32,
    pub font_size: f32,
    /// Upward drift from the resting position, in pixels.
    pub rise: f32,
}

/// Fade out, grow by half, and drift up 40 px over the notification's life.
pub fn notification_look(progress: f32, base_font_size: f32) -> NotificationLook {
    let t = progress.clamp(0.0, 1.0);
    NotificationLook {
        alpha: 1.0 - t,
        font_size: base_font_size * (1.0 + 0.5 * t),
        rise: 40.0 * t,
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Spawn the notification, debug, and help text nodes.
pub fn setup_overlay_text(mut commands: Commands, config: Res<FieldConfig>) {
    // Full-screen container that centres the notification.
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: config.notification_font_size,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node::default(),
                Visibility::Hidden,
                NotificationText,
            ));
        });

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: config.overlay_font_size,
            ..default()
        },
        TextColor(Color::srgb(0.0, 1.0, 0.4)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        Visibility::Hidden,
        DebugText,
    ));

    commands.spawn((
        Text::new(HELP),
        TextFont {
            font_size: config.overlay_font_size,
            ..default()
        },
        TextColor(Color::srgba(0.85, 0.85, 0.88, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            bottom: Val::Px(10.0),
            ..default()
        },
        Visibility::Inherited,
        HelpText,
    ));
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Mirror the notification state onto its text entity.
#[allow(clippy::type_complexity)]
pub fn notification_display_system(
    state: Res<FieldState>,
    config: Res<FieldConfig>,
    mut query: Query<
        (
            &mut Text,
            &mut TextFont,
            &mut TextColor,
            &mut Node,
            &mut Visibility,
        ),
        With<NotificationText>,
    >,
) {
    for (mut text, mut font, mut color, mut node, mut vis) in query.iter_mut() {
        let Some(progress) = state.notification.progress() else {
            *vis = Visibility::Hidden;
            continue;
        };
        let look = notification_look(progress, config.notification_font_size);
        if text.0 != state.notification.text() {
            text.0 = state.notification.text().to_string();
        }
        font.font_size = look.font_size;
        *color = TextColor(Color::srgba(1.0, 1.0, 1.0, look.alpha));
        node.top = Val::Px(-look.rise);
        *vis = Visibility::Inherited;
    }
}

/// Refresh the debug readout and show/hide it.
pub fn debug_overlay_system(
    state: Res<FieldState>,
    overlay: Res<OverlayState>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    mut query: Query<(&mut Text, &mut Visibility), With<DebugText>>,
) {
    for (mut text, mut vis) in query.iter_mut() {
        if !overlay.show_debug {
            *vis = Visibility::Hidden;
            continue;
        }
        let fps = diagnostics
            .as_ref()
            .and_then(|d| d.get(&FrameTimeDiagnosticsPlugin::FPS))
            .and_then(|fps| fps.smoothed())
            .unwrap_or(0.0);
        text.0 = format!(
            "FPS: {:.0} | Particles: {} | Mode: {}{}",
            fps,
            state.field.count(),
            state.mode.label(),
            if state.paused { " | PAUSED" } else { "" }
        );
        *vis = Visibility::Inherited;
    }
}

/// Show or hide the key help when `show_help` changes.
pub fn help_overlay_system(
    overlay: Res<OverlayState>,
    mut query: Query<&mut Visibility, With<HelpText>>,
) {
    if !overlay.is_changed() {
        return;
    }
    let vis = if overlay.show_help {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut v in query.iter_mut() {
        *v = vis;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_notification_is_opaque_and_at_rest() {
        let look = notification_look(0.0, 40.0);
        assert_eq!(look.alpha, 1.0);
        assert_eq!(look.font_size, 40.0);
        assert_eq!(look.rise, 0.0);
    }

    #[test]
    fn notification_fades_grows_and_rises() {
        let early = notification_look(0.25, 40.0);
        let late = notification_look(0.75, 40.0);
        assert!(late.alpha < early.alpha);
        assert!(late.font_size > early.font_size);
        assert!(late.rise > early.rise);
        assert!((late.alpha - 0.25).abs() < 1e-6);
    }

    #[test]
    fn help_starts_visible_and_debug_hidden() {
        let overlay = OverlayState::default();
        assert!(overlay.show_help);
        assert!(!overlay.show_debug);
        assert!(!overlay.show_ring);
    }
}
