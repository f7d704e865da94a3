//! Keyboard and pointer input, translated into a per-frame [`FieldIntent`].
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`intent_clear_system`]: resets `FieldIntent`.
//! 2. [`keyboard_to_intent_system`]: mode keys and toggles.
//! 3. [`pointer_to_intent_system`]: cursor position, clicks, and the Shift modifier.
//! 4. [`crate::simulation::apply_intent_system`]: applies the intent to the field.
//!
//! Only step 4 touches simulation state, so tests populate `FieldIntent`
//! directly and run that system alone.
//!
//! | Input            | Intent                                  |
//! |------------------|-----------------------------------------|
//! | Space            | `toggle_pause`                          |
//! | C                | `clear`                                 |
//! | 1 / 2 / 3 / 4    | `select_mode` None / Push / Attract / Orbit |
//! | G                | `cycle_mode`                            |
//! | R                | `toggle_ring`                           |
//! | F3               | `toggle_debug`                          |
//! | H                | `toggle_help`                           |
//! | Left click       | `spawn`                                 |
//! | Right click      | `delete`                                |
//! | Shift (either)   | `batch`                                 |

use crate::force_field::FieldMode;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Everything the user asked for this frame.
#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct FieldIntent {
    /// Cursor position in screen space; `None` while outside the window.
    pub pointer: Option<Vec2>,
    pub toggle_pause: bool,
    pub clear: bool,
    /// Jump straight to a mode.
    pub select_mode: Option<FieldMode>,
    /// Advance to the next mode.
    pub cycle_mode: bool,
    /// Flip the interaction-radius ring around the pointer.
    pub toggle_ring: bool,
    pub toggle_debug: bool,
    pub toggle_help: bool,
    /// Spawn at the pointer.
    pub spawn: bool,
    /// Delete nearest to the pointer.
    pub delete: bool,
    /// Spawn/delete a batch instead of one.
    pub batch: bool,
}

/// Reset the intent at the start of every frame.
pub fn intent_clear_system(mut intent: ResMut<FieldIntent>) {
    *intent = FieldIntent::default();
}

const MODE_KEYS: [(KeyCode, FieldMode); 4] = [
    (KeyCode::Digit1, FieldMode::None),
    (KeyCode::Digit2, FieldMode::Push),
    (KeyCode::Digit3, FieldMode::Attract),
    (KeyCode::Digit4, FieldMode::Orbit),
];

/// Translate key presses into [`FieldIntent`] flags.
pub fn keyboard_to_intent_system(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<FieldIntent>) {
    intent.toggle_pause = keys.just_pressed(KeyCode::Space);
    intent.clear = keys.just_pressed(KeyCode::KeyC);
    intent.cycle_mode = keys.just_pressed(KeyCode::KeyG);
    intent.toggle_ring = keys.just_pressed(KeyCode::KeyR);
    intent.toggle_debug = keys.just_pressed(KeyCode::F3);
    intent.toggle_help = keys.just_pressed(KeyCode::KeyH);
    intent.batch = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    // Last pressed wins if several mode keys land in the same frame.
    for (key, mode) in MODE_KEYS {
        if keys.just_pressed(key) {
            intent.select_mode = Some(mode);
        }
    }
}

/// Record the cursor position and mouse clicks.
pub fn pointer_to_intent_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut intent: ResMut<FieldIntent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    intent.pointer = window.cursor_position();
    intent.spawn = buttons.just_pressed(MouseButton::Left);
    intent.delete = buttons.just_pressed(MouseButton::Right);
}
