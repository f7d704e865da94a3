use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};
use particle_field::config::{self, FieldConfig};
use particle_field::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use particle_field::graphics::{self, FieldRenderPlugin};
use particle_field::rendering;
use particle_field::simulation::{self, ParticleFieldPlugin};
use particle_field::spatial_partition;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "particles".into(),
            resolution: WindowResolution::new(WINDOW_WIDTH as u32, WINDOW_HEIGHT as u32),
            // Rendering follows the display; the simulation has its own fixed clock.
            present_mode: PresentMode::AutoVsync,
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    .add_plugins(FrameTimeDiagnosticsPlugin::default())
    // Compiled defaults; load_field_config overwrites them from assets/field.toml.
    .insert_resource(FieldConfig::default())
    .add_plugins((ParticleFieldPlugin, FieldRenderPlugin))
    .add_systems(
        Startup,
        (
            // Load config first so every other startup system sees the final values.
            config::load_field_config,
            graphics::setup_camera.after(config::load_field_config),
            simulation::setup_field_state.after(config::load_field_config),
            simulation::setup_simulation_rate.after(config::load_field_config),
            spatial_partition::setup_neighbor_search.after(config::load_field_config),
            rendering::setup_overlay_text.after(config::load_field_config),
        ),
    );

    app.run();
}
