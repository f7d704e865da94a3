//! Camera setup and the drawing seam between the simulation and Bevy.
//!
//! The simulation works in screen space (origin top-left, y down) and draws
//! through the [`Canvas`] trait.  It runs on the fixed timestep and records
//! into a [`DrawList`]; [`draw_field_system`] replays that list every render
//! frame through [`GizmoCanvas`], which converts to the centred, y-up world
//! space of the default `Camera2d`.
//!
//! ## Trails
//!
//! The `DrawList` keeps the last few recorded steps.  Older steps are replayed
//! first with alpha scaled by `trail_fade^age`, which gives the same look as
//! washing each frame with translucent black instead of clearing it.

use bevy::color::Alpha;
use bevy::prelude::*;
use std::collections::VecDeque;

/// Minimal drawing surface used by the frame loop.
pub trait Canvas {
    /// Filled circle.
    fn circle(&mut self, center: Vec2, radius: f32, color: Srgba);
    /// Straight line of the given thickness.
    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Srgba);
    /// Unfilled ring; defaults to nothing for canvases that do not need it.
    fn ring(&mut self, _center: Vec2, _radius: f32, _color: Srgba) {}
}

/// Convert a screen-space point (origin top-left, y down) to world space for
/// a default `Camera2d` looking at a viewport of `size`.
pub fn screen_to_world(point: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(point.x - size.x * 0.5, size.y * 0.5 - point.y)
}

// ── Recorded shapes ───────────────────────────────────────────────────────────

/// One recorded [`Canvas`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
        color: Srgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        thickness: f32,
        color: Srgba,
    },
    Ring {
        center: Vec2,
        radius: f32,
        color: Srgba,
    },
}

impl Shape {
    /// Same shape with its alpha multiplied by `fade`.
    pub fn faded(self, fade: f32) -> Self {
        let dim = |c: Srgba| c.with_alpha(c.alpha * fade);
        match self {
            Shape::Circle {
                center,
                radius,
                color,
            } => Shape::Circle {
                center,
                radius,
                color: dim(color),
            },
            Shape::Line {
                from,
                to,
                thickness,
                color,
            } => Shape::Line {
                from,
                to,
                thickness,
                color: dim(color),
            },
            Shape::Ring {
                center,
                radius,
                color,
            } => Shape::Ring {
                center,
                radius,
                color: dim(color),
            },
        }
    }

    fn draw<C: Canvas + ?Sized>(self, canvas: &mut C) {
        match self {
            Shape::Circle {
                center,
                radius,
                color,
            } => canvas.circle(center, radius, color),
            Shape::Line {
                from,
                to,
                thickness,
                color,
            } => canvas.line(from, to, thickness, color),
            Shape::Ring {
                center,
                radius,
                color,
            } => canvas.ring(center, radius, color),
        }
    }
}

/// Shapes recorded by the latest simulation step, plus a short history of
/// earlier steps for trails.
#[derive(Resource, Debug, Clone, Default)]
pub struct DrawList {
    current: Vec<Shape>,
    /// Most recent first.
    history: VecDeque<Vec<Shape>>,
    trail_frames: usize,
    trail_fade: f32,
    viewport: Vec2,
}

impl DrawList {
    /// Start recording a new step, pushing the previous one into the history.
    pub fn begin(&mut self, viewport: Vec2, trail_frames: usize, trail_fade: f32) {
        self.viewport = viewport;
        self.trail_frames = trail_frames;
        self.trail_fade = trail_fade;

        let mut next = if self.history.len() >= trail_frames {
            self.history.pop_back().unwrap_or_default()
        } else {
            Vec::new()
        };
        self.history.truncate(trail_frames);
        next.clear();
        let finished = std::mem::replace(&mut self.current, next);
        if trail_frames > 0 {
            self.history.push_front(finished);
        }
    }

    /// Shapes of the step being recorded (or last recorded).
    pub fn current(&self) -> &[Shape] {
        &self.current
    }

    /// Number of earlier steps kept for trails.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Draw the oldest trail step first and the current step last, on top.
    pub fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for (age, shapes) in self.history.iter().enumerate().rev() {
            let fade = self.trail_fade.powi(age as i32 + 1);
            if fade <= 0.0 {
                continue;
            }
            for &shape in shapes {
                shape.faded(fade).draw(canvas);
            }
        }
        for &shape in &self.current {
            shape.draw(canvas);
        }
    }
}

impl Canvas for DrawList {
    fn circle(&mut self, center: Vec2, radius: f32, color: Srgba) {
        self.current.push(Shape::Circle {
            center,
            radius,
            color,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Srgba) {
        self.current.push(Shape::Line {
            from,
            to,
            thickness,
            color,
        });
    }

    fn ring(&mut self, center: Vec2, radius: f32, color: Srgba) {
        self.current.push(Shape::Ring {
            center,
            radius,
            color,
        });
    }
}

// ── Gizmo canvas ──────────────────────────────────────────────────────────────

/// [`Canvas`] backed by the default gizmo group.
///
/// Gizmo lines have one global width, so thick lines are drawn as parallel
/// one-pixel strands and filled circles as concentric rings.
pub struct GizmoCanvas<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    viewport: Vec2,
}

impl<'a, 'w, 's> GizmoCanvas<'a, 'w, 's> {
    pub fn new(gizmos: &'a mut Gizmos<'w, 's>, viewport: Vec2) -> Self {
        Self { gizmos, viewport }
    }

    fn world(&self, point: Vec2) -> Vec2 {
        screen_to_world(point, self.viewport)
    }
}

impl Canvas for GizmoCanvas<'_, '_, '_> {
    fn circle(&mut self, center: Vec2, radius: f32, color: Srgba) {
        let center = self.world(center);
        let mut r = radius;
        while r > 0.0 {
            self.gizmos.circle_2d(center, r, color);
            r -= 1.0;
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Srgba) {
        let (from, to) = (self.world(from), self.world(to));
        let normal = (to - from).perp().normalize_or_zero();
        let strands = thickness.round().max(1.0) as usize;
        let spread = (strands - 1) as f32 * 0.5;
        for s in 0..strands {
            let offset = normal * (s as f32 - spread);
            self.gizmos.line_2d(from + offset, to + offset, color);
        }
    }

    fn ring(&mut self, center: Vec2, radius: f32, color: Srgba) {
        let center = self.world(center);
        self.gizmos.circle_2d(center, radius, color);
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Setup camera for 2D rendering and thin out default gizmo lines so
/// [`GizmoCanvas`] strands sit one pixel apart.
pub fn setup_camera(mut commands: Commands, mut config_store: ResMut<GizmoConfigStore>) {
    commands.spawn(Camera2d);
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = 1.0;
    debug!("Camera spawned");
}

/// Replay the recorded field every render frame.
pub fn draw_field_system(draw: Res<DrawList>, mut gizmos: Gizmos) {
    let mut canvas = GizmoCanvas::new(&mut gizmos, draw.viewport());
    draw.replay(&mut canvas);
}

/// Gizmo output for the field.  Kept apart from the simulation plugin so the
/// simulation also runs in headless apps without a renderer.
pub struct FieldRenderPlugin;

impl Plugin for FieldRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DrawList>()
            .add_systems(Update, draw_field_system);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(list: &mut DrawList, x: f32) {
        list.circle(Vec2::new(x, 0.0), 5.0, Srgba::WHITE);
    }

    fn alphas(list: &DrawList) -> Vec<f32> {
        let mut out = DrawList::default();
        list.replay(&mut out);
        out.current()
            .iter()
            .map(|s| match s {
                Shape::Circle { color, .. } => color.alpha,
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn screen_origin_maps_to_top_left_of_world() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(screen_to_world(Vec2::ZERO, size), Vec2::new(-400.0, 300.0));
        assert_eq!(screen_to_world(size * 0.5, size), Vec2::ZERO);
        assert_eq!(screen_to_world(size, size), Vec2::new(400.0, -300.0));
    }

    #[test]
    fn older_steps_replay_first_and_fainter() {
        let mut list = DrawList::default();
        for x in 0..4 {
            list.begin(Vec2::new(800.0, 600.0), 3, 0.5);
            dot(&mut list, x as f32);
        }
        assert_eq!(list.history_len(), 3);
        assert_eq!(alphas(&list), vec![0.125, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn history_is_capped_at_trail_frames() {
        let mut list = DrawList::default();
        for x in 0..10 {
            list.begin(Vec2::ZERO, 2, 0.5);
            dot(&mut list, x as f32);
        }
        assert_eq!(list.history_len(), 2);
        assert_eq!(list.current().len(), 1);
    }

    #[test]
    fn zero_trail_frames_draws_only_the_current_step() {
        let mut list = DrawList::default();
        for x in 0..3 {
            list.begin(Vec2::ZERO, 0, 0.5);
            dot(&mut list, x as f32);
        }
        assert_eq!(list.history_len(), 0);
        assert_eq!(alphas(&list), vec![1.0]);
    }

    #[test]
    fn fading_keeps_geometry() {
        let line = Shape::Line {
            from: Vec2::ZERO,
            to: Vec2::X,
            thickness: 2.0,
            color: Srgba::new(1.0, 0.0, 0.0, 0.8),
        };
        let Shape::Line {
            from,
            to,
            thickness,
            color,
        } = line.faded(0.5)
        else {
            unreachable!()
        };
        assert_eq!((from, to, thickness), (Vec2::ZERO, Vec2::X, 2.0));
        assert!((color.alpha - 0.4).abs() < 1e-6);
        assert_eq!(color.red, 1.0);
    }
}
