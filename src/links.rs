//! Distance-attenuated gradient links between nearby points.
//!
//! A link between two endpoints closer than `max_dist` is drawn as a chain of
//! short segments.  Each segment takes the colour found by mixing the two
//! endpoint colours at the segment's midpoint along the line, so the link
//! reads as a gradient.  Thickness and alpha both fall off linearly with
//! length:
//!
//! | length        | thickness        | alpha |
//! |---------------|------------------|-------|
//! | 0             | `max_thickness`  | 1.0   |
//! | `max_dist`    | `min_thickness`  | 0.0   |
//!
//! Links shorter than `min_dist` are degenerate and produce no segments.

use crate::config::FieldConfig;
use crate::graphics::Canvas;
use bevy::color::Mix;
use bevy::prelude::*;

/// Geometry and fall-off parameters for links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStyle {
    pub max_dist: f32,
    pub max_thickness: f32,
    pub min_thickness: f32,
    pub segment_length: f32,
    pub min_dist: f32,
}

impl From<&FieldConfig> for LinkStyle {
    fn from(config: &FieldConfig) -> Self {
        Self {
            max_dist: config.link_max_dist,
            max_thickness: config.link_max_thickness,
            min_thickness: config.link_min_thickness,
            segment_length: config.link_segment_length,
            min_dist: config.link_min_dist,
        }
    }
}

/// One end of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub position: Vec2,
    pub color: Srgba,
}

/// One flat-coloured piece of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub thickness: f32,
    pub color: Srgba,
}

/// A visible link, ready to be split into segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: Endpoint,
    pub b: Endpoint,
    pub thickness: f32,
    pub alpha: f32,
    pub segment_count: usize,
}

impl Link {
    /// Build the link between `a` and `b`, or `None` if it is too long or degenerate.
    pub fn between(a: Endpoint, b: Endpoint, style: LinkStyle) -> Option<Self> {
        let dist_sq = a.position.distance_squared(b.position);
        if dist_sq > style.max_dist * style.max_dist {
            return None;
        }
        let dist = dist_sq.sqrt();
        if dist <= style.min_dist {
            return None;
        }

        let t = dist / style.max_dist;
        let thickness = (style.max_thickness + (style.min_thickness - style.max_thickness) * t)
            .max(style.min_thickness);
        let alpha = (1.0 - t).clamp(0.0, 1.0);
        let segment_count = ((dist / style.segment_length).ceil() as usize).max(1);

        Some(Self {
            a,
            b,
            thickness,
            alpha,
            segment_count,
        })
    }

    /// Gradient segments from `a` to `b`, in order.
    pub fn segments(&self) -> impl Iterator<Item = LinkSegment> + '_ {
        let n = self.segment_count as f32;
        (0..self.segment_count).map(move |i| {
            let t0 = i as f32 / n;
            let t1 = (i + 1) as f32 / n;
            let mut color = self.a.color.mix(&self.b.color, (t0 + t1) * 0.5);
            color.alpha *= self.alpha;
            LinkSegment {
                from: self.a.position.lerp(self.b.position, t0),
                to: self.a.position.lerp(self.b.position, t1),
                thickness: self.thickness,
                color,
            }
        })
    }
}

/// Draw the link between `a` and `b`; does nothing if they are too far apart.
pub fn render_link<C: Canvas + ?Sized>(canvas: &mut C, a: Endpoint, b: Endpoint, style: LinkStyle) {
    let Some(link) = Link::between(a, b, style) else {
        return;
    };
    for seg in link.segments() {
        canvas.line(seg.from, seg.to, seg.thickness, seg.color);
    }
}
