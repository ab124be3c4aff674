//! World meters to panel pixels.
//!
//! World Y points up, pixel Y points down. The per-axis world scale fits the
//! whole world into the canvas; zoom and pan are a separate post-transform in
//! pixel space, so they never change how many pixels a meter maps to before
//! the view is applied.

use crate::physics::math::{Scalar, Vector};
use bevy::math::Vec2;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
/// Multiplicative change per zoom-in / zoom-out input
pub const ZOOM_STEP: f32 = 0.1;

/// Zoom and pan applied on top of the world-to-pixel mapping:
/// `screen = canvas_point · zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    /// Out-of-range zoom is clamped, never rejected.
    pub fn new(zoom: f32, pan: Vec2) -> Self {
        let mut view = Self { zoom: 1.0, pan };
        view.set_zoom(zoom);
        view
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * (1.0 + ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom * (1.0 - ZOOM_STEP));
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.pan += delta;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, canvas_point: Vec2) -> Vec2 {
        canvas_point * self.zoom + self.pan
    }

    pub fn invert(&self, screen_point: Vec2) -> Vec2 {
        (screen_point - self.pan) / self.zoom
    }
}

/// World-to-pixel transform for one canvas size and view.
///
/// Cheap to build; construct one per frame from the current canvas size
/// rather than keeping it around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateProjector {
    world_extent: Vector,
    canvas: Vec2,
    view: ViewTransform,
}

impl CoordinateProjector {
    /// Non-positive or non-finite world extents are treated as one meter and
    /// canvas sides are at least one pixel, so the transform stays invertible.
    pub fn new(world_extent: Vector, canvas: Vec2, view: ViewTransform) -> Self {
        let guard_world = |meters: Scalar| {
            if meters.is_finite() && meters > 0.0 {
                meters
            } else {
                1.0
            }
        };
        let guard_canvas = |pixels: f32| {
            if pixels.is_finite() {
                pixels.max(1.0)
            } else {
                1.0
            }
        };

        Self {
            world_extent: Vector::new(guard_world(world_extent.x), guard_world(world_extent.y)),
            canvas: Vec2::new(guard_canvas(canvas.x), guard_canvas(canvas.y)),
            view,
        }
    }

    pub fn world_extent(&self) -> Vector {
        self.world_extent
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Pixels per meter on each axis, before zoom.
    pub fn scale(&self) -> Vector {
        Vector::new(
            Scalar::from(self.canvas.x) / self.world_extent.x,
            Scalar::from(self.canvas.y) / self.world_extent.y,
        )
    }

    /// Scale for isotropic shapes such as circles.
    pub fn isotropic_scale(&self) -> Scalar {
        let scale = self.scale();
        scale.x.min(scale.y)
    }

    /// Canvas pixel position of a world point, ignoring the view.
    pub fn world_to_canvas(&self, point: Vector) -> Vector {
        let scale = self.scale();
        Vector::new(
            point.x * scale.x,
            Scalar::from(self.canvas.y) - point.y * scale.y,
        )
    }

    pub fn world_to_screen(&self, point: Vector) -> Vec2 {
        self.view.apply(self.world_to_canvas(point).as_vec2())
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vector {
        let canvas_point = self.view.invert(screen).as_dvec2();
        let scale = self.scale();
        Vector::new(
            canvas_point.x / scale.x,
            (Scalar::from(self.canvas.y) - canvas_point.y) / scale.y,
        )
    }

    /// On-screen length of an isotropic world length (a radius, say).
    pub fn length_to_screen(&self, meters: Scalar) -> f32 {
        (meters * self.isotropic_scale()) as f32 * self.view.zoom
    }

    /// On-screen size of an axis-aligned world extent.
    pub fn size_to_screen(&self, size: Vector) -> Vec2 {
        (size * self.scale()).as_vec2() * self.view.zoom
    }

    /// On-screen length of a fixed pixel length drawn inside the zoomed view.
    pub fn pixels_to_screen(&self, pixels: f32) -> f32 {
        pixels * self.view.zoom
    }
}

/// Plain world-to-pixel mapping without zoom or pan.
pub fn world_to_screen(point: Vector, world_extent: Vector, canvas_extent: Vec2) -> Vec2 {
    CoordinateProjector::new(world_extent, canvas_extent, ViewTransform::default())
        .world_to_screen(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(a.distance(b) < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn test_world_y_points_up() {
        let canvas = Vec2::new(800.0, 600.0);
        let world = Vector::new(100.0, 100.0);

        assert_close(world_to_screen(Vector::ZERO, world, canvas), Vec2::new(0.0, 600.0));
        assert_close(
            world_to_screen(Vector::new(100.0, 100.0), world, canvas),
            Vec2::new(800.0, 0.0),
        );
        assert_close(
            world_to_screen(Vector::new(50.0, 25.0), world, canvas),
            Vec2::new(400.0, 450.0),
        );
    }

    #[test]
    fn test_isotropic_scale_uses_smaller_axis() {
        let projector = CoordinateProjector::new(
            Vector::new(100.0, 100.0),
            Vec2::new(800.0, 600.0),
            ViewTransform::default(),
        );

        assert_eq!(projector.scale(), Vector::new(8.0, 6.0));
        assert_eq!(projector.isotropic_scale(), 6.0);
        assert_eq!(projector.length_to_screen(2.0), 12.0);
    }

    #[test]
    fn test_zoom_and_pan_compose_after_world_scale() {
        let view = ViewTransform::new(2.0, Vec2::new(10.0, -5.0));
        let projector =
            CoordinateProjector::new(Vector::new(10.0, 10.0), Vec2::new(100.0, 100.0), view);

        // canvas (10, 90) -> (20, 180) + pan
        assert_close(
            projector.world_to_screen(Vector::new(1.0, 1.0)),
            Vec2::new(30.0, 175.0),
        );
        // world scale is unaffected by the view
        assert_eq!(projector.scale(), Vector::new(10.0, 10.0));
        assert_eq!(projector.length_to_screen(1.0), 20.0);
    }

    #[test]
    fn test_round_trip() {
        let view = ViewTransform::new(1.7, Vec2::new(-42.0, 13.5));
        let projector =
            CoordinateProjector::new(Vector::new(120.0, 80.0), Vec2::new(640.0, 480.0), view);

        let point = Vector::new(33.3, 71.2);
        let back = projector.screen_to_world(projector.world_to_screen(point));
        assert!(back.distance(point) < 1e-3);
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        let mut view = ViewTransform::default();
        view.zoom_in();
        assert!((view.zoom() - 1.1).abs() < 1e-6);

        for _ in 0..100 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), MAX_ZOOM);

        for _ in 0..100 {
            view.zoom_out();
        }
        assert_eq!(view.zoom(), MIN_ZOOM);

        view.set_zoom(f32::NAN);
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut view = ViewTransform::new(2.5, Vec2::new(3.0, 4.0));
        assert!(!view.is_identity());
        view.reset();
        assert!(view.is_identity());
        assert_eq!(view.zoom(), 1.0);
        assert_eq!(view.pan(), Vec2::ZERO);
    }

    #[test]
    fn test_degenerate_extents_are_guarded() {
        let projector = CoordinateProjector::new(
            Vector::new(0.0, -3.0),
            Vec2::new(0.0, 200.0),
            ViewTransform::default(),
        );

        assert_eq!(projector.world_extent(), Vector::ONE);
        assert_eq!(projector.canvas(), Vec2::new(1.0, 200.0));
        let world = projector.screen_to_world(Vec2::new(0.5, 100.0));
        assert!(world.is_finite());
    }
}
