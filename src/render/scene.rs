//! The main scene panel.

use crate::physics::derived::{ObjectQuantities, SnapshotKey, SnapshotQuantities};
use crate::physics::math::{Scalar, Vector};
use crate::physics::snapshot::{PhysicsObject, Shape, WorldSnapshot};
use crate::render::draw::{DrawCommand, DrawList, Layer, Stroke, TextStyle};
use crate::render::palette;
use crate::render::projector::{CoordinateProjector, ViewTransform};
use bevy::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

pub const WAITING_MESSAGE: &str = "Waiting for simulation data";

/// Upper bound on grid lines per axis, for absurd world sizes
const MAX_GRID_LINES: usize = 400;

/// Fixed pixel and meter constants of the scene.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SceneSettings {
    /// Meters between grid lines
    pub grid_spacing: Scalar,
    /// Pixels per m/s for velocity arrows
    pub velocity_scale: f32,
    /// Displacements at or below this (m) get no arrow
    pub displacement_threshold: Scalar,
    /// Pixels
    pub centripetal_arrow_length: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            grid_spacing: 5.0,
            velocity_scale: 4.0,
            displacement_threshold: 0.1,
            centripetal_arrow_length: 20.0,
        }
    }
}

/// Display toggles owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneOptions {
    pub show_grid: bool,
    pub show_vectors: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_vectors: true,
        }
    }
}

/// A snapshot paired with its derived quantities.
#[derive(Clone, Copy, Debug)]
pub struct SceneFrame<'a> {
    pub snapshot: &'a WorldSnapshot,
    pub quantities: &'a SnapshotQuantities,
}

impl<'a> SceneFrame<'a> {
    pub fn new(snapshot: &'a WorldSnapshot, quantities: &'a SnapshotQuantities) -> Self {
        Self {
            snapshot,
            quantities,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneRenderer {
    settings: SceneSettings,
}

impl SceneRenderer {
    pub fn new(settings: SceneSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Renders one frame. Never fails: a missing snapshot or an empty world
    /// yields the placeholder frame.
    pub fn render(
        &self,
        frame: Option<SceneFrame<'_>>,
        view: &ViewTransform,
        canvas: Vec2,
        options: SceneOptions,
    ) -> DrawList {
        let Some(frame) = frame.filter(|frame| !frame.snapshot.objects.is_empty()) else {
            return DrawList::placeholder(
                canvas,
                palette::BACKGROUND,
                WAITING_MESSAGE,
                TextStyle::new(16.0, palette::LABEL),
            );
        };

        let snapshot = frame.snapshot;
        let recomputed;
        let quantities = if frame.quantities.key() == SnapshotKey::of(snapshot) {
            frame.quantities
        } else {
            recomputed = SnapshotQuantities::of(snapshot);
            &recomputed
        };

        let projector = CoordinateProjector::new(snapshot.extent(), canvas, *view);
        let mut pass = ScenePass {
            settings: &self.settings,
            projector,
            list: DrawList::new(canvas),
        };

        pass.list.fill_background(palette::BACKGROUND);
        pass.ground(snapshot);
        if options.show_grid {
            pass.grid(snapshot);
        }

        let objects = move || snapshot.objects.iter().zip(quantities.iter());
        for (object, _) in objects() {
            pass.trajectory(object);
        }
        for (object, _) in objects() {
            pass.initial_marker(object);
        }
        for (object, derived) in objects() {
            pass.displacement(object, derived);
        }
        for (object, derived) in objects() {
            pass.body(object);
            if options.show_vectors {
                pass.velocity(object, derived);
            }
            pass.circular_motion(object);
        }

        pass.hud(snapshot);
        pass.list
    }

    /// Computes quantities on the spot; for callers without a cache.
    pub fn render_snapshot(
        &self,
        snapshot: &WorldSnapshot,
        view: &ViewTransform,
        canvas: Vec2,
        options: SceneOptions,
    ) -> DrawList {
        let quantities = SnapshotQuantities::of(snapshot);
        self.render(
            Some(SceneFrame::new(snapshot, &quantities)),
            view,
            canvas,
            options,
        )
    }
}

struct ScenePass<'a> {
    settings: &'a SceneSettings,
    projector: CoordinateProjector,
    list: DrawList,
}

impl ScenePass<'_> {
    /// Canvas-space point (pre-view) to screen.
    fn canvas_to_screen(&self, point: Vec2) -> Vec2 {
        self.projector.view().apply(point)
    }

    fn px(&self, pixels: f32) -> f32 {
        self.projector.pixels_to_screen(pixels)
    }

    fn ground(&mut self, snapshot: &WorldSnapshot) {
        let canvas = self.projector.canvas();
        let ground_y = self
            .projector
            .world_to_canvas(Vector::new(0.0, snapshot.ground_level))
            .y as f32;
        if ground_y >= canvas.y {
            return;
        }

        let rect = Rect::from_corners(
            self.canvas_to_screen(Vec2::new(0.0, ground_y.max(0.0))),
            self.canvas_to_screen(canvas),
        );
        self.list.push(
            Layer::Ground,
            DrawCommand::FillRect {
                rect,
                color: palette::translucent(palette::GROUND, palette::GROUND_ALPHA),
            },
        );
    }

    fn grid(&mut self, snapshot: &WorldSnapshot) {
        let spacing = self.settings.grid_spacing;
        if !(spacing.is_finite() && spacing > 0.0) {
            return;
        }

        let canvas = self.projector.canvas();
        let scale = self.projector.scale();
        let stroke = Stroke::solid(palette::GRID, self.px(0.5));
        let extent = self.projector.world_extent();

        let columns = ((extent.x / spacing).floor() as usize).min(MAX_GRID_LINES);
        for i in 0..=columns {
            let x = (i as Scalar * spacing * scale.x) as f32;
            let from = self.canvas_to_screen(Vec2::new(x, 0.0));
            let to = self.canvas_to_screen(Vec2::new(x, canvas.y));
            self.list.line(Layer::Grid, from, to, stroke);
        }

        let rows = ((extent.y / spacing).floor() as usize).min(MAX_GRID_LINES);
        for i in 0..=rows {
            let y = canvas.y - (i as Scalar * spacing * scale.y) as f32;
            let from = self.canvas_to_screen(Vec2::new(0.0, y));
            let to = self.canvas_to_screen(Vec2::new(canvas.x, y));
            self.list.line(Layer::Grid, from, to, stroke);
        }

        let style = TextStyle::new(self.px(10.0), palette::LABEL);
        let labels = [
            ("0".to_string(), Vec2::new(5.0, canvas.y - 5.0)),
            (
                format!("{}m", snapshot.width),
                Vec2::new(canvas.x - 30.0, canvas.y - 5.0),
            ),
            (format!("{}m", snapshot.height), Vec2::new(5.0, 15.0)),
        ];
        for (text, position) in labels {
            let position = self.canvas_to_screen(position);
            self.list.text(Layer::Grid, position, text, style);
        }
    }

    fn trajectory(&mut self, object: &PhysicsObject) {
        if !object.show_trajectory || object.trajectory.len() < 2 {
            return;
        }

        let points = object
            .trajectory
            .iter()
            .map(|sample| self.projector.world_to_screen(sample.position))
            .collect();
        let color = palette::translucent(object.color, palette::TRAJECTORY_ALPHA);
        self.list.push(
            Layer::Trajectory,
            DrawCommand::Polyline {
                points,
                stroke: Stroke::solid(color, self.px(2.0)),
            },
        );
    }

    fn initial_marker(&mut self, object: &PhysicsObject) {
        if object.is_static {
            return;
        }

        let dash = self.px(3.0);
        self.list.push(
            Layer::InitialMarker,
            DrawCommand::StrokeCircle {
                center: self.projector.world_to_screen(object.initial_position),
                radius: self
                    .projector
                    .length_to_screen(object.shape.bounding_radius()),
                stroke: Stroke::dashed(object.color, self.px(1.0), dash, dash),
            },
        );
    }

    fn displacement(&mut self, object: &PhysicsObject, derived: &ObjectQuantities) {
        if object.is_static || derived.displacement_magnitude <= self.settings.displacement_threshold
        {
            return;
        }

        let dash = self.px(5.0);
        self.list.arrow(
            Layer::Displacement,
            self.projector.world_to_screen(object.initial_position),
            self.projector.world_to_screen(object.position),
            self.px(8.0),
            Stroke::dashed(palette::DISPLACEMENT, self.px(2.0), dash, dash),
        );
    }

    fn body(&mut self, object: &PhysicsObject) {
        let center = self.projector.world_to_screen(object.position);
        let outline = Stroke::solid(palette::TEXT, self.px(2.0));

        let half_height = match object.shape {
            Shape::Circle { radius } => {
                let radius = self.projector.length_to_screen(radius);
                self.list.push(
                    Layer::Body,
                    DrawCommand::FillCircle {
                        center,
                        radius,
                        color: object.color,
                    },
                );
                self.list.push(
                    Layer::Body,
                    DrawCommand::StrokeCircle {
                        center,
                        radius,
                        stroke: outline,
                    },
                );
                radius
            }
            Shape::Square { side } => {
                let side = self.projector.length_to_screen(side);
                self.filled_rect(center, Vec2::splat(side), object, outline)
            }
            Shape::Rectangle { width, height } => {
                let size = self.projector.size_to_screen(Vector::new(width, height));
                self.filled_rect(center, size, object, outline)
            }
        };

        self.list.text(
            Layer::Body,
            center - Vec2::new(0.0, half_height + self.px(15.0)),
            object.label.clone(),
            TextStyle::new(self.px(12.0), palette::TEXT)
                .bold()
                .centered(),
        );
    }

    /// Returns half the drawn height.
    fn filled_rect(
        &mut self,
        center: Vec2,
        size: Vec2,
        object: &PhysicsObject,
        outline: Stroke,
    ) -> f32 {
        let rect = Rect::from_center_size(center, size);
        self.list.push(
            Layer::Body,
            DrawCommand::FillRect {
                rect,
                color: object.color,
            },
        );
        self.list.push(
            Layer::Body,
            DrawCommand::StrokeRect {
                rect,
                stroke: outline,
            },
        );
        size.y / 2.0
    }

    fn velocity(&mut self, object: &PhysicsObject, derived: &ObjectQuantities) {
        if !object.show_velocity_vector || derived.speed <= 0.0 {
            return;
        }

        let from = self.projector.world_to_screen(object.position);
        // Pixel Y is flipped relative to world Y
        let arrow = Vec2::new(object.velocity.x as f32, -object.velocity.y as f32)
            * self.px(self.settings.velocity_scale);
        let tip = from + arrow;

        self.list.arrow(
            Layer::Velocity,
            from,
            tip,
            self.px(10.0),
            Stroke::solid(palette::VELOCITY, self.px(3.0)),
        );
        self.list.text(
            Layer::Velocity,
            tip + Vec2::new(self.px(10.0), -self.px(5.0)),
            format!("v={:.1} m/s", derived.speed),
            TextStyle::new(self.px(10.0), palette::VELOCITY).bold(),
        );
    }

    fn circular_motion(&mut self, object: &PhysicsObject) {
        let Some(motion) = object.active_circular_motion() else {
            return;
        };

        let center = self.projector.world_to_screen(motion.center);
        let position = self.projector.world_to_screen(object.position);
        let dash = self.px(5.0);

        self.list.push(
            Layer::CircularMotion,
            DrawCommand::StrokeCircle {
                center,
                radius: self.projector.length_to_screen(motion.radius),
                stroke: Stroke::dashed(palette::ORBIT, self.px(2.0), dash, dash),
            },
        );
        self.list.line(
            Layer::CircularMotion,
            center,
            position,
            Stroke::solid(palette::ORBIT_RADIUS, self.px(1.5)),
        );

        let toward_center = center - position;
        let Some(direction) = toward_center.try_normalize() else {
            return;
        };
        let tip = position + direction * self.px(self.settings.centripetal_arrow_length);
        self.list.arrow(
            Layer::CircularMotion,
            position,
            tip,
            self.px(8.0),
            Stroke::solid(palette::ORBIT, self.px(3.0)),
        );
        self.list.text(
            Layer::CircularMotion,
            tip + Vec2::new(self.px(10.0), 0.0),
            "Fc",
            TextStyle::new(self.px(10.0), palette::ORBIT).bold(),
        );
    }

    /// Drawn in panel space, unaffected by zoom and pan.
    fn hud(&mut self, snapshot: &WorldSnapshot) {
        let totals = &snapshot.totals;
        self.list.text(
            Layer::Hud,
            Vec2::new(10.0, 20.0),
            format!("Time: {:.2} s", snapshot.time),
            TextStyle::new(14.0, palette::TEXT).bold(),
        );

        let lines = [
            format!("KE: {:.2} J", totals.kinetic_energy),
            format!("PE: {:.2} J", totals.potential_energy),
            format!("Total: {:.2} J", totals.mechanical_energy),
            format!("Momentum: {:.2} kg·m/s", totals.momentum_magnitude),
        ];
        for (row, text) in lines.into_iter().enumerate() {
            self.list.text(
                Layer::Hud,
                Vec2::new(10.0, 40.0 + 15.0 * row as f32),
                text,
                TextStyle::new(12.0, palette::TEXT),
            );
        }
    }
}
