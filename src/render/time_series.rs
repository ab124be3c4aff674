//! Motion graphs: position, velocity and acceleration magnitude over time.
//!
//! A trajectory only records positions, so the velocity and acceleration
//! series are reconstructed from the object's current state. They are shaped
//! to look plausible, not to be exact history, and their panels say so.

use crate::physics::derived;
use crate::physics::math::{self, Scalar};
use crate::physics::snapshot::{PhysicsObject, WorldSnapshot};
use crate::render::draw::{DrawCommand, DrawList, Layer, Stroke, TextStyle};
use crate::render::palette;
use bevy::color::Color;
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

pub const NO_GRAPH_MESSAGE: &str = "Start simulation to see graphs";
/// Smallest half-range of an autoscaled Y domain
pub const MIN_EPSILON: Scalar = 0.1;
pub const GRIDLINES: usize = 5;

const PADDING: f32 = 40.0;
const MARKER_RADIUS: f32 = 4.0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SamplingSettings {
    /// Seconds between samples when the trajectory carries no timestamps
    pub fixed_step: Scalar,
    /// Per-sample decay used to back-project the current speed
    pub velocity_decay: Scalar,
    /// Y-domain floor; values below [`MIN_EPSILON`] are raised to it
    pub epsilon: Scalar,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            fixed_step: 0.016,
            velocity_decay: 0.001,
            epsilon: MIN_EPSILON,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Position,
    Velocity,
    Acceleration,
}

impl Quantity {
    pub fn name(&self) -> &'static str {
        match self {
            Quantity::Position => "Position",
            Quantity::Velocity => "Velocity",
            Quantity::Acceleration => "Acceleration",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Quantity::Position => "m",
            Quantity::Velocity => "m/s",
            Quantity::Acceleration => "m/s²",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Quantity::Position => palette::SERIES_POSITION,
            Quantity::Velocity => palette::SERIES_VELOCITY,
            Quantity::Acceleration => palette::SERIES_ACCELERATION,
        }
    }

    /// Whether the series is reconstructed rather than recorded.
    pub fn is_approximate(&self) -> bool {
        !matches!(self, Quantity::Position)
    }

    pub fn title(&self) -> String {
        if self.is_approximate() {
            format!("{} (approx.)", self.name())
        } else {
            self.name().to_string()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPoint {
    pub time: Scalar,
    pub value: Scalar,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub quantity: Quantity,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn values(&self) -> impl Iterator<Item = Scalar> + '_ {
        self.points.iter().map(|point| point.value)
    }

    /// Latest sample time, or one second for a series that never advanced.
    pub fn time_span(&self) -> Scalar {
        let span = self
            .points
            .iter()
            .map(|point| point.time)
            .filter(|time| time.is_finite())
            .fold(0.0, Scalar::max);
        if span > 0.0 { span } else { 1.0 }
    }
}

/// The three parallel series for one object.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionSeries {
    pub position: Series,
    pub velocity: Series,
    pub acceleration: Series,
}

impl MotionSeries {
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        [&self.position, &self.velocity, &self.acceleration].into_iter()
    }
}

/// Y domain `[min(values, -ε), max(values, ε)]`, with ε at least
/// [`MIN_EPSILON`]. Non-finite values are ignored.
pub fn y_domain(values: impl IntoIterator<Item = Scalar>, epsilon: Scalar) -> (Scalar, Scalar) {
    let epsilon = if epsilon.is_finite() {
        epsilon.max(MIN_EPSILON)
    } else {
        MIN_EPSILON
    };

    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold((-epsilon, epsilon), |(low, high), value| {
            (low.min(value), high.max(value))
        })
}

#[derive(Clone, Debug, Default)]
pub struct TimeSeriesSampler {
    settings: SamplingSettings,
}

impl TimeSeriesSampler {
    pub fn new(settings: SamplingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SamplingSettings {
        &self.settings
    }

    fn time_of(&self, index: usize, recorded: Option<Scalar>) -> Scalar {
        recorded.unwrap_or(index as Scalar * self.settings.fixed_step)
    }

    pub fn sample(&self, object: &PhysicsObject) -> MotionSeries {
        let trajectory = &object.trajectory;
        let speed = derived::speed(object.velocity);
        let acceleration = math::magnitude(object.acceleration);
        let last = trajectory.len().saturating_sub(1);

        let series = |quantity, value: &dyn Fn(usize, Scalar) -> Scalar| Series {
            quantity,
            points: trajectory
                .iter()
                .enumerate()
                .map(|(index, sample)| SeriesPoint {
                    time: self.time_of(index, sample.time),
                    value: value(index, math::magnitude(sample.position)),
                })
                .collect(),
        };

        MotionSeries {
            position: series(Quantity::Position, &|_, distance| distance),
            velocity: series(Quantity::Velocity, &|index, _| {
                if index == last {
                    speed
                } else {
                    speed * (1.0 - index as Scalar * self.settings.velocity_decay).max(0.0)
                }
            }),
            acceleration: series(Quantity::Acceleration, &|_, _| acceleration),
        }
    }

    /// One autoscaled chart, or the placeholder for a missing or empty series.
    pub fn render(&self, series: Option<&Series>, canvas: Vec2) -> DrawList {
        let Some(series) = series.filter(|series| !series.is_empty()) else {
            return DrawList::placeholder(
                canvas,
                palette::BACKGROUND,
                NO_GRAPH_MESSAGE,
                TextStyle::new(14.0, palette::LABEL),
            );
        };

        let quantity = series.quantity;
        let mut list = DrawList::new(canvas);
        list.fill_background(palette::BACKGROUND);
        list.text(
            Layer::Hud,
            Vec2::new(canvas.x / 2.0, 15.0),
            quantity.title(),
            TextStyle::new(12.0, palette::TEXT).bold().centered(),
        );

        let plot_min = Vec2::splat(PADDING);
        let plot_max = canvas - Vec2::splat(PADDING);
        let plot = plot_max - plot_min;

        list.push(
            Layer::Axis,
            DrawCommand::Polyline {
                points: vec![
                    plot_min,
                    Vec2::new(plot_min.x, plot_max.y),
                    plot_max,
                ],
                stroke: Stroke::solid(palette::AXIS, 2.0),
            },
        );
        let caption = TextStyle::new(10.0, palette::LABEL);
        list.text(
            Layer::Axis,
            Vec2::new(canvas.x / 2.0, canvas.y - 10.0),
            "Time (s)",
            caption.centered(),
        );
        list.text(
            Layer::Axis,
            Vec2::new(5.0, PADDING - 8.0),
            format!("{} ({})", quantity.name(), quantity.unit()),
            caption,
        );

        let (low, high) = y_domain(series.values(), self.settings.epsilon);
        let range = high - low;
        for i in 0..GRIDLINES {
            let fraction = i as f32 / (GRIDLINES - 1) as f32;
            let y = plot_min.y + plot.y * fraction;
            list.line(
                Layer::Grid,
                Vec2::new(plot_min.x, y),
                Vec2::new(plot_max.x, y),
                Stroke::solid(palette::CHART_GRID, 1.0),
            );
            list.text(
                Layer::Grid,
                Vec2::new(plot_min.x - 5.0, y + 3.0),
                format!("{:.1}", high - range * Scalar::from(fraction)),
                TextStyle::new(9.0, palette::LABEL).right_aligned(),
            );
        }

        let span = series.time_span();
        let to_panel = |point: &SeriesPoint| {
            Vec2::new(
                plot_min.x + (point.time / span) as f32 * plot.x,
                plot_max.y - ((point.value - low) / range) as f32 * plot.y,
            )
        };

        list.push(
            Layer::Series,
            DrawCommand::Polyline {
                points: series
                    .points
                    .iter()
                    .filter(|point| point.time.is_finite() && point.value.is_finite())
                    .map(to_panel)
                    .collect(),
                stroke: Stroke::solid(quantity.color(), 2.0),
            },
        );

        if let Some(last) = series.last().filter(|point| point.value.is_finite()) {
            let marker = to_panel(last);
            list.push(
                Layer::Series,
                DrawCommand::FillCircle {
                    center: marker,
                    radius: MARKER_RADIUS,
                    color: quantity.color(),
                },
            );
            list.text(
                Layer::Series,
                Vec2::new(plot_max.x + 5.0, marker.y + 3.0),
                format!("{:.2} {}", last.value, quantity.unit()),
                TextStyle::new(10.0, quantity.color()).bold(),
            );
        }

        list
    }

    /// Position, velocity and acceleration charts for the first non-static
    /// object of the snapshot.
    pub fn panels(&self, snapshot: Option<&WorldSnapshot>, canvas: Vec2) -> [DrawList; 3] {
        let series = snapshot
            .and_then(WorldSnapshot::first_dynamic_object)
            .map(|object| self.sample(object));

        match series {
            Some(series) => [
                self.render(Some(&series.position), canvas),
                self.render(Some(&series.velocity), canvas),
                self.render(Some(&series.acceleration), canvas),
            ],
            None => [
                self.render(None, canvas),
                self.render(None, canvas),
                self.render(None, canvas),
            ],
        }
    }
}
