//! Energy over time: kinetic, potential and mechanical on one shared scale.

use crate::physics::energy::{EnergySample, EnergyStatistics};
use crate::physics::math::Scalar;
use crate::render::draw::{DrawCommand, DrawList, Layer, Stroke, TextStyle};
use crate::render::palette;
use bevy::color::Color;
use bevy::math::{Rect, Vec2};

pub const NO_DATA_MESSAGE: &str = "No data yet";

const PADDING: f32 = 40.0;
const GRID_DIVISIONS: usize = 5;
/// Smallest top of the energy axis, so an all-zero history still has height
const MIN_SCALE: Scalar = 0.1;

#[derive(Clone, Copy)]
struct Curve {
    label: &'static str,
    color: Color,
    value: fn(&EnergySample) -> Scalar,
}

const CURVES: [Curve; 3] = [
    Curve {
        label: "Kinetic",
        color: palette::ENERGY_KINETIC,
        value: |sample| sample.kinetic,
    },
    Curve {
        label: "Potential",
        color: palette::ENERGY_POTENTIAL,
        value: |sample| sample.potential,
    },
    Curve {
        label: "Total",
        color: palette::ENERGY_MECHANICAL,
        value: |sample| sample.mechanical,
    },
];

/// Energy axis `[bottom, top]`: top is the largest energy in the history,
/// bottom is zero unless some energy went negative.
pub fn energy_domain(samples: &[EnergySample]) -> (Scalar, Scalar) {
    let finite = samples
        .iter()
        .flat_map(|sample| [sample.kinetic, sample.potential, sample.mechanical])
        .filter(|value| value.is_finite());

    let (low, high) = finite.fold((0.0, Scalar::NEG_INFINITY), |(low, high), value| {
        (Scalar::min(low, value), Scalar::max(high, value))
    });
    (low, high.max(low + MIN_SCALE))
}

#[derive(Clone, Debug, Default)]
pub struct EnergyHistoryRenderer;

impl EnergyHistoryRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn statistics(&self, samples: &[EnergySample]) -> Option<EnergyStatistics> {
        EnergyStatistics::from_samples(samples)
    }

    pub fn render(&self, samples: &[EnergySample], canvas: Vec2) -> DrawList {
        let Some(statistics) = self.statistics(samples) else {
            return DrawList::placeholder(
                canvas,
                palette::BACKGROUND,
                NO_DATA_MESSAGE,
                TextStyle::new(14.0, palette::LABEL),
            );
        };

        let mut list = DrawList::new(canvas);
        list.fill_background(palette::CHART_BACKGROUND);

        let plot_min = Vec2::splat(PADDING);
        let plot_max = canvas - Vec2::splat(PADDING);
        let plot = plot_max - plot_min;

        list.push(
            Layer::Axis,
            DrawCommand::Polyline {
                points: vec![plot_min, Vec2::new(plot_min.x, plot_max.y), plot_max],
                stroke: Stroke::solid(palette::AXIS, 2.0),
            },
        );
        let caption = TextStyle::new(11.0, palette::TEXT);
        list.text(
            Layer::Axis,
            Vec2::new(canvas.x / 2.0, canvas.y - 10.0),
            "Time (s)",
            caption.centered(),
        );
        list.text(Layer::Axis, Vec2::new(5.0, PADDING - 8.0), "Energy (J)", caption);

        let (bottom, top) = energy_domain(samples);
        let range = top - bottom;
        for i in 0..=GRID_DIVISIONS {
            let fraction = i as f32 / GRID_DIVISIONS as f32;
            let y = plot_min.y + plot.y * fraction;
            list.line(
                Layer::Grid,
                Vec2::new(plot_min.x, y),
                Vec2::new(plot_max.x, y),
                Stroke::solid(palette::CHART_GRID, 1.0),
            );
            list.text(
                Layer::Grid,
                Vec2::new(plot_min.x - 5.0, y + 4.0),
                format!("{:.1}", top - range * Scalar::from(fraction)),
                TextStyle::new(9.0, palette::TEXT).right_aligned(),
            );
        }

        let span = samples
            .last()
            .map(|sample| sample.time)
            .filter(|time| time.is_finite() && *time > 0.0)
            .unwrap_or(1.0);
        let to_panel = |time: Scalar, energy: Scalar| {
            Vec2::new(
                plot_min.x + (time / span) as f32 * plot.x,
                plot_max.y - ((energy - bottom) / range) as f32 * plot.y,
            )
        };

        for curve in CURVES {
            let points = samples
                .iter()
                .map(|sample| (sample.time, (curve.value)(sample)))
                .filter(|(time, energy)| time.is_finite() && energy.is_finite())
                .map(|(time, energy)| to_panel(time, energy))
                .collect();
            list.push(
                Layer::Series,
                DrawCommand::Polyline {
                    points,
                    stroke: Stroke::solid(curve.color, 2.5),
                },
            );
        }

        self.legend(&mut list, canvas);
        Self::summary(&mut list, &statistics);
        list
    }

    fn legend(&self, list: &mut DrawList, canvas: Vec2) {
        let origin = Vec2::new(canvas.x - PADDING - 120.0, PADDING + 20.0);
        for (row, curve) in CURVES.iter().enumerate() {
            let top_left = origin + Vec2::new(0.0, 20.0 * row as f32);
            list.push(
                Layer::Legend,
                DrawCommand::FillRect {
                    rect: Rect::from_corners(top_left, top_left + Vec2::new(15.0, 3.0)),
                    color: curve.color,
                },
            );
            list.text(
                Layer::Legend,
                top_left + Vec2::new(20.0, 3.0),
                curve.label,
                TextStyle::new(11.0, palette::TEXT),
            );
        }
    }

    fn summary(list: &mut DrawList, statistics: &EnergyStatistics) {
        let lines = [
            format!("Initial Energy: {:.2} J", statistics.initial_energy),
            format!("Energy Loss: {:.2} J", statistics.energy_loss),
            format!("Conservation: {:.1}%", statistics.conservation_percentage),
        ];
        for (column, text) in lines.into_iter().enumerate() {
            list.text(
                Layer::Hud,
                Vec2::new(PADDING + 180.0 * column as f32, 20.0),
                text,
                TextStyle::new(11.0, palette::TEXT).bold(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = Vec2::new(600.0, 250.0);

    fn sample(time: Scalar, kinetic: Scalar, potential: Scalar) -> EnergySample {
        EnergySample {
            time,
            kinetic,
            potential,
            mechanical: kinetic + potential,
        }
    }

    #[test]
    fn test_empty_history_renders_placeholder() {
        let list = EnergyHistoryRenderer::new().render(&[], CANVAS);

        assert!(list.contains_text(NO_DATA_MESSAGE));
        assert_eq!(list.count(Layer::Series), 0);
    }

    #[test]
    fn test_shared_scale_is_peak_energy() {
        let samples = [sample(0.0, 0.0, 100.0), sample(1.0, 80.0, 20.0)];
        assert_eq!(energy_domain(&samples), (0.0, 100.0));

        let list = EnergyHistoryRenderer::new().render(&samples, CANVAS);
        assert!(list.contains_text("100.0"));
    }

    #[test]
    fn test_all_zero_history_has_height() {
        let samples = [sample(0.0, 0.0, 0.0)];
        let (bottom, top) = energy_domain(&samples);
        assert!(top - bottom >= MIN_SCALE);

        let list = EnergyHistoryRenderer::new().render(&samples, CANVAS);
        assert!(list.contains_text("Conservation: 100.0%"));
        for command in list.in_layer(Layer::Series) {
            if let DrawCommand::Polyline { points, .. } = command {
                assert!(points.iter().all(|point| point.is_finite()));
            }
        }
    }

    #[test]
    fn test_three_curves_and_legend() {
        let samples = [
            sample(0.0, 0.0, 50.0),
            sample(0.5, 25.0, 25.0),
            sample(1.0, 48.0, 0.0),
        ];

        let list = EnergyHistoryRenderer::new().render(&samples, CANVAS);

        assert_eq!(list.count(Layer::Series), 3);
        for label in ["Kinetic", "Potential", "Total"] {
            assert!(list.contains_text(label));
        }
        assert!(list.contains_text("Initial Energy: 50.00 J"));
        assert!(list.contains_text("Energy Loss: 2.00 J"));
        assert!(list.contains_text("Conservation: 96.0%"));
    }

    #[test]
    fn test_negative_potential_extends_axis_down() {
        let samples = [sample(0.0, 10.0, -30.0)];
        assert_eq!(energy_domain(&samples), (-30.0, 10.0));
    }
}
