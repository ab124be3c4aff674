//! Object info panel.
//!
//! A read-only readout of the derived quantities of the first non-static
//! object: linear and energy values on the left, circular-motion values on
//! the right. Every number comes from [`SnapshotQuantities`], so it matches
//! what the scene HUD and the force arrows show.

use crate::physics::derived::{CircularQuantities, ObjectQuantities, format_period};
use crate::physics::snapshot::PhysicsObject;
use crate::render::draw::{DrawList, Layer, TextStyle};
use crate::render::palette;
use crate::render::scene::{SceneFrame, WAITING_MESSAGE};
use bevy::math::Vec2;

pub const TITLE: &str = "Object Info";
pub const NO_CIRCULAR_MOTION: &str = "No circular motion";

const FIRST_ROW: f32 = 45.0;
const ROW_HEIGHT: f32 = 16.0;
const COLUMN_MARGIN: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct QuantitiesRenderer;

impl QuantitiesRenderer {
    pub fn render(&self, frame: Option<SceneFrame>, canvas: Vec2) -> DrawList {
        let Some(frame) = frame.filter(|frame| !frame.snapshot.objects.is_empty()) else {
            return DrawList::placeholder(
                canvas,
                palette::BACKGROUND,
                WAITING_MESSAGE,
                TextStyle::new(14.0, palette::LABEL),
            );
        };

        let mut list = DrawList::new(canvas);
        list.fill_background(palette::BACKGROUND);
        list.text(
            Layer::Hud,
            Vec2::new(canvas.x / 2.0, 20.0),
            TITLE,
            TextStyle::new(14.0, palette::TEXT).bold().centered(),
        );

        let Some((index, object)) = frame
            .snapshot
            .objects
            .iter()
            .enumerate()
            .find(|(_, object)| !object.is_static)
        else {
            return list;
        };
        let Some(quantities) = frame.quantities.object(index) else {
            return list;
        };

        let right = canvas.x / 2.0 + COLUMN_MARGIN;
        Self::column(&mut list, COLUMN_MARGIN, linear_lines(object, quantities));
        match &quantities.circular {
            Some(circular) => Self::column(&mut list, right, circular_lines(circular)),
            None => list.text(
                Layer::Legend,
                Vec2::new(right, FIRST_ROW),
                NO_CIRCULAR_MOTION,
                TextStyle::new(11.0, palette::LABEL),
            ),
        }
        list
    }

    fn column(list: &mut DrawList, x: f32, lines: Vec<String>) {
        for (row, text) in lines.into_iter().enumerate() {
            list.text(
                Layer::Legend,
                Vec2::new(x, FIRST_ROW + ROW_HEIGHT * row as f32),
                text,
                TextStyle::new(11.0, palette::TEXT),
            );
        }
    }
}

fn linear_lines(object: &PhysicsObject, quantities: &ObjectQuantities) -> Vec<String> {
    vec![
        object.label.clone(),
        format!("v: {:.2} m/s", quantities.speed),
        format!("KE: {:.2} J", quantities.kinetic_energy),
        format!("PE: {:.2} J", quantities.potential_energy),
        format!("E: {:.2} J", quantities.mechanical_energy),
        format!("p: {:.2} kg·m/s", quantities.momentum_magnitude),
        format!(
            "p = ({:.1}, {:.1})",
            quantities.momentum.x, quantities.momentum.y
        ),
        format!("Δr: {:.2} m", quantities.displacement_magnitude),
        format!("Distance: {:.2} m", quantities.distance_traveled),
    ]
}

fn circular_lines(circular: &CircularQuantities) -> Vec<String> {
    vec![
        format!("v_t: {:.2} m/s", circular.tangential_velocity),
        format!("a_c: {:.2} m/s²", circular.centripetal_acceleration),
        format!("Fc: {:.2} N", circular.centripetal_force),
        format!("Period: {}", format_period(circular.period)),
        format!("Frequency: {:.3} Hz", circular.frequency),
        format!("Angle: {:.1}°", circular.angle_degrees),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::derived::SnapshotQuantities;
    use crate::physics::math::Vector;
    use crate::physics::snapshot::{CircularMotionState, TrajectoryPoint, WorldSnapshot};

    const CANVAS: Vec2 = Vec2::new(250.0, 220.0);

    fn orbit(angular_velocity: f64) -> CircularMotionState {
        CircularMotionState {
            center: Vector::new(50.0, 50.0),
            radius: 10.0,
            angular_velocity,
            angle: core::f64::consts::FRAC_PI_2,
            enabled: true,
            clockwise: false,
        }
    }

    fn render(snapshot: &WorldSnapshot) -> DrawList {
        let quantities = SnapshotQuantities::of(snapshot);
        QuantitiesRenderer.render(Some(SceneFrame::new(snapshot, &quantities)), CANVAS)
    }

    #[test]
    fn test_stationary_orbit_shows_infinite_period() {
        let snapshot = WorldSnapshot::default().with_object(
            PhysicsObject::new("bob", 1.0, Vector::new(50.0, 60.0)).with_circular_motion(orbit(0.0)),
        );

        let list = render(&snapshot);

        assert!(list.contains_text("Period: ∞"));
        assert!(list.contains_text("Frequency: 0.000 Hz"));
        assert!(list.texts().all(|text| !text.contains("NaN") && !text.contains("inf")));
    }

    #[test]
    fn test_turning_orbit_shows_frequency_angle_and_force() {
        let snapshot = WorldSnapshot::default().with_object(
            PhysicsObject::new("bob", 3.0, Vector::new(50.0, 60.0)).with_circular_motion(orbit(2.0)),
        );

        let list = render(&snapshot);

        // T = 2π/2 = π, f = 1/π
        assert!(list.contains_text("Period: 3.14 s"));
        assert!(list.contains_text("Frequency: 0.318 Hz"));
        assert!(list.contains_text("Angle: 90.0°"));
        // 3 kg · 2² · 10 m
        assert!(list.contains_text("Fc: 120.00 N"));
        assert!(!list.contains_text(NO_CIRCULAR_MOTION));
    }

    #[test]
    fn test_linear_readout_of_first_moving_object() {
        let ball = PhysicsObject::new("ball", 2.0, Vector::new(3.0, 0.0))
            .with_label("Ball")
            .with_initial_position(Vector::ZERO)
            .with_velocity(Vector::new(3.0, 4.0))
            .with_trajectory(vec![
                TrajectoryPoint::new(Vector::ZERO),
                TrajectoryPoint::new(Vector::new(3.0, 4.0)),
                TrajectoryPoint::new(Vector::new(3.0, 0.0)),
            ]);
        let snapshot = WorldSnapshot::default()
            .with_object(PhysicsObject::new("floor", 9.0, Vector::new(50.0, 0.0)).fixed())
            .with_object(ball);

        let list = render(&snapshot);

        assert!(list.contains_text("Ball"));
        assert!(list.contains_text("v: 5.00 m/s"));
        assert!(list.contains_text("KE: 25.00 J"));
        assert!(list.contains_text("p: 10.00 kg·m/s"));
        assert!(list.contains_text("p = (6.0, 8.0)"));
        assert!(list.contains_text("Δr: 3.00 m"));
        assert!(list.contains_text("Distance: 9.00 m"));
        assert!(list.contains_text(NO_CIRCULAR_MOTION));
    }

    #[test]
    fn test_static_only_world_shows_title_only() {
        let snapshot = WorldSnapshot::default()
            .with_object(PhysicsObject::new("floor", 9.0, Vector::new(50.0, 0.0)).fixed());

        let list = render(&snapshot);

        assert!(list.contains_text(TITLE));
        assert_eq!(list.count(Layer::Legend), 0);
    }

    #[test]
    fn test_missing_snapshot_renders_placeholder() {
        let list = QuantitiesRenderer.render(None, CANVAS);
        assert!(list.contains_text(WAITING_MESSAGE));
        assert_eq!(list.count(Layer::Legend), 0);
    }
}
