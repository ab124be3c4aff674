//! Free body diagram panel.
//!
//! Shows the forces inferred for the first non-static object as arrows from
//! a fixed disk at the panel center. Arrow length is proportional to
//! magnitude up to a cap, so large forces stay inside the panel.

use crate::physics::forces::{ForceInferenceEngine, ForceVector};
use crate::physics::math::{self, Scalar};
use crate::physics::snapshot::{PhysicsObject, WorldSnapshot};
use crate::render::draw::{DrawCommand, DrawList, Layer, Stroke, TextStyle};
use crate::render::palette;
use crate::render::scene::WAITING_MESSAGE;
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

pub const TITLE: &str = "Free Body Diagram";
/// Appended to the labels of forces that are illustrative estimates
pub const ESTIMATE_SUFFIX: &str = " (est.)";

const ARROW_HEAD: f32 = 12.0;
const LABEL_OFFSET: f32 = 20.0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FreeBodySettings {
    /// Pixels per newton
    pub force_scale: f32,
    /// Longest arrow, in pixels
    pub max_arrow_length: f32,
    /// Radius of the body disk, in pixels
    pub body_radius: f32,
}

impl Default for FreeBodySettings {
    fn default() -> Self {
        Self {
            force_scale: 3.0,
            max_arrow_length: 80.0,
            body_radius: 30.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FreeBodyRenderer {
    settings: FreeBodySettings,
}

impl FreeBodyRenderer {
    pub fn new(settings: FreeBodySettings) -> Self {
        Self { settings }
    }

    /// Arrow length in pixels; clamped, not rescaled.
    pub fn arrow_length(&self, magnitude: Scalar) -> f32 {
        (magnitude as f32 * self.settings.force_scale)
            .min(self.settings.max_arrow_length)
            .max(0.0)
    }

    pub fn render(
        &self,
        snapshot: Option<&WorldSnapshot>,
        engine: &ForceInferenceEngine,
        canvas: Vec2,
    ) -> DrawList {
        let Some(snapshot) = snapshot.filter(|snapshot| !snapshot.objects.is_empty()) else {
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

        let Some(object) = snapshot.first_dynamic_object() else {
            return list;
        };

        let center = canvas / 2.0;
        self.body(&mut list, object, center);
        for force in engine.infer(object, snapshot) {
            self.force(&mut list, &force, center);
        }
        self.legend(&mut list, object, canvas);
        list
    }

    fn body(&self, list: &mut DrawList, object: &PhysicsObject, center: Vec2) {
        let radius = self.settings.body_radius;
        list.push(
            Layer::Body,
            DrawCommand::FillCircle {
                center,
                radius,
                color: object.color,
            },
        );
        list.push(
            Layer::Body,
            DrawCommand::StrokeCircle {
                center,
                radius,
                stroke: Stroke::solid(palette::TEXT, 2.0),
            },
        );
        list.text(
            Layer::Body,
            center + Vec2::new(0.0, 5.0),
            object.label.clone(),
            TextStyle::new(12.0, palette::TEXT).bold().centered(),
        );
    }

    fn force(&self, list: &mut DrawList, force: &ForceVector, center: Vec2) {
        let length = self.arrow_length(force.magnitude);
        // World angles are Y-up, the panel is Y-down
        let direction = {
            let unit = math::unit_from_angle(force.direction);
            Vec2::new(unit.x as f32, -unit.y as f32)
        };

        list.arrow(
            Layer::Force,
            center,
            center + direction * length,
            ARROW_HEAD,
            Stroke::solid(force.color, 3.0),
        );

        let label = center + direction * (length + LABEL_OFFSET);
        let name = if force.is_heuristic() {
            format!("{}{ESTIMATE_SUFFIX}", force.name)
        } else {
            force.name.to_string()
        };
        list.text(
            Layer::Force,
            label,
            name,
            TextStyle::new(11.0, force.color).bold().centered(),
        );
        list.text(
            Layer::Force,
            label + Vec2::new(0.0, 12.0),
            format!("{:.1} N", force.magnitude),
            TextStyle::new(10.0, force.color).centered(),
        );
    }

    fn legend(&self, list: &mut DrawList, object: &PhysicsObject, canvas: Vec2) {
        let style = TextStyle::new(11.0, palette::TEXT);
        list.text(
            Layer::Legend,
            Vec2::new(10.0, canvas.y - 30.0),
            format!("Mass: {:.2} kg", object.mass),
            style,
        );
        list.text(
            Layer::Legend,
            Vec2::new(10.0, canvas.y - 15.0),
            format!("|a|: {:.2} m/s²", math::magnitude(object.acceleration)),
            style,
        );
    }
}
