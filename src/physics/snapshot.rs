//! World snapshots delivered by the external simulation driver.
//!
//! A [`WorldSnapshot`] is immutable for the duration of a render pass and is
//! replaced wholesale whenever the driver steps, resets or edits the world.
//! Nothing in this crate advances simulation time.

use crate::physics::derived;
use crate::physics::math::{Scalar, Vector};
use crate::render::palette::{self, hex_color};
use bevy::color::Color;
use serde::{Deserialize, Serialize};

/// Geometry of a body. Sizes are in world meters.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: Scalar },
    Square { side: Scalar },
    Rectangle { width: Scalar, height: Scalar },
}

impl Shape {
    /// Distance from the body's center to its lowest point.
    pub fn half_height(&self) -> Scalar {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Square { side } => side / 2.0,
            Shape::Rectangle { height, .. } => height / 2.0,
        }
    }

    /// Radius of the smallest circle centered on the body that encloses it
    /// along either axis.
    pub fn bounding_radius(&self) -> Scalar {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Square { side } => side / 2.0,
            Shape::Rectangle { width, height } => width.max(height) / 2.0,
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Circle { radius: 0.5 }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollisionType {
    #[default]
    Elastic,
    Inelastic,
    PerfectlyInelastic,
}

/// Forced circular motion of a body around a fixed center.
///
/// Tangential velocity, centripetal acceleration, period and frequency are
/// always derived through [`crate::physics::derived`], never stored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CircularMotionState {
    pub center: Vector,
    pub radius: Scalar,
    /// Radians per second
    pub angular_velocity: Scalar,
    /// Radians
    pub angle: Scalar,
    pub enabled: bool,
    #[serde(default)]
    pub clockwise: bool,
}

/// One recorded position along an object's path.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryPoint {
    pub position: Vector,
    /// Simulation time of the sample, when the driver recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Scalar>,
}

impl TrajectoryPoint {
    pub fn new(position: Vector) -> Self {
        Self {
            position,
            time: None,
        }
    }

    pub fn at(position: Vector, time: Scalar) -> Self {
        Self {
            position,
            time: Some(time),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PhysicsObject {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub shape: Shape,
    pub mass: Scalar,
    pub position: Vector,
    #[serde(default)]
    pub velocity: Vector,
    #[serde(default)]
    pub acceleration: Vector,
    pub initial_position: Vector,
    #[serde(with = "hex_color", default = "default_object_color")]
    pub color: Color,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default = "enabled")]
    pub show_velocity_vector: bool,
    #[serde(default = "enabled")]
    pub show_trajectory: bool,
    #[serde(default)]
    pub collision_type: CollisionType,
    #[serde(default = "default_restitution")]
    pub restitution: Scalar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circular_motion: Option<CircularMotionState>,
    /// Append-only path history, oldest first
    #[serde(default)]
    pub trajectory: Vec<TrajectoryPoint>,
}

fn default_object_color() -> Color {
    palette::DEFAULT_OBJECT
}

fn enabled() -> bool {
    true
}

fn default_restitution() -> Scalar {
    1.0
}

impl PhysicsObject {
    /// A dynamic circular body at rest, starting where it currently is.
    pub fn new(id: impl Into<String>, mass: Scalar, position: Vector) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            shape: Shape::default(),
            mass,
            position,
            velocity: Vector::ZERO,
            acceleration: Vector::ZERO,
            initial_position: position,
            color: palette::DEFAULT_OBJECT,
            is_static: false,
            show_velocity_vector: true,
            show_trajectory: true,
            collision_type: CollisionType::default(),
            restitution: default_restitution(),
            circular_motion: None,
            trajectory: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vector) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_initial_position(mut self, initial_position: Vector) -> Self {
        self.initial_position = initial_position;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_circular_motion(mut self, circular_motion: CircularMotionState) -> Self {
        self.circular_motion = Some(circular_motion);
        self
    }

    pub fn with_trajectory(mut self, trajectory: Vec<TrajectoryPoint>) -> Self {
        self.trajectory = trajectory;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Circular motion state, only when it is switched on.
    pub fn active_circular_motion(&self) -> Option<&CircularMotionState> {
        self.circular_motion.as_ref().filter(|motion| motion.enabled)
    }
}

/// Aggregate energy and momentum of the whole world.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldTotals {
    pub kinetic_energy: Scalar,
    pub potential_energy: Scalar,
    pub mechanical_energy: Scalar,
    pub momentum_magnitude: Scalar,
}

impl WorldTotals {
    /// Recomputes totals from the objects themselves.
    ///
    /// Potential energy is measured from `reference_height`; momentum is the
    /// magnitude of the vector sum of every object's momentum.
    pub fn from_objects(
        objects: &[PhysicsObject],
        gravity_strength: Scalar,
        reference_height: Scalar,
    ) -> Self {
        let mut kinetic_energy = 0.0;
        let mut potential_energy = 0.0;
        let mut momentum = Vector::ZERO;

        for object in objects {
            kinetic_energy += derived::kinetic_energy(object.mass, object.velocity);
            potential_energy += derived::potential_energy(
                object.mass,
                gravity_strength,
                object.position.y - reference_height,
            );
            momentum += derived::momentum(object.mass, object.velocity);
        }

        Self {
            kinetic_energy,
            potential_energy,
            mechanical_energy: kinetic_energy + potential_energy,
            momentum_magnitude: crate::physics::math::magnitude(momentum),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    /// Monotonic counter bumped by the driver on every delivery, used as a
    /// memoization key; zero when the driver does not provide one
    #[serde(default)]
    pub version: u64,
    /// World extent in meters
    pub width: Scalar,
    pub height: Scalar,
    #[serde(default)]
    pub ground_level: Scalar,
    #[serde(default = "enabled")]
    pub gravity_enabled: bool,
    #[serde(default = "default_gravity")]
    pub gravity_strength: Scalar,
    #[serde(default = "enabled")]
    pub collision_enabled: bool,
    #[serde(default)]
    pub time: Scalar,
    #[serde(default)]
    pub objects: Vec<PhysicsObject>,
    #[serde(default)]
    pub totals: WorldTotals,
}

fn default_gravity() -> Scalar {
    9.8
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            version: 0,
            width: 100.0,
            height: 100.0,
            ground_level: 0.0,
            gravity_enabled: true,
            gravity_strength: default_gravity(),
            collision_enabled: true,
            time: 0.0,
            objects: Vec::new(),
            totals: WorldTotals::default(),
        }
    }
}

impl WorldSnapshot {
    /// World extent as a vector (meters).
    pub fn extent(&self) -> Vector {
        Vector::new(self.width, self.height)
    }

    /// The body the single-object panels (free body diagram, motion graphs)
    /// describe: the first one that is not static.
    pub fn first_dynamic_object(&self) -> Option<&PhysicsObject> {
        self.objects.iter().find(|object| !object.is_static)
    }

    pub fn object(&self, id: &str) -> Option<&PhysicsObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn with_object(mut self, object: PhysicsObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Recomputes [`WorldTotals`] from the current objects, measuring
    /// potential energy from the ground.
    pub fn with_recomputed_totals(mut self) -> Self {
        self.totals =
            WorldTotals::from_objects(&self.objects, self.gravity_strength, self.ground_level);
        self
    }
}
