//! Force inference for free body diagrams.
//!
//! The simulation driver does not report the forces it applied, so the free
//! body diagram is reconstructed from an object's kinematic state and the
//! world configuration. This is a heuristic reconstruction for explanation,
//! not a physically exact decomposition:
//!
//! - **Gravity**, **Net force**, **Normal** and **Centripetal** follow
//!   directly from mass, acceleration, gravity and the circular-motion state.
//! - **Tension** and **Applied** are illustrative estimates whose constants
//!   live in [`ForceHeuristics`]. They are tagged [`Provenance::Heuristic`]
//!   and the free body panel labels them as estimates.
//!
//! Each rule is a [`ForceContributor`] evaluated independently; the engine
//! keeps them in insertion order, which is also the drawing order. New rules
//! are added with [`ForceInferenceEngine::with_contributor`] without touching
//! any rendering code.

use crate::physics::derived;
use crate::physics::math::{self, PI, Scalar, Vector};
use crate::physics::snapshot::{PhysicsObject, WorldSnapshot};
use crate::render::palette;
use bevy::color::Color;
use bevy::log::trace;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForceKind {
    Gravity,
    Net,
    Normal,
    Tension,
    Applied,
    Centripetal,
}

impl ForceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ForceKind::Gravity => "Gravity (Fg)",
            ForceKind::Net => "Net Force (ΣF)",
            ForceKind::Normal => "Normal (N)",
            ForceKind::Tension => "Tension (T)",
            ForceKind::Applied => "Applied (Fa)",
            ForceKind::Centripetal => "Centripetal (Fc)",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            ForceKind::Gravity => palette::FORCE_GRAVITY,
            ForceKind::Net => palette::FORCE_NET,
            ForceKind::Normal => palette::FORCE_NORMAL,
            ForceKind::Tension => palette::FORCE_TENSION,
            ForceKind::Applied => palette::FORCE_APPLIED,
            ForceKind::Centripetal => palette::FORCE_CENTRIPETAL,
        }
    }
}

/// How much a displayed force can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    /// Follows from the object's state and the world configuration
    Derived,
    /// Illustrative estimate, not backed by the solver's dynamics
    Heuristic,
}

/// A labeled force arrow, produced fresh for each render.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceVector {
    pub kind: ForceKind,
    pub name: &'static str,
    /// Newtons, never negative
    pub magnitude: Scalar,
    /// Radians, counter-clockwise from +X with Y up
    pub direction: Scalar,
    pub color: Color,
    pub provenance: Provenance,
}

impl ForceVector {
    pub fn is_heuristic(&self) -> bool {
        self.provenance == Provenance::Heuristic
    }
}

/// Tunable constants of the inference rules.
///
/// The tension and applied-force constants have no physical derivation; they
/// only shape the illustrative arrows.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ForceHeuristics {
    /// Minimum |m·a| (N) before a net force arrow is shown
    pub net_force_threshold: Scalar,
    /// Extra height (m) above ground + half height still counted as touching
    pub ground_contact_tolerance: Scalar,
    pub tension_speed_threshold: Scalar,
    /// Height (m) above ground an object must exceed to be treated as hanging
    pub tension_height_margin: Scalar,
    /// Tension = m·(g + v²/divisor)
    pub tension_speed_divisor: Scalar,
    /// World point tension pulls toward
    pub tension_anchor: Vector,
    /// Per-axis speed (m/s) above which an applied force is assumed
    pub applied_velocity_threshold: Scalar,
    /// Applied = m·|v|·scale
    pub applied_scale: Scalar,
    pub applied_min_magnitude: Scalar,
}

impl Default for ForceHeuristics {
    fn default() -> Self {
        Self {
            net_force_threshold: 0.1,
            ground_contact_tolerance: 0.5,
            tension_speed_threshold: 0.5,
            tension_height_margin: 5.0,
            tension_speed_divisor: 10.0,
            tension_anchor: Vector::new(50.0, 50.0),
            applied_velocity_threshold: 0.5,
            applied_scale: 0.5,
            applied_min_magnitude: 0.5,
        }
    }
}

/// Everything a rule may look at.
pub struct ForceContext<'a> {
    pub object: &'a PhysicsObject,
    pub gravity_enabled: bool,
    pub gravity_strength: Scalar,
    pub ground_level: Scalar,
    pub speed: Scalar,
    pub acceleration_magnitude: Scalar,
    pub heuristics: &'a ForceHeuristics,
}

impl<'a> ForceContext<'a> {
    pub fn new(
        object: &'a PhysicsObject,
        snapshot: &WorldSnapshot,
        heuristics: &'a ForceHeuristics,
    ) -> Self {
        Self {
            object,
            gravity_enabled: snapshot.gravity_enabled,
            gravity_strength: snapshot.gravity_strength,
            ground_level: snapshot.ground_level,
            speed: derived::speed(object.velocity),
            acceleration_magnitude: math::magnitude(object.acceleration),
            heuristics,
        }
    }

    fn weight(&self) -> Scalar {
        self.object.mass * self.gravity_strength
    }
}

/// A source of at most one force arrow.
pub trait ForceContributor: Send + Sync {
    fn kind(&self) -> ForceKind;

    fn contribute(&self, context: &ForceContext) -> Option<ForceVector>;

    fn clone_box(&self) -> Box<dyn ForceContributor>;
}

/// Declarative rule: a predicate plus magnitude and direction functions.
#[derive(Clone, Copy)]
pub struct ForceRule {
    pub kind: ForceKind,
    pub provenance: Provenance,
    pub applies: fn(&ForceContext) -> bool,
    pub magnitude: fn(&ForceContext) -> Scalar,
    pub direction: fn(&ForceContext) -> Scalar,
}

impl ForceRule {
    /// The built-in rule table, in drawing order.
    pub fn standard() -> Vec<ForceRule> {
        vec![
            ForceRule {
                kind: ForceKind::Gravity,
                provenance: Provenance::Derived,
                applies: |ctx| ctx.gravity_enabled,
                magnitude: |ctx| ctx.weight(),
                direction: |_| -PI / 2.0,
            },
            ForceRule {
                kind: ForceKind::Net,
                provenance: Provenance::Derived,
                applies: |ctx| {
                    ctx.object.mass * ctx.acceleration_magnitude > ctx.heuristics.net_force_threshold
                },
                magnitude: |ctx| ctx.object.mass * ctx.acceleration_magnitude,
                direction: |ctx| math::direction_angle(ctx.object.acceleration),
            },
            ForceRule {
                kind: ForceKind::Normal,
                provenance: Provenance::Derived,
                applies: |ctx| {
                    ctx.gravity_enabled
                        && ctx.object.position.y
                            <= ctx.ground_level
                                + ctx.object.shape.half_height()
                                + ctx.heuristics.ground_contact_tolerance
                },
                magnitude: |ctx| ctx.weight(),
                direction: |_| PI / 2.0,
            },
            ForceRule {
                kind: ForceKind::Tension,
                provenance: Provenance::Heuristic,
                applies: |ctx| {
                    ctx.speed > ctx.heuristics.tension_speed_threshold
                        && ctx.object.position.y
                            > ctx.ground_level + ctx.heuristics.tension_height_margin
                },
                magnitude: |ctx| {
                    ctx.object.mass
                        * (ctx.gravity_strength
                            + ctx.speed * ctx.speed / ctx.heuristics.tension_speed_divisor)
                },
                direction: |ctx| {
                    math::angle_toward(ctx.object.position, ctx.heuristics.tension_anchor)
                },
            },
            ForceRule {
                kind: ForceKind::Applied,
                provenance: Provenance::Heuristic,
                applies: |ctx| {
                    let threshold = ctx.heuristics.applied_velocity_threshold;
                    let moving = ctx.object.velocity.x.abs() > threshold
                        || ctx.object.velocity.y.abs() > threshold;
                    moving
                        && ctx.object.mass * ctx.speed * ctx.heuristics.applied_scale
                            > ctx.heuristics.applied_min_magnitude
                },
                magnitude: |ctx| ctx.object.mass * ctx.speed * ctx.heuristics.applied_scale,
                direction: |ctx| math::direction_angle(ctx.object.velocity),
            },
            ForceRule {
                kind: ForceKind::Centripetal,
                provenance: Provenance::Derived,
                applies: |ctx| ctx.object.active_circular_motion().is_some(),
                magnitude: |ctx| {
                    ctx.object.active_circular_motion().map_or(0.0, |motion| {
                        derived::centripetal_force(ctx.object.mass, motion)
                    })
                },
                direction: |ctx| {
                    ctx.object.active_circular_motion().map_or(0.0, |motion| {
                        math::angle_toward(ctx.object.position, motion.center)
                    })
                },
            },
        ]
    }
}

impl ForceContributor for ForceRule {
    fn kind(&self) -> ForceKind {
        self.kind
    }

    fn contribute(&self, context: &ForceContext) -> Option<ForceVector> {
        if !(self.applies)(context) {
            return None;
        }

        let magnitude = (self.magnitude)(context);
        if !magnitude.is_finite() {
            trace!("Dropping {:?} force with magnitude {magnitude}", self.kind);
            return None;
        }

        Some(ForceVector {
            kind: self.kind,
            name: self.kind.label(),
            magnitude: magnitude.max(0.0),
            direction: (self.direction)(context),
            color: self.kind.color(),
            provenance: self.provenance,
        })
    }

    fn clone_box(&self) -> Box<dyn ForceContributor> {
        Box::new(*self)
    }
}

/// Ordered set of force rules plus their shared heuristics.
pub struct ForceInferenceEngine {
    contributors: Vec<Box<dyn ForceContributor>>,
    heuristics: ForceHeuristics,
}

impl ForceInferenceEngine {
    /// An engine with no rules.
    pub fn new(heuristics: ForceHeuristics) -> Self {
        Self {
            contributors: Vec::new(),
            heuristics,
        }
    }

    /// Registers the built-in rule table.
    ///
    /// Returns self for method chaining.
    pub fn with_standard_rules(mut self) -> Self {
        for rule in ForceRule::standard() {
            self.contributors.push(Box::new(rule));
        }
        self
    }

    /// Appends a rule after the ones already registered.
    ///
    /// Returns self for method chaining.
    pub fn with_contributor(mut self, contributor: Box<dyn ForceContributor>) -> Self {
        self.contributors.push(contributor);
        self
    }

    pub fn kinds(&self) -> Vec<ForceKind> {
        self.contributors.iter().map(|c| c.kind()).collect()
    }

    /// Forces acting on `object` in `snapshot`, in rule order.
    ///
    /// Static objects have no free body diagram and yield nothing.
    pub fn infer(&self, object: &PhysicsObject, snapshot: &WorldSnapshot) -> Vec<ForceVector> {
        if object.is_static {
            return Vec::new();
        }

        let context = ForceContext::new(object, snapshot, &self.heuristics);
        self.contributors
            .iter()
            .filter_map(|contributor| contributor.contribute(&context))
            .collect()
    }
}

impl Clone for ForceInferenceEngine {
    fn clone(&self) -> Self {
        Self {
            contributors: self.contributors.iter().map(|c| c.clone_box()).collect(),
            heuristics: self.heuristics.clone(),
        }
    }
}

impl Default for ForceInferenceEngine {
    fn default() -> Self {
        Self::new(ForceHeuristics::default()).with_standard_rules()
    }
}
