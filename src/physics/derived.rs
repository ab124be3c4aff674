//! Derived physical quantities.
//!
//! One canonical formula per quantity. Every panel, the force inference rules
//! and the aggregate totals call into this module, so two consumers asking for
//! the same quantity always receive bit-identical values. Everything here is a
//! pure function of `{mass, position, velocity, acceleration, gravity_strength,
//! circular_motion}`.
//!
//! The only partial formulas are the circular-motion period and frequency:
//! when the angular velocity is (numerically) zero the period is reported as
//! [`Scalar::INFINITY`] and the frequency as `0.0`, never NaN.

use crate::physics::math::{self, NEAR_ZERO, Scalar, TAU, Vector};
use crate::physics::snapshot::{CircularMotionState, PhysicsObject, TrajectoryPoint, WorldSnapshot};

pub fn speed(velocity: Vector) -> Scalar {
    math::magnitude(velocity)
}

/// KE = ½·m·v²
pub fn kinetic_energy(mass: Scalar, velocity: Vector) -> Scalar {
    let speed = speed(velocity);
    0.5 * mass * speed * speed
}

/// PE = m·g·h
pub fn potential_energy(mass: Scalar, gravity_strength: Scalar, height: Scalar) -> Scalar {
    mass * gravity_strength * height
}

pub fn momentum(mass: Scalar, velocity: Vector) -> Vector {
    velocity * mass
}

pub fn momentum_magnitude(mass: Scalar, velocity: Vector) -> Scalar {
    mass * speed(velocity)
}

pub fn displacement(initial_position: Vector, position: Vector) -> Vector {
    position - initial_position
}

pub fn displacement_magnitude(initial_position: Vector, position: Vector) -> Scalar {
    math::magnitude(displacement(initial_position, position))
}

/// Path length along the recorded trajectory.
pub fn distance_traveled(trajectory: &[TrajectoryPoint]) -> Scalar {
    trajectory
        .windows(2)
        .map(|pair| math::magnitude(pair[1].position - pair[0].position))
        .sum()
}

/// v = ω·r
pub fn tangential_velocity(motion: &CircularMotionState) -> Scalar {
    motion.angular_velocity * motion.radius
}

/// a_c = ω²·r
pub fn centripetal_acceleration(motion: &CircularMotionState) -> Scalar {
    motion.angular_velocity * motion.angular_velocity * motion.radius
}

/// F_c = m·ω²·r
pub fn centripetal_force(mass: Scalar, motion: &CircularMotionState) -> Scalar {
    mass * centripetal_acceleration(motion)
}

/// T = 2π/|ω|, or infinity when the body is not turning.
pub fn period(motion: &CircularMotionState) -> Scalar {
    let omega = motion.angular_velocity.abs();
    if omega <= NEAR_ZERO {
        Scalar::INFINITY
    } else {
        TAU / omega
    }
}

/// f = 1/T; zero when the period is infinite.
pub fn frequency(motion: &CircularMotionState) -> Scalar {
    let period = period(motion);
    if period.is_finite() { 1.0 / period } else { 0.0 }
}

/// Current angle in degrees, wrapped into `[0, 360)`.
pub fn angle_degrees(motion: &CircularMotionState) -> Scalar {
    math::normalize_degrees(motion.angle.to_degrees())
}

/// Formats a period for display, rendering the undefined case as `∞`.
pub fn format_period(period: Scalar) -> String {
    if period.is_finite() {
        format!("{period:.2} s")
    } else {
        "∞".to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircularQuantities {
    pub tangential_velocity: Scalar,
    pub centripetal_acceleration: Scalar,
    pub centripetal_force: Scalar,
    pub period: Scalar,
    pub frequency: Scalar,
    pub angle_degrees: Scalar,
}

impl CircularQuantities {
    pub fn of(mass: Scalar, motion: &CircularMotionState) -> Self {
        Self {
            tangential_velocity: tangential_velocity(motion),
            centripetal_acceleration: centripetal_acceleration(motion),
            centripetal_force: centripetal_force(mass, motion),
            period: period(motion),
            frequency: frequency(motion),
            angle_degrees: angle_degrees(motion),
        }
    }
}

/// Everything derivable about one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectQuantities {
    pub speed: Scalar,
    pub acceleration_magnitude: Scalar,
    pub kinetic_energy: Scalar,
    pub potential_energy: Scalar,
    pub mechanical_energy: Scalar,
    pub momentum: Vector,
    pub momentum_magnitude: Scalar,
    pub displacement: Vector,
    pub displacement_magnitude: Scalar,
    pub distance_traveled: Scalar,
    /// Present only while circular motion is enabled
    pub circular: Option<CircularQuantities>,
}

impl ObjectQuantities {
    /// Potential energy is measured from height zero.
    pub fn of(object: &PhysicsObject, gravity_strength: Scalar) -> Self {
        let kinetic_energy = kinetic_energy(object.mass, object.velocity);
        let potential_energy = potential_energy(object.mass, gravity_strength, object.position.y);

        Self {
            speed: speed(object.velocity),
            acceleration_magnitude: math::magnitude(object.acceleration),
            kinetic_energy,
            potential_energy,
            mechanical_energy: kinetic_energy + potential_energy,
            momentum: momentum(object.mass, object.velocity),
            momentum_magnitude: momentum_magnitude(object.mass, object.velocity),
            displacement: displacement(object.initial_position, object.position),
            displacement_magnitude: displacement_magnitude(object.initial_position, object.position),
            distance_traveled: distance_traveled(&object.trajectory),
            circular: object
                .active_circular_motion()
                .map(|motion| CircularQuantities::of(object.mass, motion)),
        }
    }
}

/// Identity of a snapshot for memoization purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotKey {
    version: u64,
    time_bits: u64,
    object_count: usize,
}

impl SnapshotKey {
    pub fn of(snapshot: &WorldSnapshot) -> Self {
        Self {
            version: snapshot.version,
            time_bits: snapshot.time.to_bits(),
            object_count: snapshot.objects.len(),
        }
    }
}

/// Derived quantities for every object of one snapshot, in object order.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotQuantities {
    key: SnapshotKey,
    objects: Vec<ObjectQuantities>,
}

impl SnapshotQuantities {
    pub fn of(snapshot: &WorldSnapshot) -> Self {
        Self {
            key: SnapshotKey::of(snapshot),
            objects: snapshot
                .objects
                .iter()
                .map(|object| ObjectQuantities::of(object, snapshot.gravity_strength))
                .collect(),
        }
    }

    pub fn key(&self) -> SnapshotKey {
        self.key
    }

    /// Quantities of the object at `index` in the snapshot's object list.
    pub fn object(&self, index: usize) -> Option<&ObjectQuantities> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectQuantities> {
        self.objects.iter()
    }
}

/// Single-entry memo of [`SnapshotQuantities`], keyed by [`SnapshotKey`].
///
/// The key cannot see object state. Whoever replaces a snapshot without
/// changing version, time or object count must call [`Self::invalidate`].
#[derive(Default, Debug)]
pub struct QuantityCache {
    cached: Option<SnapshotQuantities>,
    recomputations: usize,
}

impl QuantityCache {
    pub fn get_or_compute(&mut self, snapshot: &WorldSnapshot) -> &SnapshotQuantities {
        let key = SnapshotKey::of(snapshot);
        let stale = self.cached.as_ref().is_none_or(|cached| cached.key != key);
        if stale {
            self.recomputations += 1;
            self.cached = Some(SnapshotQuantities::of(snapshot));
        }
        self.cached
            .get_or_insert_with(|| SnapshotQuantities::of(snapshot))
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of times the cache had to recompute.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::math::PI;

    fn orbit(angular_velocity: Scalar, radius: Scalar) -> CircularMotionState {
        CircularMotionState {
            center: Vector::new(50.0, 50.0),
            radius,
            angular_velocity,
            angle: 0.0,
            enabled: true,
            clockwise: false,
        }
    }

    #[test]
    fn test_linear_quantities() {
        let velocity = Vector::new(3.0, 4.0);
        assert_eq!(speed(velocity), 5.0);
        assert_eq!(kinetic_energy(2.0, velocity), 25.0);
        assert_eq!(momentum_magnitude(2.0, velocity), 10.0);
        assert_eq!(momentum(2.0, velocity), Vector::new(6.0, 8.0));
        assert!((potential_energy(2.0, 9.8, 10.0) - 196.0).abs() < 1e-12);
        assert_eq!(displacement_magnitude(Vector::new(1.0, 1.0), Vector::new(4.0, 5.0)), 5.0);
    }

    #[test]
    fn test_distance_traveled_sums_segments() {
        let trajectory = vec![
            TrajectoryPoint::new(Vector::new(0.0, 0.0)),
            TrajectoryPoint::new(Vector::new(3.0, 4.0)),
            TrajectoryPoint::new(Vector::new(3.0, 0.0)),
        ];
        assert_eq!(distance_traveled(&trajectory), 9.0);
        assert_eq!(distance_traveled(&trajectory[..1]), 0.0);
        assert_eq!(distance_traveled(&[]), 0.0);
    }

    #[test]
    fn test_circular_quantities() {
        let motion = orbit(2.0, 10.0);
        assert_eq!(tangential_velocity(&motion), 20.0);
        assert_eq!(centripetal_acceleration(&motion), 40.0);
        assert!((period(&motion) - PI).abs() < 1e-12);
        assert!((frequency(&motion) - 1.0 / PI).abs() < 1e-12);
        assert_eq!(centripetal_force(3.0, &motion), 120.0);

        let quantities = CircularQuantities::of(3.0, &motion);
        assert_eq!(quantities.centripetal_force, centripetal_force(3.0, &motion));
        assert_eq!(quantities.period, period(&motion));
    }

    #[test]
    fn test_period_is_positive_for_negative_angular_velocity() {
        let motion = orbit(-2.0, 10.0);
        assert!((period(&motion) - PI).abs() < 1e-12);
        assert_eq!(centripetal_acceleration(&motion), 40.0);
    }

    #[test]
    fn test_zero_angular_velocity_yields_infinite_period() {
        let motion = orbit(0.0, 10.0);

        let period = period(&motion);
        let frequency = frequency(&motion);

        assert!(period.is_infinite() && period > 0.0);
        assert_eq!(frequency, 0.0);
        assert!(!frequency.is_nan());
        assert_eq!(format_period(period), "∞");
        assert_eq!(format_period(PI), "3.14 s");
    }

    #[test]
    fn test_angle_degrees_is_normalized() {
        let mut motion = orbit(1.0, 1.0);
        motion.angle = -PI / 2.0;
        assert!((angle_degrees(&motion) - 270.0).abs() < 1e-9);
        motion.angle = 5.0 * PI;
        assert!((angle_degrees(&motion) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_object_quantities_match_canonical_formulas() {
        let object = PhysicsObject::new("ball", 2.0, Vector::new(4.0, 10.0))
            .with_initial_position(Vector::new(1.0, 6.0))
            .with_velocity(Vector::new(3.0, 4.0))
            .with_acceleration(Vector::new(0.0, -9.8));

        let quantities = ObjectQuantities::of(&object, 9.8);

        assert_eq!(quantities.speed, speed(object.velocity));
        assert_eq!(quantities.kinetic_energy, kinetic_energy(2.0, object.velocity));
        assert_eq!(quantities.potential_energy, potential_energy(2.0, 9.8, 10.0));
        assert_eq!(
            quantities.mechanical_energy,
            quantities.kinetic_energy + quantities.potential_energy
        );
        assert_eq!(quantities.displacement_magnitude, 5.0);
        assert!((quantities.acceleration_magnitude - 9.8).abs() < 1e-12);
        assert!(quantities.circular.is_none());
    }

    #[test]
    fn test_disabled_circular_motion_is_not_derived() {
        let mut motion = orbit(2.0, 10.0);
        motion.enabled = false;
        let object = PhysicsObject::new("ball", 1.0, Vector::ZERO).with_circular_motion(motion);
        assert!(ObjectQuantities::of(&object, 9.8).circular.is_none());
    }

    #[test]
    fn test_cache_recomputes_only_for_new_snapshots() {
        let mut snapshot = WorldSnapshot::default()
            .with_object(PhysicsObject::new("ball", 1.0, Vector::new(1.0, 1.0)));
        let mut cache = QuantityCache::default();

        cache.get_or_compute(&snapshot);
        cache.get_or_compute(&snapshot);
        assert_eq!(cache.recomputations(), 1);

        snapshot.version += 1;
        let quantities = cache.get_or_compute(&snapshot);
        assert_eq!(quantities.key(), SnapshotKey::of(&snapshot));
        assert_eq!(cache.recomputations(), 2);

        cache.invalidate();
        cache.get_or_compute(&snapshot);
        assert_eq!(cache.recomputations(), 3);
    }
}
