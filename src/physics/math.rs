/// Scalar type for physics quantities (f64 for precision)
pub type Scalar = f64;

/// 2D world-space vector for positions, velocities, accelerations and forces.
///
/// World Y increases upward.
pub type Vector = bevy::math::DVec2;

pub const PI: Scalar = core::f64::consts::PI;
pub const TAU: Scalar = core::f64::consts::TAU;

/// Magnitudes at or below this are treated as zero by guarded divisions.
pub const NEAR_ZERO: Scalar = 1e-12;

/// Euclidean length of a vector.
///
/// Every length in the crate goes through here so two callers computing the
/// same quantity get bit-identical results.
pub fn magnitude(v: Vector) -> Scalar {
    libm::hypot(v.x, v.y)
}

/// Angle of a vector in radians, counter-clockwise from +X with Y up.
pub fn direction_angle(v: Vector) -> Scalar {
    libm::atan2(v.y, v.x)
}

/// Angle of the vector pointing from `from` toward `to`.
pub fn angle_toward(from: Vector, to: Vector) -> Scalar {
    direction_angle(to - from)
}

/// Unit vector for an angle measured counter-clockwise from +X with Y up.
pub fn unit_from_angle(angle: Scalar) -> Vector {
    Vector::new(libm::cos(angle), libm::sin(angle))
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: Scalar) -> Scalar {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
