//! Wind component conventions and polar conversion.
//!
//! Gill WindSonic anemometers report a (U, V) pair in an axis convention of
//! their own (see the WindSonic user manual): the meteorological eastward
//! component is the *negated* instrument U, while the northward component is
//! the instrument V unchanged. Everything downstream of the raw parsers works
//! in meteorological components.

/// Convert instrument-axis components to meteorological (eastward, northward).
#[must_use]
pub fn met_components(u_gill: f64, v_gill: f64) -> (f64, f64) {
    (-u_gill, v_gill)
}

/// Convert rectangular wind components to (speed, direction).
///
/// Speed is `hypot(u, v)`. Direction is `atan2(v, u)` in degrees, wrapped
/// into the half-open range `(0, 360]` - an angle of exactly zero is
/// reported as 360.
#[must_use]
pub fn polar(u: f64, v: f64) -> (f64, f64) {
    let speed = u.hypot(v);
    let theta = v.atan2(u).to_degrees();
    let direction = if theta > 0.0 { theta } else { theta + 360.0 };
    (speed, direction)
}

/// Mean of the finite values in a slice, NaN when there are none.
#[must_use]
pub fn finite_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Vector mean of a set of component samples.
///
/// Components are averaged independently; speed and direction must be derived
/// from the result with [`polar`], never by averaging speeds or angles.
#[must_use]
pub fn vector_mean(u: &[f64], v: &[f64]) -> (f64, f64) {
    (finite_mean(u), finite_mean(v))
}
