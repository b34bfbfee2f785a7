//! Angle conventions and orientation helpers.
//!
//! Euler angles are given in degrees as `Vec3(pitch, yaw, roll)` and applied
//! yaw first, then pitch, then roll (`EulerRot::YXZ`). Positive pitch tilts the
//! view upward; a camera orbiting above its anchor therefore has negative pitch.

use glam::{EulerRot, Mat3, Quat, Vec3};

/// Orbit elevation (angle between the pivot-to-camera vector and the horizon)
/// may never reach this value. At ±90° the camera's up vector flips.
pub const ELEVATION_LIMIT_DEG: f32 = 89.0;

/// Wrap-then-clamp used for orbit pitch.
///
/// Values past ±360° are shifted by one full turn before clamping to
/// `[min, max]`. Only a single turn is corrected; the behaviour for angles
/// further out is whatever the clamp makes of them.
pub fn clamp_angle(mut angle: f32, min: f32, max: f32) -> f32 {
    if angle < -360.0 {
        angle += 360.0;
    }
    if angle > 360.0 {
        angle -= 360.0;
    }
    // max/min instead of clamp: no panic on an inverted range.
    angle.max(min).min(max)
}

/// Converts `Vec3(pitch, yaw, roll)` in degrees to a unit quaternion.
pub fn angles_to_rotation(angles_deg: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles_deg.y.to_radians(),
        angles_deg.x.to_radians(),
        angles_deg.z.to_radians(),
    )
}

/// Inverse of [`angles_to_rotation`].
pub fn rotation_to_angles(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}

/// Rotation whose forward axis (`-Z`) points along `direction`, keeping the
/// camera's up vector as close to `up` as possible.
///
/// Returns `None` for zero-length or non-finite directions so callers can
/// keep their previous orientation.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    if !direction.is_finite() || direction.length_squared() < 1e-12 {
        return None;
    }
    let back = -direction.normalize();
    let mut right = up.cross(back);
    if right.length_squared() < 1e-8 {
        // Looking along `up`: pick a stable screen-up instead.
        right = Vec3::NEG_Z.cross(back);
        if right.length_squared() < 1e-8 {
            right = Vec3::X;
        }
    }
    let right = right.normalize();
    let cam_up = back.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, cam_up, back)).normalize())
}

/// Angle between two orientations in degrees.
///
/// Uses `2·atan2(|v|, |w|)` of the relative rotation rather than `acos` of
/// the dot product; the latter cannot resolve angles below a few hundredths
/// of a degree in `f32`.
pub fn angle_between_deg(a: Quat, b: Quat) -> f32 {
    let d = a.conjugate() * b;
    let v = Vec3::new(d.x, d.y, d.z).length();
    (2.0 * v.atan2(d.w.abs())).to_degrees()
}

/// Elevation of `offset` above the horizontal plane, in degrees.
pub fn elevation_deg(offset: Vec3) -> f32 {
    let len = offset.length();
    if len <= f32::EPSILON || !len.is_finite() {
        return 0.0;
    }
    (offset.y / len).clamp(-1.0, 1.0).asin().to_degrees()
}
