//! Wire ↔ internal unit conversion for joint position, velocity and
//! acceleration.
//!
//! Wire values are the integer encodings carried on the field bus; internal
//! values are the floating-point units the controller works in. Peer boards
//! decode the same wire words, so every power-of-two scaling is done as an
//! integer shift on `i64`, never as a float division:
//!
//! | quantity     | to internal                                      | to wire                                         |
//! |--------------|--------------------------------------------------|-------------------------------------------------|
//! | position     | `w / f − o`                                      | `trunc((x + o) · f)`                            |
//! | velocity     | `((w · 10³) >> ves) / f`                         | `trunc(x · f / 10³) << vs`                      |
//! | acceleration | `((w · 10⁶) >> (ves + aes)) / f`                 | `trunc(x · f / 10⁶) << (vs + as)`               |
//! | velocity MC4 | n/a                                              | `trunc(x · f / 10)`                             |
//!
//! ## Round-trip tolerance
//!
//! - Position, internal → wire → internal: within `1 / factor`.
//! - Velocity and acceleration, wire → internal → wire, with equal in/out
//!   shifts and a dyadic factor: the low `shift` bits are lost, so the error
//!   is at most `2^shift − 1` wire units (shift 4 → 15).
//!
//! Results saturate at the `i32` wire range instead of wrapping.

use heapless::Vec;
use mc_common::consts::MAX_JOINTS;
use mc_common::motion::JointId;
use mc_common::motion::config::JointCalibration;

use crate::error::ConversionError;

const MS_PER_S: i64 = 1_000;
const MS2_PER_S2: i64 = 1_000_000;
const MC4_VELOCITY_DIVISOR: f64 = 10.0;

/// Per-joint calibration table plus the conversion functions over it.
#[derive(Debug, Clone)]
pub struct MeasureConverter {
    joints: Vec<JointCalibration, MAX_JOINTS>,
}

impl MeasureConverter {
    /// Build from one calibration per joint, validating each.
    pub fn new(calibrations: &[JointCalibration]) -> Result<Self, ConversionError> {
        let mut joints = Vec::new();
        for (i, cal) in calibrations.iter().enumerate() {
            cal.validate()
                .map_err(|reason| ConversionError::InvalidCalibration {
                    joint: i as JointId,
                    reason,
                })?;
            joints
                .push(*cal)
                .map_err(|_| ConversionError::TooManyJoints(calibrations.len()))?;
        }
        Ok(Self { joints })
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Calibration for `joint`, or `InvalidJoint`.
    #[inline]
    pub fn calibration(&self, joint: JointId) -> Result<&JointCalibration, ConversionError> {
        self.joints
            .get(joint as usize)
            .ok_or(ConversionError::InvalidJoint {
                joint,
                count: self.joints.len(),
            })
    }

    // ─── Position ───────────────────────────────────────────────────

    pub fn position_to_internal(&self, joint: JointId, wire: i32) -> Result<f64, ConversionError> {
        let c = self.calibration(joint)?;
        Ok(wire as f64 / c.factor - c.offset)
    }

    pub fn position_to_wire(&self, joint: JointId, internal: f64) -> Result<i32, ConversionError> {
        let c = self.calibration(joint)?;
        Ok(saturate_i32(((internal + c.offset) * c.factor).trunc() as i64))
    }

    // ─── Velocity ───────────────────────────────────────────────────

    /// Wire velocity is per millisecond, scaled up by `2^vel_estim_shift`.
    pub fn velocity_to_internal(&self, joint: JointId, wire: i32) -> Result<f64, ConversionError> {
        let c = self.calibration(joint)?;
        let scaled = (wire as i64 * MS_PER_S) >> c.vel_estim_shift;
        Ok(scaled as f64 / c.factor)
    }

    pub fn velocity_to_wire(&self, joint: JointId, internal: f64) -> Result<i32, ConversionError> {
        let c = self.calibration(joint)?;
        let base = (internal * c.factor / MS_PER_S as f64).trunc() as i64;
        Ok(saturate_i32(shl_saturating(base, c.vel_shift as u32)))
    }

    /// Velocity reference for the legacy MC4 boards: divides by 10 and
    /// applies no shift. Not interchangeable with [`velocity_to_wire`].
    ///
    /// [`velocity_to_wire`]: Self::velocity_to_wire
    pub fn velocity_to_wire_mc4(&self, joint: JointId, internal: f64) -> Result<i32, ConversionError> {
        let c = self.calibration(joint)?;
        Ok(saturate_i32((internal * c.factor / MC4_VELOCITY_DIVISOR).trunc() as i64))
    }

    // ─── Acceleration ───────────────────────────────────────────────

    pub fn acceleration_to_internal(&self, joint: JointId, wire: i32) -> Result<f64, ConversionError> {
        let c = self.calibration(joint)?;
        let shift = c.vel_estim_shift as u32 + c.acc_estim_shift as u32;
        let scaled = (wire as i64 * MS2_PER_S2) >> shift;
        Ok(scaled as f64 / c.factor)
    }

    pub fn acceleration_to_wire(&self, joint: JointId, internal: f64) -> Result<i32, ConversionError> {
        let c = self.calibration(joint)?;
        let shift = c.vel_shift as u32 + c.acc_shift as u32;
        let base = (internal * c.factor / MS2_PER_S2 as f64).trunc() as i64;
        Ok(saturate_i32(shl_saturating(base, shift)))
    }
}

#[inline]
fn saturate_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[inline]
fn shl_saturating(v: i64, shift: u32) -> i64 {
    match v.checked_mul(1i64 << shift) {
        Some(r) => r,
        None if v < 0 => i64::MIN,
        None => i64::MAX,
    }
}
