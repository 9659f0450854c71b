use super::mass::InertiaDiag;
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};
use serde::{Deserialize, Serialize};

/// One rotor's control authority: position, thrust/torque bounds, and the
/// `kQ` thrust-to-torque relation used for yaw authority (spec §4.4
/// "Maneuverability").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotorAuthority {
    pub id: String,
    pub x_m: f64,
    pub y_m: f64,
    pub thrust_max_n: f64,
    pub k_q_per_t: f64,
    pub torque_max_nm: f64,
    pub spin_dir: i32,
}

impl RotorAuthority {
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.is_empty() {
            return Err(engine_err!(ErrorKind::InvalidInput, "RotorAuthority.id empty"));
        }
        if !(self.x_m.is_finite() && self.y_m.is_finite()) {
            return Err(engine_err!(ErrorKind::InvalidInput, "RotorAuthority position must be finite"));
        }
        if !(self.thrust_max_n.is_finite() && self.thrust_max_n >= 0.0) {
            return Err(engine_err!(ErrorKind::InvalidInput, "RotorAuthority.thrust_max_n invalid"));
        }
        if !(self.k_q_per_t.is_finite() && self.k_q_per_t >= 0.0) {
            return Err(engine_err!(ErrorKind::InvalidInput, "RotorAuthority.k_q_per_t invalid"));
        }
        if !(self.torque_max_nm.is_finite() && self.torque_max_nm >= 0.0) {
            return Err(engine_err!(ErrorKind::InvalidInput, "RotorAuthority.torque_max_nm invalid"));
        }
        if self.spin_dir != 1 && self.spin_dir != -1 {
            return Err(engine_err!(ErrorKind::InvalidInput, "RotorAuthority.spin_dir must be +-1"));
        }
        Ok(())
    }

    fn q_max_abs(&self) -> f64 {
        if self.k_q_per_t > 0.0 {
            self.k_q_per_t * self.thrust_max_n.max(0.0)
        } else {
            self.torque_max_nm
        }
    }
}

/// Configuration for authority aggregation (spec §4.4: thrust headroom
/// fraction, lateral thrust fraction, turn reference speed).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ManeuverConfig {
    pub thrust_headroom_frac: f64,
    pub lateral_thrust_frac: f64,
    pub turn_speed_mps: f64,
}

impl ManeuverConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.thrust_headroom_frac.is_finite() && (0.0..=0.5).contains(&self.thrust_headroom_frac)) {
            return Err(engine_err!(ErrorKind::InvalidConfig, "thrust_headroom_frac must be in [0,0.5]"));
        }
        if !(self.lateral_thrust_frac.is_finite() && (0.0..=1.0).contains(&self.lateral_thrust_frac)) {
            return Err(engine_err!(ErrorKind::InvalidConfig, "lateral_thrust_frac must be in [0,1]"));
        }
        if !(self.turn_speed_mps.is_finite() && self.turn_speed_mps >= 0.0) {
            return Err(engine_err!(ErrorKind::InvalidConfig, "turn_speed_mps invalid"));
        }
        Ok(())
    }
}

/// Required moments/accelerations the concept must satisfy (spec §4.4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ManeuverReq {
    pub yaw_moment_req_nm: f64,
    pub roll_moment_req_nm: f64,
    pub pitch_moment_req_nm: f64,
    pub mass_kg: f64,
}

/// Aggregated maneuverability margins (spec §4.4). `NaN` margins mean the
/// corresponding requirement was non-positive and not evaluated.
#[derive(Debug, Clone, Copy)]
pub struct ManeuverMetrics {
    pub yaw_moment_max_nm: f64,
    pub roll_moment_max_nm: f64,
    pub pitch_moment_max_nm: f64,
    pub yaw_margin: f64,
    pub roll_margin: f64,
    pub pitch_margin: f64,
    pub yaw_alpha_max: f64,
    pub roll_alpha_max: f64,
    pub pitch_alpha_max: f64,
    pub a_lat_max_mps2: f64,
    pub turn_radius_m: f64,
}

/// Aggregate yaw/roll/pitch authority across all rotors, derive angular
/// accelerations from body-diagonal inertia, and derive lateral
/// acceleration / turn radius from the lateral thrust fraction (spec §4.4).
pub fn compute_maneuverability(
    rotors: &[RotorAuthority],
    inertia: &InertiaDiag,
    req: &ManeuverReq,
    config: &ManeuverConfig,
) -> EngineResult<ManeuverMetrics> {
    config.validate()?;
    for r in rotors {
        r.validate()?;
    }

    let mut roll_max = 0.0;
    let mut pitch_max = 0.0;
    for r in rotors {
        let d_t = config.thrust_headroom_frac * r.thrust_max_n;
        if d_t <= 0.0 {
            continue;
        }
        roll_max += (d_t * r.y_m).abs();
        pitch_max += (d_t * r.x_m).abs();
    }

    let yaw_max = 0.5 * rotors.iter().map(RotorAuthority::q_max_abs).sum::<f64>();

    let yaw_margin = if req.yaw_moment_req_nm > 0.0 { yaw_max / req.yaw_moment_req_nm } else { f64::NAN };
    let roll_margin = if req.roll_moment_req_nm > 0.0 { roll_max / req.roll_moment_req_nm } else { f64::NAN };
    let pitch_margin = if req.pitch_moment_req_nm > 0.0 { pitch_max / req.pitch_moment_req_nm } else { f64::NAN };

    let roll_alpha = if inertia.ixx > 0.0 { roll_max / inertia.ixx } else { f64::NAN };
    let pitch_alpha = if inertia.iyy > 0.0 { pitch_max / inertia.iyy } else { f64::NAN };
    let yaw_alpha = if inertia.izz > 0.0 { yaw_max / inertia.izz } else { f64::NAN };

    let (a_lat, turn_radius) = if req.mass_kg > 0.0 {
        let t_sum: f64 = rotors.iter().map(|r| r.thrust_max_n).sum();
        let a_lat = (config.lateral_thrust_frac * t_sum) / req.mass_kg;
        let turn_radius = if config.turn_speed_mps > 0.0 && a_lat > 0.0 {
            (config.turn_speed_mps * config.turn_speed_mps) / a_lat
        } else {
            f64::NAN
        };
        (a_lat, turn_radius)
    } else {
        (f64::NAN, f64::NAN)
    };

    Ok(ManeuverMetrics {
        yaw_moment_max_nm: yaw_max,
        roll_moment_max_nm: roll_max,
        pitch_moment_max_nm: pitch_max,
        yaw_margin,
        roll_margin,
        pitch_margin,
        yaw_alpha_max: yaw_alpha,
        roll_alpha_max: roll_alpha,
        pitch_alpha_max: pitch_alpha,
        a_lat_max_mps2: a_lat,
        turn_radius_m: turn_radius,
    })
}
