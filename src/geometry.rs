use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};
use serde::{Deserialize, Serialize};

/// Tip-loss model applied to every station's sectional contribution (spec
/// §3 "Rotor geometry").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipLossModel {
    None,
    Prandtl,
}

/// One radial station along a blade. `airfoil_id` names the polar to sample
/// (resolved by the caller-supplied `PolarDatabase`, or by a
/// `PiecewisePolar` keyed on radius — see `polar::piecewise`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BladeStation {
    pub r: f64,
    pub chord: f64,
    pub twist_rad: f64,
    pub airfoil_id: String,
}

/// An ordered, strictly-increasing sequence of blade stations, immutable
/// once validated (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotorGeometry {
    pub hub_radius: f64,
    pub radius: f64,
    pub blade_count: u32,
    pub tip_loss: TipLossModel,
    pub stations: Vec<BladeStation>,
}

impl RotorGeometry {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.hub_radius.is_finite() && self.hub_radius >= 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidGeometry,
                "hub_radius must be finite and non-negative, got {}",
                self.hub_radius
            ));
        }
        if !(self.radius.is_finite() && self.radius > self.hub_radius) {
            return Err(engine_err!(
                ErrorKind::InvalidGeometry,
                "radius ({}) must be finite and > hub_radius ({})",
                self.radius,
                self.hub_radius
            ));
        }
        if !(2..=16).contains(&self.blade_count) {
            return Err(engine_err!(
                ErrorKind::InvalidGeometry,
                "blade_count must be in [2,16], got {}",
                self.blade_count
            ));
        }
        if self.stations.len() < 3 {
            return Err(engine_err!(
                ErrorKind::InvalidGeometry,
                "station count must be >= 3, got {}",
                self.stations.len()
            ));
        }
        let mut prev_r = f64::NEG_INFINITY;
        for (i, st) in self.stations.iter().enumerate() {
            if !st.r.is_finite() || st.r <= prev_r {
                return Err(engine_err!(
                    ErrorKind::InvalidGeometry,
                    "station {} radius must be finite and strictly increasing (prev {}, got {})",
                    i,
                    prev_r,
                    st.r
                ));
            }
            if !(st.r > self.hub_radius && st.r <= self.radius) {
                return Err(engine_err!(
                    ErrorKind::InvalidGeometry,
                    "station {} radius {} out of (hub_radius, radius] bounds",
                    i,
                    st.r
                ));
            }
            if !(st.chord.is_finite() && st.chord > 0.0) {
                return Err(engine_err!(
                    ErrorKind::InvalidGeometry,
                    "station {} chord must be finite and > 0, got {}",
                    i,
                    st.chord
                ));
            }
            if !st.twist_rad.is_finite() {
                return Err(engine_err!(
                    ErrorKind::InvalidGeometry,
                    "station {} twist must be finite",
                    i
                ));
            }
            if st.airfoil_id.is_empty() {
                return Err(engine_err!(
                    ErrorKind::InvalidGeometry,
                    "station {} airfoil_id must not be empty",
                    i
                ));
            }
            prev_r = st.r;
        }
        Ok(())
    }

    /// Midpoint spacing between neighboring stations, one-sided at the
    /// ends, floored at `crate::utils::MIN_STATION_SPACING` (spec §4.3).
    pub fn station_spacings(&self) -> Vec<f64> {
        let n = self.stations.len();
        let mut dr = vec![0.0; n];
        for i in 0..n {
            let lo = if i == 0 {
                self.stations[0].r
            } else {
                (self.stations[i - 1].r + self.stations[i].r) / 2.0
            };
            let hi = if i == n - 1 {
                self.radius
            } else {
                (self.stations[i].r + self.stations[i + 1].r) / 2.0
            };
            dr[i] = (hi - lo).max(crate::utils::MIN_STATION_SPACING);
        }
        dr
    }

    pub fn disk_area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

/// Immutable per-case atmosphere (spec §3 "Environment").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Environment {
    pub rho: f64,
    pub mu: f64,
    pub speed_of_sound: f64,
}

impl Environment {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.rho.is_finite() && self.rho > 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidEnvironment,
                "rho must be finite and > 0, got {}",
                self.rho
            ));
        }
        if !(self.mu.is_finite() && self.mu > 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidEnvironment,
                "mu must be finite and > 0, got {}",
                self.mu
            ));
        }
        if !(self.speed_of_sound.is_finite() && self.speed_of_sound > 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidEnvironment,
                "speed_of_sound must be finite and > 0, got {}",
                self.speed_of_sound
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightMode {
    Hover,
    Forward,
}

/// Immutable per-solve operating point. The trimmed collective (when
/// `target_thrust_n` triggers a trim) is returned as part of the BEMT
/// result, never written back here (spec §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub mode: FlightMode,
    pub freestream_speed: f64,
    pub omega: f64,
    pub collective_offset_rad: f64,
    pub target_thrust_n: Option<f64>,
    pub inflow_angle_rad: f64,
}

impl OperatingPoint {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.freestream_speed.is_finite() && self.freestream_speed >= 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidOperatingPoint,
                "freestream_speed must be finite and >= 0, got {}",
                self.freestream_speed
            ));
        }
        if !(self.omega.is_finite() && self.omega > 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidOperatingPoint,
                "omega must be finite and > 0, got {}",
                self.omega
            ));
        }
        if !self.collective_offset_rad.is_finite() {
            return Err(engine_err!(
                ErrorKind::InvalidOperatingPoint,
                "collective_offset_rad must be finite"
            ));
        }
        if let Some(t) = self.target_thrust_n {
            if !(t.is_finite() && t > 0.0) {
                return Err(engine_err!(
                    ErrorKind::InvalidOperatingPoint,
                    "target_thrust_n must be finite and > 0 when present, got {}",
                    t
                ));
            }
        }
        if !self.inflow_angle_rad.is_finite() {
            return Err(engine_err!(
                ErrorKind::InvalidOperatingPoint,
                "inflow_angle_rad must be finite"
            ));
        }
        Ok(())
    }
}

/// Immutable per-solve tolerances and clamps (spec §3 "Solver
/// configuration").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverConfig {
    pub max_iter_inflow: u32,
    pub tol_inflow: f64,
    pub relaxation: f64,
    pub inflow_min_rad: f64,
    pub inflow_max_rad: f64,
    pub alpha_min_rad: f64,
    pub alpha_max_rad: f64,
    pub max_iter_trim: u32,
    pub tol_trim_n: f64,
    pub collective_min_rad: f64,
    pub collective_max_rad: f64,
    pub n_psi: u32,
    pub max_mach: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter_inflow: 100,
            tol_inflow: 1e-6,
            relaxation: 0.5,
            inflow_min_rad: -std::f64::consts::FRAC_PI_2 + 1e-3,
            inflow_max_rad: std::f64::consts::FRAC_PI_2 - 1e-3,
            alpha_min_rad: -0.35,
            alpha_max_rad: 0.45,
            max_iter_trim: 60,
            tol_trim_n: 1e-2,
            collective_min_rad: -0.1,
            collective_max_rad: 0.45,
            n_psi: 36,
            max_mach: 0.9,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_iter_inflow == 0 {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "max_iter_inflow must be > 0"
            ));
        }
        if !(self.tol_inflow.is_finite() && self.tol_inflow > 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "tol_inflow must be finite and > 0"
            ));
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "relaxation must be in (0,1], got {}",
                self.relaxation
            ));
        }
        if !(self.inflow_min_rad < self.inflow_max_rad) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "inflow_min_rad must be < inflow_max_rad"
            ));
        }
        if !(self.alpha_min_rad < self.alpha_max_rad) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "alpha_min_rad must be < alpha_max_rad"
            ));
        }
        if self.max_iter_trim == 0 {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "max_iter_trim must be > 0"
            ));
        }
        if !(self.tol_trim_n.is_finite() && self.tol_trim_n > 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "tol_trim_n must be finite and > 0"
            ));
        }
        if !(self.collective_min_rad < self.collective_max_rad) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "collective_min_rad must be < collective_max_rad"
            ));
        }
        if self.n_psi == 0 {
            return Err(engine_err!(ErrorKind::InvalidConfig, "n_psi must be > 0"));
        }
        if !(self.max_mach.is_finite() && self.max_mach > 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "max_mach must be finite and > 0"
            ));
        }
        Ok(())
    }
}

/// External supplier of polar data (spec §6 "Polar database"). Must be
/// thread-safe and side-effect-free from the engine's point of view; it may
/// cache internally.
pub trait PolarDatabase: Send + Sync {
    fn get_polar(&self, airfoil_id: &str) -> EngineResult<&dyn crate::polar::Polar>;
}
