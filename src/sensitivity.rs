use crate::bemt::{solve, BemtResult};
use crate::geometry::{Environment, OperatingPoint, PolarDatabase, RotorGeometry, SolverConfig};
use crate::utils::errors::EngineResult;
use crate::utils::safe_div;
use serde::{Deserialize, Serialize};

/// Central-difference step sizes for each perturbed variable (spec §4.5).
/// `omega`, `rho`, `radius_scale`, and `chord_scale` steps are relative
/// (fractions); `collective` is an absolute radian step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensitivityConfig {
    pub omega_rel_step: f64,
    pub rho_rel_step: f64,
    pub radius_rel_step: f64,
    pub chord_rel_step: f64,
    pub collective_abs_step_rad: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            omega_rel_step: 0.01,
            rho_rel_step: 0.01,
            radius_rel_step: 0.01,
            chord_rel_step: 0.01,
            collective_abs_step_rad: 1f64.to_radians(),
        }
    }
}

/// Normalized thrust/power derivatives for one perturbed variable (spec
/// §4.5: `n_dT = (x/T)*(dT/dx)`, `n_dP = (x/P)*(dP/dx)`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Sensitivity {
    pub n_dthrust: f64,
    pub n_dpower: f64,
}

/// One normalized sensitivity per perturbed variable, about a baseline
/// operating point (spec §4.5).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub omega: Sensitivity,
    pub collective: Sensitivity,
    pub rho: Sensitivity,
    pub radius: Sensitivity,
    pub chord: Sensitivity,
}

fn scaled_geometry(geometry: &RotorGeometry, radius_scale: f64, chord_scale: f64) -> RotorGeometry {
    let mut g = geometry.clone();
    g.radius *= radius_scale;
    g.hub_radius *= radius_scale;
    for st in g.stations.iter_mut() {
        st.r *= radius_scale;
        st.chord *= chord_scale;
    }
    g
}

fn central_diff(
    lo: &BemtResult,
    hi: &BemtResult,
    baseline: &BemtResult,
    x_lo: f64,
    x_hi: f64,
    x0: f64,
) -> Sensitivity {
    let dx = x_hi - x_lo;
    let dthrust = safe_div(hi.thrust_n - lo.thrust_n, dx, f64::NAN);
    let dpower = safe_div(hi.power_w - lo.power_w, dx, f64::NAN);
    Sensitivity {
        n_dthrust: safe_div(x0 * dthrust, baseline.thrust_n, f64::NAN),
        n_dpower: safe_div(x0 * dpower, baseline.power_w, f64::NAN),
    }
}

/// Central-difference sensitivities about `baseline_op`, perturbing each
/// variable independently while holding the others fixed (spec §4.5). If
/// any perturbed solve errors, the whole computation propagates that error.
pub fn compute_sensitivities(
    geometry: &RotorGeometry,
    environment: &Environment,
    baseline_op: &OperatingPoint,
    polars: &dyn PolarDatabase,
    config: &SolverConfig,
    sens_config: &SensitivityConfig,
) -> EngineResult<SensitivityReport> {
    let mut report = SensitivityReport::default();

    let mut baseline_input = *baseline_op;
    baseline_input.target_thrust_n = None;
    let baseline = solve(geometry, environment, &baseline_input, polars, config)?;

    // omega
    {
        let d = sens_config.omega_rel_step * baseline_op.omega;
        let mut lo_op = baseline_input;
        let mut hi_op = baseline_input;
        lo_op.omega -= d;
        hi_op.omega += d;
        let lo = solve(geometry, environment, &lo_op, polars, config)?;
        let hi = solve(geometry, environment, &hi_op, polars, config)?;
        report.omega =
            central_diff(&lo, &hi, &baseline, baseline_op.omega - d, baseline_op.omega + d, baseline_op.omega);
    }

    // collective (absolute step)
    {
        let d = sens_config.collective_abs_step_rad;
        let mut lo_op = baseline_input;
        let mut hi_op = baseline_input;
        lo_op.collective_offset_rad -= d;
        hi_op.collective_offset_rad += d;
        let lo = solve(geometry, environment, &lo_op, polars, config)?;
        let hi = solve(geometry, environment, &hi_op, polars, config)?;
        report.collective = central_diff(
            &lo,
            &hi,
            &baseline,
            baseline_op.collective_offset_rad - d,
            baseline_op.collective_offset_rad + d,
            baseline_op.collective_offset_rad,
        );
    }

    // rho
    {
        let d = sens_config.rho_rel_step * environment.rho;
        let mut lo_env = *environment;
        let mut hi_env = *environment;
        lo_env.rho -= d;
        hi_env.rho += d;
        let lo = solve(geometry, &lo_env, &baseline_input, polars, config)?;
        let hi = solve(geometry, &hi_env, &baseline_input, polars, config)?;
        report.rho =
            central_diff(&lo, &hi, &baseline, environment.rho - d, environment.rho + d, environment.rho);
    }

    // radius scale
    {
        let d = sens_config.radius_rel_step;
        let lo_geo = scaled_geometry(geometry, 1.0 - d, 1.0);
        let hi_geo = scaled_geometry(geometry, 1.0 + d, 1.0);
        let lo = solve(&lo_geo, environment, &baseline_input, polars, config)?;
        let hi = solve(&hi_geo, environment, &baseline_input, polars, config)?;
        report.radius = central_diff(&lo, &hi, &baseline, 1.0 - d, 1.0 + d, 1.0);
    }

    // chord scale
    {
        let d = sens_config.chord_rel_step;
        let lo_geo = scaled_geometry(geometry, 1.0, 1.0 - d);
        let hi_geo = scaled_geometry(geometry, 1.0, 1.0 + d);
        let lo = solve(&lo_geo, environment, &baseline_input, polars, config)?;
        let hi = solve(&hi_geo, environment, &baseline_input, polars, config)?;
        report.chord = central_diff(&lo, &hi, &baseline, 1.0 - d, 1.0 + d, 1.0);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BladeStation, FlightMode, TipLossModel};
    use crate::polar::{LinearPolar, PolarVariant};
    use crate::utils::errors::{EngineResult as ER, ErrorKind};
    use crate::{engine_err, here};
    use std::collections::HashMap;

    struct TestPolars(HashMap<String, PolarVariant>);
    impl PolarDatabase for TestPolars {
        fn get_polar(&self, id: &str) -> ER<&dyn crate::polar::Polar> {
            self.0
                .get(id)
                .map(|p| p as &dyn crate::polar::Polar)
                .ok_or_else(|| engine_err!(ErrorKind::MissingPolarData, "no polar {}", id))
        }
    }

    fn fixture() -> (RotorGeometry, Environment, TestPolars, SolverConfig) {
        let geometry = RotorGeometry {
            hub_radius: 0.06,
            radius: 0.5,
            blade_count: 2,
            tip_loss: TipLossModel::Prandtl,
            stations: vec![
                BladeStation { r: 0.10, chord: 0.06, twist_rad: 12f64.to_radians(), airfoil_id: "NACA".into() },
                BladeStation { r: 0.195, chord: 0.06, twist_rad: 10f64.to_radians(), airfoil_id: "NACA".into() },
                BladeStation { r: 0.29, chord: 0.055, twist_rad: 8f64.to_radians(), airfoil_id: "NACA".into() },
                BladeStation { r: 0.385, chord: 0.05, twist_rad: 6f64.to_radians(), airfoil_id: "NACA".into() },
                BladeStation { r: 0.48, chord: 0.045, twist_rad: 4f64.to_radians(), airfoil_id: "NACA".into() },
            ],
        };
        let environment = Environment { rho: 1.225, mu: 1.81e-5, speed_of_sound: 340.0 };
        let mut polars = HashMap::new();
        polars.insert(
            "NACA".to_string(),
            PolarVariant::Linear(LinearPolar {
                cl0: 0.0,
                cla_per_rad: 2.0 * std::f64::consts::PI,
                cl_min: -1.2,
                cl_max: 1.4,
                stall_aoa_rad: 15f64.to_radians(),
                cd0: 0.012,
                k: 0.02,
                cd_min: 0.005,
                cd_max: 0.3,
            }),
        );
        (geometry, environment, TestPolars(polars), SolverConfig::default())
    }

    #[test]
    fn sensitivities_are_finite_at_baseline() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega: 450.0,
            collective_offset_rad: 6f64.to_radians(),
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        let report =
            compute_sensitivities(&geometry, &environment, &op, &polars, &config, &SensitivityConfig::default())
                .unwrap();
        assert!(report.omega.n_dthrust.is_finite());
        assert!(report.collective.n_dthrust.is_finite());
        assert!(report.rho.n_dthrust.is_finite());
    }

    #[test]
    fn omega_sensitivity_is_positive_for_increasing_thrust() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega: 450.0,
            collective_offset_rad: 6f64.to_radians(),
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        let report =
            compute_sensitivities(&geometry, &environment, &op, &polars, &config, &SensitivityConfig::default())
                .unwrap();
        assert!(report.omega.n_dthrust > 0.0);
    }
}
