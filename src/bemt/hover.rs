use super::kernel::evaluate_disk;
use super::result::{BemtResult, BemtStatus};
use crate::geometry::{Environment, OperatingPoint, PolarDatabase, RotorGeometry, SolverConfig};
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::utils::MAX_FIGURE_OF_MERIT;
use crate::{engine_err, here};

/// Hover/axial BEMT solve (spec §4.3 "Hover/axial"): iterates a scalar
/// induced velocity via the momentum closure
/// `v_i = (-v_ax + sqrt(v_ax^2 + 2T/(rho*A))) / 2`.
pub fn solve_hover(
    geometry: &RotorGeometry,
    environment: &Environment,
    op: &OperatingPoint,
    polars: &dyn PolarDatabase,
    config: &SolverConfig,
) -> EngineResult<BemtResult> {
    geometry.validate()?;
    environment.validate()?;
    op.validate()?;
    config.validate()?;

    solve_hover_at(
        geometry,
        environment,
        op.omega,
        op.freestream_speed,
        op.collective_offset_rad,
        polars,
        config,
    )
}

/// Hover solve at an explicit collective, reused by the trim bisection
/// (spec §4.3 "Collective trim").
pub fn solve_hover_at(
    geometry: &RotorGeometry,
    environment: &Environment,
    omega: f64,
    v_ax0: f64,
    collective_rad: f64,
    polars: &dyn PolarDatabase,
    config: &SolverConfig,
) -> EngineResult<BemtResult> {
    let area = geometry.disk_area();
    let mut v_i = 0.0f64;
    let mut last = BemtResult::unset(BemtStatus::NonConverged, collective_rad);

    for iter in 1..=config.max_iter_inflow {
        let v_ax_local = v_ax0 + v_i;
        let (t, q, stations) = match evaluate_disk(
            geometry,
            environment,
            polars,
            config,
            collective_rad,
            omega,
            v_ax_local,
            0.0,
        ) {
            Ok(v) => v,
            Err(e) if e.kind == ErrorKind::OutOfRange => {
                let mut r = BemtResult::unset(BemtStatus::OutOfRange, collective_rad);
                r.induced_velocity_mps = v_i;
                r.inflow_iters = iter;
                return Ok(r);
            }
            Err(e) => return Err(e),
        };

        let v_i_new = momentum_update(t, v_ax0, environment.rho, area);
        let residual = (v_i_new - v_i).abs();

        let power = q * omega;
        last = BemtResult {
            status: BemtStatus::Ok,
            thrust_n: t,
            torque_nm: q,
            power_w: power,
            induced_velocity_mps: v_i_new,
            figure_of_merit: figure_of_merit(t, power, environment.rho, area, v_ax0),
            residual,
            inflow_iters: iter,
            trim_iters: 0,
            collective_rad,
            stations,
        };

        if residual <= config.tol_inflow {
            return Ok(last);
        }
        v_i = (1.0 - config.relaxation) * v_i + config.relaxation * v_i_new;
    }

    last.status = BemtStatus::NonConverged;
    Ok(last)
}

fn momentum_update(thrust_n: f64, v_ax: f64, rho: f64, area: f64) -> f64 {
    let denom = 2.0 * rho * area;
    let under_root = v_ax * v_ax + 2.0 * thrust_n / denom.max(1e-300);
    let safe_root = under_root.max(0.0).sqrt();
    ((-v_ax + safe_root) / 2.0).max(0.0)
}

/// Figure of merit: only meaningful in hover with `V_inf ~= 0` (spec §4.3
/// "Figure of merit"). Clamped to `[0, MAX_FIGURE_OF_MERIT]`; zero if
/// either power term is non-positive.
pub fn figure_of_merit(thrust_n: f64, power_w: f64, rho: f64, area: f64, v_axial: f64) -> f64 {
    if v_axial.abs() > 1e-3 {
        return f64::NAN;
    }
    if thrust_n <= 0.0 || power_w <= 0.0 {
        return 0.0;
    }
    let p_ideal = thrust_n.powf(1.5) / (2.0 * rho * area).sqrt();
    (p_ideal / power_w).clamp(0.0, MAX_FIGURE_OF_MERIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BladeStation, FlightMode, TipLossModel};
    use crate::polar::{LinearPolar, PolarVariant};
    use std::collections::HashMap;

    struct TestPolars(HashMap<String, PolarVariant>);
    impl PolarDatabase for TestPolars {
        fn get_polar(&self, id: &str) -> EngineResult<&dyn crate::polar::Polar> {
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
    fn s1_hover_no_trim_converges_positive() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega: 450.0,
            collective_offset_rad: 6f64.to_radians(),
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        let result = solve_hover(&geometry, &environment, &op, &polars, &config).unwrap();
        assert_eq!(result.status, BemtStatus::Ok);
        assert!(result.thrust_n > 0.0);
        assert!(result.power_w > 0.0);
        assert!(result.figure_of_merit > 0.0 && result.figure_of_merit < 1.2);
        assert!(result.residual < config.tol_inflow * 10.0);
    }

    #[test]
    fn thrust_increases_with_omega() {
        let (geometry, environment, polars, config) = fixture();
        let mk = |omega: f64| OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega,
            collective_offset_rad: 6f64.to_radians(),
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        let lo = solve_hover(&geometry, &environment, &mk(300.0), &polars, &config).unwrap();
        let hi = solve_hover(&geometry, &environment, &mk(450.0), &polars, &config).unwrap();
        assert!(hi.thrust_n > lo.thrust_n);
        assert!(hi.power_w > lo.power_w);
    }

    #[test]
    fn thrust_increases_with_collective() {
        let (geometry, environment, polars, config) = fixture();
        let mk = |coll_deg: f64| OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega: 400.0,
            collective_offset_rad: coll_deg.to_radians(),
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        let lo = solve_hover(&geometry, &environment, &mk(4.0), &polars, &config).unwrap();
        let hi = solve_hover(&geometry, &environment, &mk(8.0), &polars, &config).unwrap();
        assert!(hi.thrust_n > lo.thrust_n);
    }

    #[test]
    fn figure_of_merit_zero_when_power_nonpositive() {
        assert_eq!(figure_of_merit(100.0, 0.0, 1.225, 1.0, 0.0), 0.0);
        assert_eq!(figure_of_merit(0.0, 100.0, 1.225, 1.0, 0.0), 0.0);
    }

    #[test]
    fn figure_of_merit_bounded() {
        let fm = figure_of_merit(1e6, 1.0, 1.225, 1.0, 0.0);
        assert_eq!(fm, MAX_FIGURE_OF_MERIT);
    }
}
