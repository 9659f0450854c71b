use super::hover::solve_hover_at;
use super::result::{BemtResult, BemtStatus};
use crate::geometry::{Environment, OperatingPoint, PolarDatabase, RotorGeometry, SolverConfig};
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};

/// Collective trim via bisection to a target thrust (spec §4.3 "Collective
/// trim"). Brackets `[theta_min, theta_max]`; if the endpoints don't
/// bracket a sign change, returns the closer endpoint with status
/// `OutOfRange`. Otherwise bisects until `|f| <= tol_trim_n` or
/// `max_iter_trim` is exceeded (status `NonConverged` in that case).
pub fn trim_to_thrust(
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

    let target = op.target_thrust_n.ok_or_else(|| {
        engine_err!(
            ErrorKind::InvalidOperatingPoint,
            "trim_to_thrust requires OperatingPoint.target_thrust_n"
        )
    })?;

    let eval = |theta: f64| -> EngineResult<BemtResult> {
        solve_hover_at(
            geometry,
            environment,
            op.omega,
            op.freestream_speed,
            theta,
            polars,
            config,
        )
    };

    let mut lo = config.collective_min_rad;
    let mut hi = config.collective_max_rad;
    let r_lo = eval(lo)?;
    let r_hi = eval(hi)?;
    let f_lo = r_lo.thrust_n - target;
    let f_hi = r_hi.thrust_n - target;

    if !(f_lo.is_finite() && f_hi.is_finite()) {
        let mut r = BemtResult::unset(BemtStatus::OutOfRange, lo);
        r.trim_iters = 0;
        return Ok(r);
    }

    if f_lo * f_hi > 0.0 {
        let mut out = if f_lo.abs() <= f_hi.abs() { r_lo } else { r_hi };
        out.status = BemtStatus::OutOfRange;
        out.trim_iters = 0;
        return Ok(out);
    }

    let mut best = if f_lo.abs() <= f_hi.abs() { r_lo.clone() } else { r_hi.clone() };
    let mut iters = 0u32;

    for i in 1..=config.max_iter_trim {
        iters = i;
        let mid = 0.5 * (lo + hi);
        let r_mid = eval(mid)?;
        let f_mid = r_mid.thrust_n - target;

        if !f_mid.is_finite() {
            break;
        }

        best = r_mid.clone();
        if f_mid.abs() <= config.tol_trim_n {
            best.status = BemtStatus::Ok;
            best.trim_iters = iters;
            return Ok(best);
        }

        if f_lo.signum() == f_mid.signum() {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    best.status = BemtStatus::NonConverged;
    best.trim_iters = iters;
    Ok(best)
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
        let mut config = SolverConfig::default();
        config.collective_min_rad = (-5f64).to_radians();
        config.collective_max_rad = 25f64.to_radians();
        (geometry, environment, TestPolars(polars), config)
    }

    #[test]
    fn s2_trim_converges_to_target_thrust() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega: 260.0,
            collective_offset_rad: 0.0,
            target_thrust_n: Some(1200.0),
            inflow_angle_rad: 0.0,
        };
        let result = trim_to_thrust(&geometry, &environment, &op, &polars, &config).unwrap();
        assert_eq!(result.status, BemtStatus::Ok);
        assert!((result.thrust_n - 1200.0).abs() <= config.tol_trim_n);
        assert!(result.trim_iters <= config.max_iter_trim);
    }

    #[test]
    fn missing_target_thrust_is_an_error() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega: 260.0,
            collective_offset_rad: 0.0,
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        assert!(trim_to_thrust(&geometry, &environment, &op, &polars, &config).is_err());
    }

    #[test]
    fn unreachable_target_reports_out_of_range() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Hover,
            freestream_speed: 0.0,
            omega: 260.0,
            collective_offset_rad: 0.0,
            target_thrust_n: Some(1.0e9),
            inflow_angle_rad: 0.0,
        };
        let result = trim_to_thrust(&geometry, &environment, &op, &polars, &config).unwrap();
        assert_eq!(result.status, BemtStatus::OutOfRange);
    }
}
