use super::kernel::evaluate_disk;
use super::result::{BemtResult, BemtStatus, StationBreakdown};
use crate::geometry::{Environment, OperatingPoint, PolarDatabase, RotorGeometry, SolverConfig};
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};

/// Forward-flight BEMT solve (spec §4.3 "Forward flight"): sweeps `n_psi`
/// azimuths per outer iteration, replacing `V_tan` with
/// `omega*r + V_ip*cos(psi)`, and updates the induced velocity via the
/// swirl-free closure `v_i_new = T / (2*rho*A*sqrt((V_ax+v_i)^2 + V_ip^2))`.
pub fn solve_forward(
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

    if op.freestream_speed < 0.0 {
        return Err(engine_err!(
            ErrorKind::InvalidOperatingPoint,
            "forward flight requires V_inplane >= 0, got {}",
            op.freestream_speed
        ));
    }

    let v_ip = op.freestream_speed;
    let area = geometry.disk_area();
    let n_psi = config.n_psi.max(1);
    let psis: Vec<f64> = (0..n_psi)
        .map(|i| 2.0 * std::f64::consts::PI * (i as f64) / (n_psi as f64))
        .collect();

    let mut v_i = 0.0f64;
    let mut last = BemtResult::unset(BemtStatus::NonConverged, op.collective_offset_rad);

    for iter in 1..=config.max_iter_inflow {
        let mut t_sum = 0.0;
        let mut q_sum = 0.0;
        let mut rows_sum: Option<Vec<StationBreakdown>> = None;

        for &psi in &psis {
            let tan_extra = v_ip * psi.cos();
            let (t, q, rows) = match evaluate_disk(
                geometry,
                environment,
                polars,
                config,
                op.collective_offset_rad,
                op.omega,
                v_i,
                tan_extra,
            ) {
                Ok(v) => v,
                Err(e) if e.kind == ErrorKind::OutOfRange => {
                    let mut r = BemtResult::unset(BemtStatus::OutOfRange, op.collective_offset_rad);
                    r.induced_velocity_mps = v_i;
                    r.inflow_iters = iter;
                    return Ok(r);
                }
                Err(e) => return Err(e),
            };
            t_sum += t;
            q_sum += q;
            match &mut rows_sum {
                None => rows_sum = Some(rows),
                Some(acc) => {
                    for (a, b) in acc.iter_mut().zip(rows.iter()) {
                        a.dthrust_n += b.dthrust_n;
                        a.dtorque_nm += b.dtorque_nm;
                    }
                }
            }
        }

        let n = n_psi as f64;
        let t_mean = t_sum / n;
        let q_mean = q_sum / n;
        let mut rows = rows_sum.unwrap_or_default();
        for r in rows.iter_mut() {
            r.dthrust_n /= n;
            r.dtorque_nm /= n;
        }

        let denom = 2.0 * environment.rho * area * (v_i * v_i + v_ip * v_ip).sqrt().max(1e-12);
        let v_i_new = (t_mean / denom).max(0.0);
        let residual = (v_i_new - v_i).abs();
        let power = q_mean * op.omega;

        last = BemtResult {
            status: BemtStatus::Ok,
            thrust_n: t_mean,
            torque_nm: q_mean,
            power_w: power,
            induced_velocity_mps: v_i_new,
            figure_of_merit: f64::NAN,
            residual,
            inflow_iters: iter,
            trim_iters: 0,
            collective_rad: op.collective_offset_rad,
            stations: rows,
        };

        if residual <= config.tol_inflow {
            return Ok(last);
        }
        v_i = ((1.0 - config.relaxation) * v_i + config.relaxation * v_i_new).max(0.0);
    }

    last.status = BemtStatus::NonConverged;
    Ok(last)
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
    fn forward_flight_converges() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Forward,
            freestream_speed: 15.0,
            omega: 400.0,
            collective_offset_rad: 8f64.to_radians(),
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        let result = solve_forward(&geometry, &environment, &op, &polars, &config).unwrap();
        assert_eq!(result.status, BemtStatus::Ok);
        assert!(result.thrust_n.is_finite());
        assert!(result.power_w.is_finite());
        assert!(result.figure_of_merit.is_nan());
    }

    #[test]
    fn negative_inplane_speed_is_rejected() {
        let (geometry, environment, polars, config) = fixture();
        let op = OperatingPoint {
            mode: FlightMode::Forward,
            freestream_speed: -1.0,
            omega: 400.0,
            collective_offset_rad: 8f64.to_radians(),
            target_thrust_n: None,
            inflow_angle_rad: 0.0,
        };
        assert!(solve_forward(&geometry, &environment, &op, &polars, &config).is_err());
    }
}
