use super::result::StationBreakdown;
use crate::geometry::{Environment, PolarDatabase, RotorGeometry, SolverConfig, TipLossModel};
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::utils::{VELOCITY_EPSILON, TIP_LOSS_FLOOR};
use crate::{engine_err, here};

/// One azimuth/iteration pass over every station of the disk, shared by the
/// hover and forward-flight solvers (spec §4.3's "inner kernel").
///
/// `v_ax` is the local axial velocity (freestream + induced) and
/// `tan_extra` is added to `omega*r` to get the local tangential velocity
/// (zero in hover, `V_ip*cos(psi)` in forward flight).
pub fn evaluate_disk(
    geometry: &RotorGeometry,
    environment: &Environment,
    polars: &dyn PolarDatabase,
    config: &SolverConfig,
    collective_rad: f64,
    omega: f64,
    v_ax: f64,
    tan_extra: f64,
) -> EngineResult<(f64, f64, Vec<StationBreakdown>)> {
    let dr = geometry.station_spacings();
    let b = geometry.blade_count as f64;
    let mut total_t = 0.0;
    let mut total_q = 0.0;
    let mut rows = Vec::with_capacity(geometry.stations.len());

    for (i, station) in geometry.stations.iter().enumerate() {
        let v_tan = omega * station.r + tan_extra;
        let phi = v_ax
            .abs()
            .atan2(v_tan.abs().max(VELOCITY_EPSILON))
            .clamp(config.inflow_min_rad, config.inflow_max_rad);
        let alpha = (station.twist_rad + collective_rad - phi)
            .clamp(config.alpha_min_rad, config.alpha_max_rad);
        let v_rel = (v_ax * v_ax + v_tan * v_tan).sqrt();
        let reynolds = environment.rho * v_rel * station.chord / environment.mu;
        let mach = v_rel / environment.speed_of_sound;
        if mach > config.max_mach {
            return Err(engine_err!(
                ErrorKind::OutOfRange,
                "station {} Mach {} exceeds configured max {}",
                i,
                mach,
                config.max_mach
            ));
        }

        let polar = polars.get_polar(&station.airfoil_id)?;
        let sample = polar.sample(alpha, reynolds, mach)?;

        let f_tip = match geometry.tip_loss {
            TipLossModel::None => 1.0,
            TipLossModel::Prandtl => {
                let sin_phi = phi.sin().abs().max(VELOCITY_EPSILON);
                let f_exp = (b / 2.0) * (geometry.radius - station.r) / (station.r * sin_phi);
                let inner = (-f_exp).exp().min(1.0);
                ((2.0 / std::f64::consts::PI) * inner.acos()).max(TIP_LOSS_FLOOR)
            }
        };

        let q = 0.5 * environment.rho * v_rel * v_rel * station.chord;
        let lift = q * sample.cl;
        let drag = q * sample.cd;

        let dthrust = b * (lift * phi.cos() - drag * phi.sin()) * dr[i] * f_tip;
        let dtorque = b * (lift * phi.sin() + drag * phi.cos()) * station.r * dr[i] * f_tip;

        if !dthrust.is_finite() || !dtorque.is_finite() {
            return Err(engine_err!(
                ErrorKind::NumericalFailure,
                "non-finite force at station {} (r={})",
                i,
                station.r
            ));
        }

        total_t += dthrust;
        total_q += dtorque;
        rows.push(StationBreakdown {
            r: station.r,
            dr: dr[i],
            phi_rad: phi,
            alpha_rad: alpha,
            reynolds,
            mach,
            cl: sample.cl,
            cd: sample.cd,
            tip_loss_factor: f_tip,
            dthrust_n: dthrust,
            dtorque_nm: dtorque,
        });
    }

    Ok((total_t, total_q, rows))
}
