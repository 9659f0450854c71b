use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};
use serde::{Deserialize, Serialize};

/// A single parasite-drag contributor (spec §4.4 "Parasite drag"). If
/// `cds_m2` is positive it overrides `cd * s_ref_m2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragItem {
    pub id: String,
    pub group: String,
    pub cd: f64,
    pub s_ref_m2: f64,
    pub cds_m2: f64,
    pub interference: f64,
}

impl DragItem {
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.is_empty() {
            return Err(engine_err!(ErrorKind::InvalidInput, "DragItem.id empty"));
        }
        if !(self.cd.is_finite() && self.cd >= 0.0) {
            return Err(engine_err!(ErrorKind::InvalidInput, "DragItem.cd invalid: {}", self.cd));
        }
        if !(self.s_ref_m2.is_finite() && self.s_ref_m2 >= 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidInput,
                "DragItem.s_ref_m2 invalid: {}",
                self.s_ref_m2
            ));
        }
        if !(self.cds_m2.is_finite() && self.cds_m2 >= 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidInput,
                "DragItem.cds_m2 invalid: {}",
                self.cds_m2
            ));
        }
        if !(self.interference.is_finite() && self.interference >= 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidInput,
                "DragItem.interference invalid: {}",
                self.interference
            ));
        }
        Ok(())
    }

    pub fn effective_cds(&self) -> f64 {
        let base = if self.cds_m2 > 0.0 { self.cds_m2 } else { self.cd * self.s_ref_m2 };
        (base * self.interference).max(0.0)
    }
}

/// Total effective `CdS` over a list of drag items (spec §4.4).
pub fn total_cds(items: &[DragItem]) -> EngineResult<f64> {
    let mut sum = 0.0;
    for it in items {
        it.validate()?;
        sum += it.effective_cds();
    }
    Ok(if sum.is_finite() { sum.max(0.0) } else { f64::NAN })
}

/// Parasite drag force at `V` (spec §4.4: `P_par(V) = 0.5*rho*V^2*CdS`, with
/// the returned value here being the force; multiply by `v_mps` for power).
pub fn parasite_drag_n(rho: f64, v_mps: f64, cds_m2: f64) -> f64 {
    if !(rho.is_finite() && v_mps.is_finite() && cds_m2.is_finite()) {
        return f64::NAN;
    }
    if rho <= 0.0 || v_mps <= 0.0 || cds_m2 <= 0.0 {
        return 0.0;
    }
    0.5 * rho * v_mps * v_mps * cds_m2
}

pub fn parasite_power_w(rho: f64, v_mps: f64, cds_m2: f64) -> f64 {
    let d = parasite_drag_n(rho, v_mps, cds_m2);
    if d.is_nan() {
        f64::NAN
    } else {
        d * v_mps
    }
}

/// Per-group and total delta between two drag tables at `v_target_mps`
/// (spec §4.4).
#[derive(Debug, Clone, Copy)]
pub struct DragDelta {
    pub cds_base_m2: f64,
    pub cds_cand_m2: f64,
    pub d_cds_m2: f64,
    pub drag_base_n: f64,
    pub drag_cand_n: f64,
    pub d_drag_n: f64,
    pub power_base_w: f64,
    pub power_cand_w: f64,
    pub d_power_w: f64,
}

pub fn compare_drag(
    baseline: &[DragItem],
    candidate: &[DragItem],
    rho: f64,
    v_target_mps: f64,
) -> EngineResult<DragDelta> {
    let cds_base = total_cds(baseline)?;
    let cds_cand = total_cds(candidate)?;
    let d_cds = cds_cand - cds_base;

    let (drag_base, drag_cand, power_base, power_cand) = if v_target_mps > 0.0 {
        (
            parasite_drag_n(rho, v_target_mps, cds_base),
            parasite_drag_n(rho, v_target_mps, cds_cand),
            parasite_power_w(rho, v_target_mps, cds_base),
            parasite_power_w(rho, v_target_mps, cds_cand),
        )
    } else {
        (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    };

    Ok(DragDelta {
        cds_base_m2: cds_base,
        cds_cand_m2: cds_cand,
        d_cds_m2: d_cds,
        drag_base_n: drag_base,
        drag_cand_n: drag_cand,
        d_drag_n: drag_cand - drag_base,
        power_base_w: power_base,
        power_cand_w: power_cand,
        d_power_w: power_cand - power_base,
    })
}

fn group_cds(items: &[DragItem], group: &str) -> EngineResult<f64> {
    let mut sum = 0.0;
    for it in items {
        it.validate()?;
        if it.group == group {
            sum += it.effective_cds();
        }
    }
    Ok(sum.max(0.0))
}

/// Flags the inconsistency where removing booms increases total drag (spec
/// §4.4 "consistency check"); surfaced as an error, not a silent warning.
pub fn check_boom_removal_consistency(
    baseline: &[DragItem],
    candidate: &[DragItem],
    boom_group: &str,
    tolerance_m2: f64,
) -> EngineResult<()> {
    let boom_base = group_cds(baseline, boom_group)?;
    let boom_cand = group_cds(candidate, boom_group)?;
    let d_boom = boom_cand - boom_base;

    let total_base = total_cds(baseline)?;
    let total_cand = total_cds(candidate)?;
    let d_total = total_cand - total_base;

    if d_boom > tolerance_m2 {
        return Err(engine_err!(
            ErrorKind::InvalidInput,
            "boom CdS increased (d={}); check grouping/tagging",
            d_boom
        ));
    }

    let boom_drop = -d_boom;
    if boom_drop > 1e-6 && d_total > 1e-6 {
        return Err(engine_err!(
            ErrorKind::InvalidInput,
            "total CdS increased ({}) while booms decreased ({})",
            d_total,
            boom_drop
        ));
    }

    Ok(())
}
