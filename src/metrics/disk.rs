use crate::utils::errors::{EngineResult, ErrorKind};
use crate::utils::safe_div;
use crate::{engine_err, here};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One actuator disk contributing to the effective total area (spec §4.4
/// "Effective disk area"). Disks sharing an `overlap_group` count once, at
/// the group's max area, before pairwise overlap subtraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSpec {
    pub id: String,
    pub area_m2: f64,
    pub overlap_group: Option<String>,
    pub weight: f64,
}

impl DiskSpec {
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.is_empty() {
            return Err(engine_err!(ErrorKind::InvalidInput, "DiskSpec.id empty"));
        }
        if !(self.area_m2.is_finite() && self.area_m2 >= 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidInput,
                "DiskSpec.area_m2 invalid: {}",
                self.area_m2
            ));
        }
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(engine_err!(
                ErrorKind::InvalidInput,
                "DiskSpec.weight invalid: {}",
                self.weight
            ));
        }
        Ok(())
    }

    fn key(&self) -> String {
        match &self.overlap_group {
            Some(g) if !g.is_empty() => format!("G:{g}"),
            _ => format!("D:{}", self.id),
        }
    }
}

/// A caller-supplied pairwise overlap fraction between two disk/group keys
/// (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapPair {
    pub key_a: String,
    pub key_b: String,
    pub overlap_frac: f64,
}

impl OverlapPair {
    pub fn validate(&self) -> EngineResult<()> {
        if self.key_a.is_empty() || self.key_b.is_empty() {
            return Err(engine_err!(ErrorKind::InvalidInput, "OverlapPair keys empty"));
        }
        if !(self.overlap_frac.is_finite() && (0.0..=1.0).contains(&self.overlap_frac)) {
            return Err(engine_err!(
                ErrorKind::InvalidInput,
                "OverlapPair.overlap_frac must be in [0,1], got {}",
                self.overlap_frac
            ));
        }
        Ok(())
    }
}

/// Effective total actuator disk area: per-group max area summed, minus
/// caller-supplied pairwise overlap subtractions, floored at 0 (spec §4.4).
pub fn effective_disk_area(disks: &[DiskSpec], overlaps: &[OverlapPair]) -> EngineResult<f64> {
    let mut group_area: HashMap<String, f64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for d in disks {
        d.validate()?;
        let a = (d.area_m2 * d.weight).max(0.0);
        let key = d.key();
        let entry = group_area.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            0.0
        });
        *entry = entry.max(a);
    }

    let mut total: f64 = order.iter().map(|k| group_area[k]).sum();
    if !total.is_finite() || total < 0.0 {
        total = 0.0;
    }

    let mut overlap_sub = 0.0;
    for o in overlaps {
        o.validate()?;
        let a = group_area.get(&o.key_a).copied();
        let b = group_area.get(&o.key_b).copied();
        if let (Some(a), Some(b)) = (a, b) {
            if a > 0.0 && b > 0.0 {
                overlap_sub += o.overlap_frac * a.min(b);
            }
        }
    }
    if overlap_sub.is_finite() && overlap_sub > 0.0 {
        total = (total - overlap_sub).max(0.0);
    }

    Ok(total)
}

/// Disk loading `T/A` (spec §4.4, §3 "Closeout row"); `NaN` if area is
/// non-positive (unset discipline — not silently zeroed).
pub fn disk_loading(thrust_n: f64, area_m2: f64) -> f64 {
    if area_m2 > 0.0 {
        safe_div(thrust_n, area_m2, f64::NAN)
    } else {
        f64::NAN
    }
}

/// Ideal induced hover power `T^1.5 / sqrt(2*rho*A)` (momentum theory).
pub fn induced_power_ideal(thrust_n: f64, rho: f64, area_m2: f64) -> f64 {
    if !(thrust_n.is_finite() && rho.is_finite() && area_m2.is_finite()) {
        return f64::NAN;
    }
    if thrust_n <= 0.0 || rho <= 0.0 || area_m2 <= 0.0 {
        return f64::NAN;
    }
    thrust_n.powf(1.5) / (2.0 * rho * area_m2).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coaxial_disks_share_footprint() {
        let disks = vec![
            DiskSpec { id: "upper".into(), area_m2: 1.0, overlap_group: Some("stack1".into()), weight: 1.0 },
            DiskSpec { id: "lower".into(), area_m2: 1.2, overlap_group: Some("stack1".into()), weight: 1.0 },
        ];
        let area = effective_disk_area(&disks, &[]).unwrap();
        assert_eq!(area, 1.2);
    }

    #[test]
    fn distributed_disks_add() {
        let disks = vec![
            DiskSpec { id: "a".into(), area_m2: 1.0, overlap_group: None, weight: 1.0 },
            DiskSpec { id: "b".into(), area_m2: 1.0, overlap_group: None, weight: 1.0 },
        ];
        let area = effective_disk_area(&disks, &[]).unwrap();
        assert_eq!(area, 2.0);
    }

    #[test]
    fn overlap_subtraction_is_floored_at_zero() {
        let disks = vec![
            DiskSpec { id: "a".into(), area_m2: 1.0, overlap_group: None, weight: 1.0 },
            DiskSpec { id: "b".into(), area_m2: 1.0, overlap_group: None, weight: 1.0 },
        ];
        let overlaps = vec![OverlapPair {
            key_a: "D:a".into(),
            key_b: "D:b".into(),
            overlap_frac: 1.0,
        }];
        let area = effective_disk_area(&disks, &overlaps).unwrap();
        assert_eq!(area, 1.0);
    }

    #[test]
    fn disk_loading_is_nan_for_zero_area() {
        assert!(disk_loading(100.0, 0.0).is_nan());
    }

    #[test]
    fn induced_power_ideal_matches_hover_scaling() {
        let p = induced_power_ideal(1000.0, 1.225, 0.785398);
        assert!(p > 0.0 && p.is_finite());
    }
}
