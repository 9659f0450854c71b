use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Diagonal-only local inertia, about a component's own CG (spec §4.4 "Mass
/// ledger"). Off-diagonal products of inertia are out of scope.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InertiaDiag {
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
}

impl InertiaDiag {
    fn validate(&self) -> EngineResult<()> {
        for (name, v) in [("ixx", self.ixx), ("iyy", self.iyy), ("izz", self.izz)] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(engine_err!(ErrorKind::InvalidInput, "InertiaDiag.{} invalid: {}", name, v));
            }
        }
        Ok(())
    }

    fn add(self, other: InertiaDiag) -> InertiaDiag {
        InertiaDiag {
            ixx: self.ixx + other.ixx,
            iyy: self.iyy + other.iyy,
            izz: self.izz + other.izz,
        }
    }
}

/// One itemized mass entry with a CG and optional local diagonal inertia
/// (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassItem {
    pub id: String,
    pub group: String,
    pub mass_kg: f64,
    #[serde(with = "vector3_serde")]
    pub cg_m: Vector3<f64>,
    pub local_inertia: InertiaDiag,
}

impl MassItem {
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.is_empty() {
            return Err(engine_err!(ErrorKind::InvalidInput, "MassItem.id empty"));
        }
        if !(self.mass_kg.is_finite() && self.mass_kg >= 0.0) {
            return Err(engine_err!(ErrorKind::InvalidInput, "MassItem.mass_kg invalid: {}", self.mass_kg));
        }
        if !self.cg_m.iter().all(|v| v.is_finite()) {
            return Err(engine_err!(ErrorKind::InvalidInput, "MassItem.cg_m must be finite"));
        }
        self.local_inertia.validate()?;
        Ok(())
    }
}

/// Aggregated mass, combined CG, and parallel-axis diagonal inertia over a
/// ledger (spec §4.4).
#[derive(Debug, Clone, Copy)]
pub struct MassTotals {
    pub mass_kg: f64,
    pub cg_m: Vector3<f64>,
    pub inertia: InertiaDiag,
}

fn parallel_axis_diag(m: f64, r: Vector3<f64>) -> InertiaDiag {
    InertiaDiag {
        ixx: m * (r.y * r.y + r.z * r.z),
        iyy: m * (r.x * r.x + r.z * r.z),
        izz: m * (r.x * r.x + r.y * r.y),
    }
}

pub fn compute_totals(items: &[MassItem]) -> EngineResult<MassTotals> {
    let mut msum = 0.0;
    let mut m1 = Vector3::zeros();
    for it in items {
        it.validate()?;
        if it.mass_kg <= 0.0 {
            continue;
        }
        msum += it.mass_kg;
        m1 += it.cg_m * it.mass_kg;
    }

    let cg_m = if msum > 0.0 { m1 / msum } else { Vector3::zeros() };

    let mut inertia = InertiaDiag::default();
    for it in items {
        if it.mass_kg <= 0.0 {
            continue;
        }
        let r = it.cg_m - cg_m;
        inertia = inertia.add(it.local_inertia).add(parallel_axis_diag(it.mass_kg, r));
    }

    Ok(MassTotals { mass_kg: msum, cg_m, inertia })
}

/// Delta between two ledgers, plus payload-ratio impacts vs. a supplied
/// payload mass (spec §4.4 "Mass ledger" comparison).
#[derive(Debug, Clone, Copy)]
pub struct MassDelta {
    pub base: MassTotals,
    pub cand: MassTotals,
    pub d_mass_kg: f64,
    pub d_cg_m: Vector3<f64>,
    pub d_inertia: InertiaDiag,
    pub ratio_payload_to_empty_base: f64,
    pub ratio_payload_to_empty_cand: f64,
    pub d_ratio_payload_to_empty: f64,
}

pub fn compare_ledgers(
    baseline: &[MassItem],
    candidate: &[MassItem],
    payload_kg: f64,
) -> EngineResult<MassDelta> {
    let base = compute_totals(baseline)?;
    let cand = compute_totals(candidate)?;

    let d_mass_kg = cand.mass_kg - base.mass_kg;
    let d_cg_m = cand.cg_m - base.cg_m;
    let d_inertia = InertiaDiag {
        ixx: cand.inertia.ixx - base.inertia.ixx,
        iyy: cand.inertia.iyy - base.inertia.iyy,
        izz: cand.inertia.izz - base.inertia.izz,
    };

    let ratio_base = if base.mass_kg > 0.0 { payload_kg / base.mass_kg } else { f64::NAN };
    let ratio_cand = if cand.mass_kg > 0.0 { payload_kg / cand.mass_kg } else { f64::NAN };

    Ok(MassDelta {
        base,
        cand,
        d_mass_kg,
        d_cg_m,
        d_inertia,
        ratio_payload_to_empty_base: ratio_base,
        ratio_payload_to_empty_cand: ratio_cand,
        d_ratio_payload_to_empty: ratio_cand - ratio_base,
    })
}

mod vector3_serde {
    use nalgebra::Vector3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vector3<f64>, s: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vector3<f64>, D::Error> {
        let arr = <[f64; 3]>::deserialize(d)?;
        Ok(Vector3::new(arr[0], arr[1], arr[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, mass: f64, cg: Vector3<f64>) -> MassItem {
        MassItem { id: id.into(), group: "".into(), mass_kg: mass, cg_m: cg, local_inertia: InertiaDiag::default() }
    }

    #[test]
    fn combined_cg_is_mass_weighted_centroid() {
        let items = vec![
            item("a", 1.0, Vector3::new(0.0, 0.0, 0.0)),
            item("b", 1.0, Vector3::new(2.0, 0.0, 0.0)),
        ];
        let totals = compute_totals(&items).unwrap();
        assert_eq!(totals.mass_kg, 2.0);
        assert!((totals.cg_m.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parallel_axis_inertia_is_nonnegative() {
        let items = vec![
            item("a", 1.0, Vector3::new(0.0, 0.5, 0.0)),
            item("b", 1.0, Vector3::new(0.0, -0.5, 0.0)),
        ];
        let totals = compute_totals(&items).unwrap();
        assert!(totals.inertia.ixx > 0.0);
    }

    #[test]
    fn compare_ledgers_reports_delta_mass() {
        let base = vec![item("a", 1.0, Vector3::zeros())];
        let cand = vec![item("a", 1.5, Vector3::zeros())];
        let delta = compare_ledgers(&base, &cand, 0.5).unwrap();
        assert!((delta.d_mass_kg - 0.5).abs() < 1e-12);
    }
}
