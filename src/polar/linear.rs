use super::{Polar, PolarSample};
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};
use serde::{Deserialize, Serialize};

/// `Cl = clamp(cl0 + cla*alpha, [cl_min, cl_max])` with a soft-stall clamp
/// on alpha; `Cd = clamp(cd0 + k*Cl^2, [cd_min, cd_max])` (spec §4.2
/// "Linear").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearPolar {
    pub cl0: f64,
    pub cla_per_rad: f64,
    pub cl_min: f64,
    pub cl_max: f64,
    pub stall_aoa_rad: f64,
    pub cd0: f64,
    pub k: f64,
    pub cd_min: f64,
    pub cd_max: f64,
}

impl LinearPolar {
    pub fn validate(&self) -> EngineResult<()> {
        let finite_fields = [
            self.cl0,
            self.cla_per_rad,
            self.cl_min,
            self.cl_max,
            self.stall_aoa_rad,
            self.cd0,
            self.k,
            self.cd_min,
            self.cd_max,
        ];
        if !finite_fields.iter().all(|v| v.is_finite()) {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "LinearPolar fields must all be finite"
            ));
        }
        if self.cl_min > self.cl_max {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "LinearPolar cl_min ({}) > cl_max ({})",
                self.cl_min,
                self.cl_max
            ));
        }
        if self.cd_min > self.cd_max {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "LinearPolar cd_min ({}) > cd_max ({})",
                self.cd_min,
                self.cd_max
            ));
        }
        if self.stall_aoa_rad <= 0.0 {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "LinearPolar stall_aoa_rad must be > 0"
            ));
        }
        Ok(())
    }
}

impl Polar for LinearPolar {
    fn sample(&self, aoa_rad: f64, _reynolds: f64, _mach: f64) -> EngineResult<PolarSample> {
        let alpha = aoa_rad.clamp(-self.stall_aoa_rad, self.stall_aoa_rad);
        let cl = (self.cl0 + self.cla_per_rad * alpha).clamp(self.cl_min, self.cl_max);
        let cd = (self.cd0 + self.k * cl * cl).clamp(self.cd_min, self.cd_max);
        Ok(PolarSample { cl, cd })
    }
}
