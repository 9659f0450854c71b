use super::{Polar, PolarSample, PolarVariant};
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};

/// A strictly-increasing list of `(r, polar)` nodes. At solve time, the
/// station's radius selects the nearest node's polar by L1 distance (spec
/// §4.2 "A radius-aware adapter layers piecewise polar selection on top").
#[derive(Debug, Clone)]
pub struct PiecewisePolar {
    nodes: Vec<(f64, PolarVariant)>,
}

impl PiecewisePolar {
    pub fn new(nodes: Vec<(f64, PolarVariant)>) -> EngineResult<Self> {
        if nodes.is_empty() {
            return Err(engine_err!(
                ErrorKind::InvalidConfig,
                "PiecewisePolar needs at least one (r, polar) node"
            ));
        }
        for w in nodes.windows(2) {
            if !(w[1].0 > w[0].0) {
                return Err(engine_err!(
                    ErrorKind::InvalidConfig,
                    "PiecewisePolar nodes must be strictly increasing in r"
                ));
            }
        }
        Ok(Self { nodes })
    }

    /// Select the polar whose node radius is nearest `r` (L1 distance,
    /// ties broken toward the earlier node).
    pub fn select(&self, r: f64) -> &PolarVariant {
        let mut best_idx = 0usize;
        let mut best_dist = f64::INFINITY;
        for (i, (nr, _)) in self.nodes.iter().enumerate() {
            let d = (nr - r).abs();
            if d < best_dist {
                best_dist = d;
                best_idx = i;
            }
        }
        &self.nodes[best_idx].1
    }

    /// Sample at a given station radius: select the nearest node's polar,
    /// then query it at the given flow condition.
    pub fn sample_at(&self, r: f64, aoa_rad: f64, reynolds: f64, mach: f64) -> EngineResult<PolarSample> {
        self.select(r).sample(aoa_rad, reynolds, mach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar::LinearPolar;

    fn lin(cl0: f64) -> PolarVariant {
        PolarVariant::Linear(LinearPolar {
            cl0,
            cla_per_rad: 2.0 * std::f64::consts::PI,
            cl_min: -1.5,
            cl_max: 1.5,
            stall_aoa_rad: 15f64.to_radians(),
            cd0: 0.01,
            k: 0.02,
            cd_min: 0.005,
            cd_max: 0.3,
        })
    }

    #[test]
    fn selects_nearest_node_by_l1_distance() {
        let pw = PiecewisePolar::new(vec![(0.1, lin(0.0)), (0.3, lin(1.0)), (0.5, lin(2.0))]).unwrap();
        let s = pw.sample_at(0.26, 0.0, 1e5, 0.1).unwrap();
        assert_eq!(s.cl, 1.0);
        let s2 = pw.sample_at(0.05, 0.0, 1e5, 0.1).unwrap();
        assert_eq!(s2.cl, 0.0);
    }

    #[test]
    fn rejects_non_increasing_nodes() {
        assert!(PiecewisePolar::new(vec![(0.3, lin(0.0)), (0.1, lin(1.0))]).is_err());
    }

    #[test]
    fn rejects_empty_nodes() {
        assert!(PiecewisePolar::new(vec![]).is_err());
    }
}
