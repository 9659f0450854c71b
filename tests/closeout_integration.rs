use rotor_closeout::artifact::ArtifactAudit;
use rotor_closeout::bemt::BemtStatus;
use rotor_closeout::closeout::{CloseoutConfig, CloseoutInputs, GateStatus};
use rotor_closeout::geometry::{BladeStation, Environment, FlightMode, OperatingPoint, RotorGeometry, SolverConfig, TipLossModel};
use rotor_closeout::pipeline::{closeout_csv_header, closeout_row_to_csv, emit_closeout_csv, emit_gonogo_csv, run_case, run_gates};
use rotor_closeout::polar::{LinearPolar, Polar, PolarVariant};
use rotor_closeout::sensitivity::SensitivityConfig;
use rotor_closeout::utils::errors::{EngineResult, ErrorKind};
use rotor_closeout::{engine_err, here, PolarDatabase};
use std::collections::HashMap;

struct SinglePolarDb(HashMap<String, PolarVariant>);

impl PolarDatabase for SinglePolarDb {
    fn get_polar(&self, airfoil_id: &str) -> EngineResult<&dyn Polar> {
        self.0
            .get(airfoil_id)
            .map(|p| p as &dyn Polar)
            .ok_or_else(|| engine_err!(ErrorKind::MissingPolarData, "no polar for {}", airfoil_id))
    }
}

fn two_blade_geometry() -> RotorGeometry {
    RotorGeometry {
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
    }
}

fn naca_db() -> SinglePolarDb {
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
    SinglePolarDb(polars)
}

fn permissive_closeout_config() -> CloseoutConfig {
    CloseoutConfig {
        mass_delta_max_kg: 0.0,
        a_total_min_m2: 0.0,
        disk_loading_max_n_m2: 0.0,
        hover_power_max_w: 0.0,
        cds_max_m2: 0.0,
        p_parasite_max_w: 0.0,
        yaw_margin_min: 0.0,
        roll_margin_min: 0.0,
        pitch_margin_min: 0.0,
        turn_radius_max_m: 0.0,
        sync_margin_min: 0.0,
        fm_min: 0.0,
        require_compliance_ok: false,
    }
}

/// Hover closeout, end to end: geometry + environment + operating point
/// through the BEMT solver, into a `CloseoutRow`, through the gate engine,
/// out as `closeout.csv` + `gonogo.csv`, and finally content-hashed.
#[test]
fn hover_case_produces_go_closeout_with_stable_artifact_hash() {
    let geometry = two_blade_geometry();
    let environment = Environment { rho: 1.225, mu: 1.81e-5, speed_of_sound: 340.0 };
    let polars = naca_db();
    let config = SolverConfig::default();
    let op = OperatingPoint {
        mode: FlightMode::Hover,
        freestream_speed: 0.0,
        omega: 450.0,
        collective_offset_rad: 6f64.to_radians(),
        target_thrust_n: None,
        inflow_angle_rad: 0.0,
    };

    let row = run_case("case-1", &geometry, &environment, &op, None, &polars, &config, &SensitivityConfig::default())
        .expect("hover solve should converge for this fixture");
    assert_eq!(row.hover_status, BemtStatus::Ok);
    assert_eq!(closeout_row_to_csv(&row).len(), closeout_csv_header().len());

    let report = run_gates(&row, &permissive_closeout_config(), &CloseoutInputs::default());
    assert_eq!(report.verdict, GateStatus::Go);

    let csv_a = emit_closeout_csv(&[row]);
    let hash_a = ArtifactAudit::of("closeout.v1", &csv_a);

    // Re-running the identical case must reproduce byte-identical output and hash.
    let row_again = run_case("case-1", &geometry, &environment, &op, None, &polars, &config, &SensitivityConfig::default()).unwrap();
    let csv_b = emit_closeout_csv(&[row_again]);
    let hash_b = ArtifactAudit::of("closeout.v1", &csv_b);
    assert_eq!(hash_a.tag(), hash_b.tag());

    let gonogo = emit_gonogo_csv(&[report]);
    assert!(gonogo.lines().any(|l| l.starts_with("case-1,Go")));
}

/// An operating point outside the rotor's trim envelope should surface as a
/// non-`Go` verdict rather than a panic, honoring the NaN-is-unset
/// discipline through the full pipeline.
#[test]
fn untrimmable_case_does_not_silently_report_go() {
    let geometry = two_blade_geometry();
    let environment = Environment { rho: 1.225, mu: 1.81e-5, speed_of_sound: 340.0 };
    let polars = naca_db();
    let config = SolverConfig::default();
    let op = OperatingPoint {
        mode: FlightMode::Hover,
        freestream_speed: 0.0,
        omega: 450.0,
        collective_offset_rad: 6f64.to_radians(),
        target_thrust_n: Some(1.0e9),
        inflow_angle_rad: 0.0,
    };

    let row = run_case("case-2", &geometry, &environment, &op, None, &polars, &config, &SensitivityConfig::default())
        .expect("trim attempt returns a result even when it cannot converge");
    assert_ne!(row.hover_status, BemtStatus::Ok);

    let report = run_gates(&row, &permissive_closeout_config(), &CloseoutInputs::default());
    assert_ne!(report.verdict, GateStatus::Go);
}
