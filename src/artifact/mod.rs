pub mod bundle;
pub mod csv;
pub mod hash;
pub mod json;

pub use bundle::{build_bundle, emit_bundle_csv, emit_bundle_json, BundleEntry, BundleManifest};
pub use csv::{fmt_f64, pipe_join, quote_field, CsvWriter};
pub use hash::ArtifactAudit;
pub use json::{emit_json, parse_json, JsonValue};
