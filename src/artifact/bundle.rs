use super::csv::{quote_field, CsvWriter};
use super::hash::ArtifactAudit;
use super::json::{emit_json, JsonValue};
use crate::utils::errors::EngineResult;

/// One named artifact slot in a bundle. `audit` is `None` when the
/// artifact was deliberately marked absent (spec §7 "if an artifact is
/// marked absent, its audit slot is empty and the bundle-level digest
/// reflects its absence").
#[derive(Debug, Clone)]
pub struct BundleEntry {
    pub name: String,
    pub audit: Option<ArtifactAudit>,
}

/// Lists every included artifact's schema tag plus a bundle-level digest
/// computed over the sorted list of child tags joined by a separator
/// (spec §4.8 "bundle manifest").
#[derive(Debug, Clone)]
pub struct BundleManifest {
    pub entries: Vec<BundleEntry>,
    pub bundle_audit: ArtifactAudit,
}

const SEPARATOR: &str = "|";

fn digest_input(entries: &[BundleEntry]) -> String {
    let mut tags: Vec<String> = entries.iter().map(|e| e.audit.as_ref().map_or(String::new(), ArtifactAudit::tag)).collect();
    tags.sort();
    tags.join(SEPARATOR)
}

/// Build a bundle manifest from a set of artifact entries (spec §4.8,
/// §8 S6 "Artifact audit stability").
pub fn build_bundle(entries: Vec<BundleEntry>) -> BundleManifest {
    let bundle_audit = ArtifactAudit::of("bundle_manifest.v1", &digest_input(&entries));
    BundleManifest { entries, bundle_audit }
}

pub fn emit_bundle_json(manifest: &BundleManifest) -> EngineResult<String> {
    let entries_json: Vec<JsonValue> = manifest
        .entries
        .iter()
        .map(|e| {
            JsonValue::obj(vec![
                ("name", JsonValue::String(e.name.clone())),
                (
                    "audit",
                    match &e.audit {
                        Some(a) => JsonValue::obj(vec![
                            ("schema_version", JsonValue::String(a.schema_version.clone())),
                            ("hash_hex", JsonValue::String(a.hash_hex.clone())),
                            ("tag", JsonValue::String(a.tag())),
                        ]),
                        None => JsonValue::Null,
                    },
                ),
            ])
        })
        .collect();
    let root = JsonValue::obj(vec![
        ("entries", JsonValue::Array(entries_json)),
        ("bundle_audit_tag", JsonValue::String(manifest.bundle_audit.tag())),
    ]);
    emit_json(&root, false)
}

pub fn emit_bundle_csv(manifest: &BundleManifest) -> String {
    let mut w = CsvWriter::new(&["name", "schema_version", "hash_hex", "tag"]);
    for e in &manifest.entries {
        match &e.audit {
            Some(a) => w.push_row(vec![e.name.clone(), a.schema_version.clone(), a.hash_hex.clone(), a.tag()]),
            None => w.push_row(vec![e.name.clone(), String::new(), String::new(), String::new()]),
        };
    }
    let mut out = w.finish();
    out.push_str(&format!("bundle_audit,,,{}\n", quote_field(&manifest.bundle_audit.tag())));
    out
}
