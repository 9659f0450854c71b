use crate::utils::math::{fnv1a64, hash_to_hex};
use serde::{Deserialize, Serialize};

/// `{schema_version, hash_hex}` where `hash_hex` is a stable 64-bit FNV-1a
/// over the emitted artifact bytes (spec §3 "Artifact audit"). The tag is
/// computed over the byte stream, never the in-memory structure (spec §9
/// "Artifact bytes vs. structures").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactAudit {
    pub schema_version: String,
    pub hash_hex: String,
}

impl ArtifactAudit {
    pub fn of(schema_version: impl Into<String>, content: &str) -> Self {
        let schema_version = schema_version.into();
        let hash_hex = hash_to_hex(fnv1a64(content.as_bytes()));
        Self { schema_version, hash_hex }
    }

    /// `"<schema_version>:<hash_hex>"` (spec §3, §6 "schema_version:hex(...)").
    pub fn tag(&self) -> String {
        format!("{}:{}", self.schema_version, self.hash_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_same_tag() {
        let a = ArtifactAudit::of("closeout.v1", "abc");
        let b = ArtifactAudit::of("closeout.v1", "abc");
        assert_eq!(a.tag(), b.tag());
    }

    #[test]
    fn single_bit_change_changes_tag() {
        let a = ArtifactAudit::of("closeout.v1", "abc");
        let b = ArtifactAudit::of("closeout.v1", "abd");
        assert_ne!(a.tag(), b.tag());
    }

    #[test]
    fn tag_has_expected_shape() {
        let a = ArtifactAudit::of("schema.v1", "content");
        let parts: Vec<&str> = a.tag().split(':').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "schema.v1");
        assert_eq!(parts[1].len(), 16);
    }
}
