use crate::ids::ApiId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One generated output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Plsql,
    Openapi,
    Postman,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Plsql,
        ArtifactKind::Openapi,
        ArtifactKind::Postman,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Plsql => "plsql",
            ArtifactKind::Openapi => "openapi",
            ArtifactKind::Postman => "postman",
        }
    }

    /// File name used by `write_artifacts` for an API code.
    pub fn file_name(&self, api_code: &str) -> String {
        match self {
            ArtifactKind::Plsql => format!("{}_pkg.sql", api_code),
            ArtifactKind::Openapi => format!("{}.openapi.json", api_code),
            ArtifactKind::Postman => {
                format!("{}.postman_collection.json", api_code)
            }
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plsql" | "sql" => Ok(ArtifactKind::Plsql),
            "openapi" | "swagger" => Ok(ArtifactKind::Openapi),
            "postman" => Ok(ArtifactKind::Postman),
            other => Err(format!("unknown artifact kind '{other}'")),
        }
    }
}

/// Counts and digests describing one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub parameter_count: usize,
    pub response_mapping_count: usize,
    pub header_count: usize,
    pub generated_at: DateTime<Utc>,
    /// Hex SHA-256 of each artifact's text
    pub digests: BTreeMap<ArtifactKind, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub artifacts: BTreeMap<ArtifactKind, String>,
    pub persisted_id: ApiId,
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&str> {
        self.artifacts.get(&kind).map(String::as_str)
    }
}

pub fn sha256_hex(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Write each artifact to `dir`, returning the written paths in kind order.
pub fn write_artifacts(
    result: &GenerationResult,
    api_code: &str,
    dir: &Path,
) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(result.artifacts.len());
    for (kind, text) in &result.artifacts {
        let path = dir.join(kind.file_name(api_code));
        std::fs::write(&path, text)?;
        written.push(path);
    }
    Ok(written)
}
