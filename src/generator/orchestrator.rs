use super::{
    sha256_hex, ArtifactKind, GenerationMetadata, GenerationResult, OpenApiRenderer,
    PlsqlRenderer, PostmanRenderer, RenderOptions,
};
use crate::cache::TtlCache;
use crate::clock::{Clock, SystemClock};
use crate::error::GenerationError;
use crate::lint::{lint_descriptor, LintSeverity};
use crate::model::ApiDescriptor;
use crate::store::ApiRepository;
use chrono::Duration;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How long an on-demand artifact stays cached when no TTL is configured.
pub const DEFAULT_ARTIFACT_TTL_SECS: i64 = 300;

/// Structured key for the artifact cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCacheKey {
    pub api_code: String,
    pub kind: ArtifactKind,
}

/// Validates, persists and renders descriptors.
pub struct GenerationOrchestrator<R: ApiRepository> {
    repository: R,
    clock: Arc<dyn Clock>,
    plsql: PlsqlRenderer,
    openapi: OpenApiRenderer,
    postman: PostmanRenderer,
    cache: TtlCache<ArtifactCacheKey, String>,
}

impl<R: ApiRepository> GenerationOrchestrator<R> {
    pub fn new(repository: R, options: RenderOptions) -> Self {
        Self::with_clock(
            repository,
            options,
            Arc::new(SystemClock),
            Duration::seconds(DEFAULT_ARTIFACT_TTL_SECS),
        )
    }

    pub fn with_clock(
        repository: R,
        options: RenderOptions,
        clock: Arc<dyn Clock>,
        artifact_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            plsql: PlsqlRenderer::new(),
            openapi: OpenApiRenderer::new(options.clone()),
            postman: PostmanRenderer::new(options),
            cache: TtlCache::new(artifact_ttl, Arc::clone(&clock)),
            clock,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Generate all enabled artifacts for a new descriptor.
    ///
    /// Lint errors and an existing API code abort before anything is persisted.
    /// PL/SQL is always rendered and its failure is fatal; OpenAPI and Postman are
    /// gated by `settings` and degrade to `"{}"` on failure.
    pub fn generate(
        &self,
        mut descriptor: ApiDescriptor,
        actor: &str,
    ) -> Result<GenerationResult, GenerationError> {
        let api_code = descriptor.api_code.clone();

        let issues = lint_descriptor(&descriptor);
        for issue in issues.iter().filter(|i| i.severity == LintSeverity::Warning) {
            warn!(api_code = %api_code, kind = %issue.kind, location = %issue.location, "{}", issue.message);
        }
        let errors: Vec<_> = issues
            .into_iter()
            .filter(|i| i.severity == LintSeverity::Error)
            .collect();
        if !errors.is_empty() {
            return Err(GenerationError::InvalidDescriptor { issues: errors });
        }

        if self.repository.exists_by_code(&api_code)? {
            return Err(GenerationError::DuplicateCode { api_code });
        }

        let now = self.clock.now();
        descriptor.normalize_positions();
        descriptor.created_at = Some(now);
        descriptor.updated_at = Some(now);
        descriptor.created_by = Some(actor.to_string());
        descriptor.is_active = true;
        descriptor.total_calls = 0;
        descriptor.last_called_at = None;

        let saved = self.repository.save(descriptor).map_err(|e| {
            let e = GenerationError::from(e);
            if matches!(e, GenerationError::Persistence(_)) {
                error!(api_code = %api_code, error = %e, "failed to persist descriptor");
            }
            e
        })?;
        let persisted_id = saved.id.unwrap_or_default();

        let mut artifacts = BTreeMap::new();
        let sql = self
            .plsql
            .render(&saved)
            .map_err(|source| GenerationError::Render {
                kind: ArtifactKind::Plsql,
                source,
            })?;
        artifacts.insert(ArtifactKind::Plsql, sql);

        if saved.settings.generate_swagger {
            artifacts.insert(ArtifactKind::Openapi, self.openapi.render(&saved));
        }
        if saved.settings.generate_postman {
            artifacts.insert(ArtifactKind::Postman, self.postman.render(&saved));
        }
        if saved.settings.generate_client_sdk {
            debug!(api_code = %api_code, "client SDK generation requested; no SDK target is available");
        }

        let digests = artifacts
            .iter()
            .map(|(kind, text)| (*kind, sha256_hex(text)))
            .collect();
        let metadata = GenerationMetadata {
            parameter_count: saved.parameters.len(),
            response_mapping_count: saved.response_mappings.len(),
            header_count: saved.headers.len(),
            generated_at: now,
            digests,
        };

        info!(
            api_code = %api_code,
            api_id = %persisted_id,
            artifacts = artifacts.len(),
            "generated API artifacts"
        );
        Ok(GenerationResult {
            artifacts,
            persisted_id,
            metadata,
        })
    }

    /// Render one artifact for a stored descriptor, served from the TTL cache
    /// when a fresh copy exists.
    ///
    /// Optional artifacts are rendered on demand regardless of the generation
    /// switches.
    pub fn artifact(&self, api_code: &str, kind: ArtifactKind) -> Result<String, GenerationError> {
        let key = ArtifactCacheKey {
            api_code: api_code.to_string(),
            kind,
        };
        if let Some(text) = self.cache.get(&key) {
            debug!(api_code, %kind, "artifact cache hit");
            return Ok(text);
        }

        let descriptor =
            self.repository
                .find_by_code(api_code)?
                .ok_or_else(|| GenerationError::NotFound {
                    api_code: api_code.to_string(),
                })?;
        let text = match kind {
            ArtifactKind::Plsql => self
                .plsql
                .render(&descriptor)
                .map_err(|source| GenerationError::Render { kind, source })?,
            ArtifactKind::Openapi => self.openapi.render(&descriptor),
            ArtifactKind::Postman => self.postman.render(&descriptor),
        };
        self.cache.insert(key, text.clone());
        Ok(text)
    }

    /// Drop every cached artifact of one API.
    pub fn invalidate(&self, api_code: &str) -> usize {
        self.cache.invalidate_where(|k| k.api_code == api_code)
    }

    pub fn cache(&self) -> &TtlCache<ArtifactCacheKey, String> {
        &self.cache
    }
}
