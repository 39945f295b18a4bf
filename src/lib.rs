//! # apiforge
//!
//! **apiforge** turns declarative API descriptors into a PL/SQL package, an
//! [OpenAPI 3.0](https://spec.openapis.org/oas/v3.0.0) document and a
//! [Postman v2.1](https://schema.getpostman.com/json/collection/v2.1.0/collection.json)
//! collection, persisting each descriptor along the way.
//!
//! ## Architecture
//!
//! - **[`model`]** - The descriptor and its sub-configurations (schema binding,
//!   authentication, request/response settings, parameters, mappings, headers, tests)
//! - **[`lint`]** - Descriptor checks reported as [`lint::LintIssue`]s
//! - **[`generator`]** - PL/SQL, OpenAPI and Postman renderers plus the
//!   [`generator::GenerationOrchestrator`]
//! - **[`store`]** - [`store::ApiRepository`] with in-memory and SQLite backends
//! - **[`execution`]** - Request validation, simulated execution and response
//!   formatting for stored APIs
//! - **[`cache`]** / **[`clock`]** - TTL cache and injectable time source
//! - **[`config`]** / **[`telemetry`]** - File and environment configuration, logging
//! - **[`cli`]** - The `apiforge` command-line interface
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI
//!     participant Orch as GenerationOrchestrator
//!     participant Lint as lint_descriptor
//!     participant Repo as ApiRepository
//!     participant R as Renderers
//!
//!     CLI->>Orch: generate(descriptor, actor)
//!     Orch->>Lint: lint_descriptor(&descriptor)
//!     Lint-->>Orch: Vec<LintIssue>
//!     Orch->>Repo: exists_by_code(code)
//!     Orch->>Repo: save(descriptor)
//!     Repo-->>Orch: descriptor with id
//!     Orch->>R: PL/SQL (mandatory)
//!     Orch->>R: OpenAPI / Postman (when enabled)
//!     R-->>Orch: artifact text
//!     Orch-->>CLI: GenerationResult
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use apiforge::generator::{ArtifactKind, GenerationOrchestrator, RenderOptions};
//! use apiforge::model::{ApiDescriptor, DbOperation, SchemaConfig};
//! use apiforge::store::InMemoryApiRepository;
//! use http::Method;
//!
//! let descriptor = ApiDescriptor::new(
//!     "Get Employee",
//!     "GET_EMP",
//!     Method::GET,
//!     "/employees/{id}",
//!     SchemaConfig::new("HR", "EMPLOYEES", DbOperation::Select),
//! );
//! let orchestrator =
//!     GenerationOrchestrator::new(InMemoryApiRepository::new(), RenderOptions::default());
//! let result = orchestrator.generate(descriptor, "alice").expect("generation failed");
//! println!("{}", result.artifacts[&ArtifactKind::Plsql]);
//! ```
//!
//! ## Determinism
//!
//! Renderers read collections in `position` order and emit JSON with stable key
//! order. The PL/SQL header carries the descriptor's own timestamp, so an
//! unchanged descriptor renders byte-identical artifacts every time.

pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod execution;
pub mod generator;
pub mod ids;
pub mod lint;
pub mod model;
pub mod store;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{GenerationError, RenderError};
pub use generator::{ArtifactKind, GenerationOrchestrator, GenerationResult, RenderOptions};
pub use model::ApiDescriptor;
