//! # Descriptor Linter
//!
//! Checks a descriptor before anything is persisted or rendered.
//!
//! ## Checks Performed
//!
//! Errors (generation is refused):
//!
//! 1. **Empty name** - `apiName` must not be blank
//! 2. **API code** - must be an Oracle identifier short enough that `<code>_PKG` fits 30 chars
//! 3. **Endpoint path** - must start with `/`
//! 4. **Parameter keys** - unique and usable as part of a PL/SQL identifier
//! 5. **Validation patterns** - must compile as regular expressions
//! 6. **Object name** - `schemaConfig.objectName` must not be blank
//!
//! Warnings (generation proceeds):
//!
//! 1. **Missing operation** - the package renders without a body statement
//! 2. **Unbound path parameters** - `{key}` absent from the endpoint path
//! 3. **INSERT arity** - column and value lists differ in length
//! 4. **OAuth2 scopes** - scheme declared without scopes
//! 5. **Client SDK** - requested but not produced
//!
//! ## Usage
//!
//! ```rust,ignore
//! use apiforge::lint::{lint_descriptor, has_errors};
//!
//! let issues = lint_descriptor(&descriptor);
//! if has_errors(&issues) {
//!     print_lint_issues(&issues);
//! }
//! ```

use crate::model::{ApiDescriptor, AuthScheme, DbOperation, ParameterLocation};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// Longest API code that still leaves room for the `_PKG` suffix in a 30-char identifier.
pub const MAX_API_CODE_LEN: usize = 26;

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintSeverity {
    /// Error - generation is refused
    Error,
    /// Warning - generation proceeds
    Warning,
    /// Info - informational only
    Info,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LintSeverity::Error => "error",
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A lint issue found in a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Where the issue occurred (e.g., "apiCode", "parameters[2]")
    pub location: String,
    pub severity: LintSeverity,
    /// Machine-readable kind (e.g., "invalid_api_code")
    pub kind: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl LintIssue {
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}: {}",
            self.severity, self.kind, self.location, self.message
        )
    }
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static identifier regex")
    })
}

/// True when `s` can be used as an unquoted Oracle identifier fragment.
pub fn is_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

/// Lint a descriptor, returning every issue found in declaration order.
pub fn lint_descriptor(descriptor: &ApiDescriptor) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    lint_identity(descriptor, &mut issues);
    lint_schema(descriptor, &mut issues);
    lint_parameters(descriptor, &mut issues);
    lint_auth(descriptor, &mut issues);

    if descriptor.settings.generate_client_sdk {
        issues.push(LintIssue::new(
            "settings.generateClientSdk",
            LintSeverity::Warning,
            "client_sdk_unsupported",
            "Client SDK generation is requested but no SDK artifact is produced",
        ));
    }
    issues
}

fn lint_identity(d: &ApiDescriptor, issues: &mut Vec<LintIssue>) {
    if d.api_name.trim().is_empty() {
        issues.push(LintIssue::new(
            "apiName",
            LintSeverity::Error,
            "empty_name",
            "API name must not be empty",
        ));
    }

    if !is_identifier(&d.api_code) {
        issues.push(
            LintIssue::new(
                "apiCode",
                LintSeverity::Error,
                "invalid_api_code",
                format!("API code '{}' is not a valid Oracle identifier", d.api_code),
            )
            .with_suggestion("Start with a letter and use only letters, digits and '_'"),
        );
    } else if d.api_code.len() > MAX_API_CODE_LEN {
        issues.push(LintIssue::new(
            "apiCode",
            LintSeverity::Error,
            "api_code_too_long",
            format!(
                "API code '{}' is {} chars; at most {} fit the package name",
                d.api_code,
                d.api_code.len(),
                MAX_API_CODE_LEN
            ),
        ));
    }

    if !d.endpoint_path.starts_with('/') {
        issues.push(
            LintIssue::new(
                "endpointPath",
                LintSeverity::Error,
                "invalid_endpoint_path",
                format!("Endpoint path '{}' must start with '/'", d.endpoint_path),
            )
            .with_suggestion(format!("/{}", d.endpoint_path)),
        );
    }
}

fn lint_schema(d: &ApiDescriptor, issues: &mut Vec<LintIssue>) {
    let schema = &d.schema_config;
    if schema.object_name.trim().is_empty() {
        issues.push(LintIssue::new(
            "schemaConfig.objectName",
            LintSeverity::Error,
            "empty_object_name",
            "Target object name must not be empty",
        ));
    }

    match schema.operation {
        None => issues.push(
            LintIssue::new(
                "schemaConfig.operation",
                LintSeverity::Warning,
                "missing_operation",
                "No database operation is bound; the package body will contain no statement",
            )
            .with_suggestion("Set one of SELECT, INSERT, UPDATE, DELETE, EXECUTE"),
        ),
        Some(DbOperation::Insert) => {
            let columns = d.included_mappings().count();
            let values = d.parameters.len();
            if columns != values {
                issues.push(LintIssue::new(
                    "schemaConfig.operation",
                    LintSeverity::Warning,
                    "insert_arity_mismatch",
                    format!(
                        "INSERT lists {columns} column(s) from response mappings but {values} value(s) from parameters"
                    ),
                ));
            }
        }
        Some(_) => {}
    }
}

fn lint_parameters(d: &ApiDescriptor, issues: &mut Vec<LintIssue>) {
    let mut seen = HashSet::new();
    for (i, param) in d.parameters.iter().enumerate() {
        let location = format!("parameters[{i}]");

        if !is_identifier(&param.key) {
            issues.push(LintIssue::new(
                &location,
                LintSeverity::Error,
                "invalid_parameter_key",
                format!("Parameter key '{}' is not a valid identifier", param.key),
            ));
        }
        if !seen.insert(param.key.as_str()) {
            issues.push(LintIssue::new(
                &location,
                LintSeverity::Error,
                "duplicate_parameter_key",
                format!("Parameter key '{}' is declared more than once", param.key),
            ));
        }
        if let Some(pattern) = param.validation_pattern.as_deref() {
            if let Err(e) = Regex::new(pattern) {
                issues.push(LintIssue::new(
                    &location,
                    LintSeverity::Error,
                    "invalid_validation_pattern",
                    format!("Pattern for '{}' does not compile: {e}", param.key),
                ));
            }
        }
        if param.location == ParameterLocation::Path {
            let placeholder = format!("{{{}}}", param.key);
            if !d.endpoint_path.contains(&placeholder) {
                issues.push(
                    LintIssue::new(
                        &location,
                        LintSeverity::Warning,
                        "unbound_path_parameter",
                        format!(
                            "Path parameter '{}' does not appear in '{}'",
                            param.key, d.endpoint_path
                        ),
                    )
                    .with_suggestion(format!("Add {placeholder} to the endpoint path")),
                );
            }
        }
    }
}

fn lint_auth(d: &ApiDescriptor, issues: &mut Vec<LintIssue>) {
    if let AuthScheme::OAuth2(oauth) = &d.auth_config.scheme {
        if oauth.oauth_scopes.is_empty() {
            issues.push(LintIssue::new(
                "authConfig.oauthScopes",
                LintSeverity::Warning,
                "oauth2_without_scopes",
                "OAuth2 is configured without any scope",
            ));
        }
    }
}

pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(|i| i.severity == LintSeverity::Error)
}

/// Print lint issues grouped by severity
pub fn print_lint_issues(issues: &[LintIssue]) {
    if issues.is_empty() {
        println!("✅ No lint issues found!");
        return;
    }

    let count = |s: LintSeverity| issues.iter().filter(|i| i.severity == s).count();
    println!("\n📋 Lint Results:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        count(LintSeverity::Error),
        count(LintSeverity::Warning),
        count(LintSeverity::Info)
    );

    for (severity, title) in [
        (LintSeverity::Error, "❌ Errors (must fix):"),
        (LintSeverity::Warning, "⚠️  Warnings (should fix):"),
        (LintSeverity::Info, "ℹ️  Info:"),
    ] {
        let group: Vec<_> = issues.iter().filter(|i| i.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        println!("{title}");
        for issue in group {
            println!("   [{}] {}", issue.kind, issue.location);
            println!("      {}", issue.message);
            if let Some(suggestion) = &issue.suggestion {
                println!("      💡 Suggestion: {}", suggestion);
            }
        }
        println!();
    }
}
