//! PL/SQL package rendering.
//!
//! The package declares a single `execute_api` procedure whose formal parameters
//! mirror the descriptor's parameter list. The body statement depends on the bound
//! [`DbOperation`]; a descriptor with no operation gets the header, signature and
//! exception handler around a `NULL;` body.

use super::{by_position, ArtifactKind, ArtifactRenderer};
use crate::error::RenderError;
use crate::model::{ApiDescriptor, DbOperation, ObjectType, Parameter, ResponseMapping};
use askama::Template;
use tracing::debug;

const RESULT_FALLBACK_TYPE: &str = "VARCHAR2(4000)";

#[derive(Template)]
#[template(path = "plsql_package.sql.txt", escape = "none")]
pub struct PlsqlPackageTemplate {
    pub api_name: String,
    pub api_code: String,
    pub version: String,
    pub generated: String,
    pub package: String,
    /// Formal parameters for the package specification
    pub spec_params: Vec<String>,
    /// Formal parameters for the body, without constraints or defaults
    pub body_params: Vec<String>,
    pub declarations: Vec<String>,
    pub body_lines: Vec<String>,
}

/// Renders the `<CODE>_PKG` package specification and body.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlsqlRenderer;

impl PlsqlRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn template_data(&self, d: &ApiDescriptor) -> PlsqlPackageTemplate {
        let params = by_position(&d.parameters, |p| p.position);
        let columns: Vec<&ResponseMapping> = by_position(&d.response_mappings, |m| m.position)
            .into_iter()
            .filter(|m| m.include_in_response)
            .collect();

        let (declarations, body_lines) = match d.schema_config.operation {
            Some(DbOperation::Select) => select_body(d, &params, &columns),
            Some(DbOperation::Insert) => insert_body(d, &params, &columns),
            Some(DbOperation::Update) => update_body(d, &params),
            Some(DbOperation::Delete) => delete_body(d, &params),
            Some(DbOperation::Execute) => execute_body(d, &params, &columns),
            None => (Vec::new(), vec!["NULL;".to_string()]),
        };

        PlsqlPackageTemplate {
            api_name: d.api_name.clone(),
            api_code: d.api_code.clone(),
            version: d.version.clone(),
            generated: d.generated_stamp(),
            package: package_name(&d.api_code),
            spec_params: params.iter().map(|p| spec_param(p)).collect(),
            body_params: params
                .iter()
                .map(|p| format!("{} IN {}", p.plsql_name(), p.oracle_type))
                .collect(),
            declarations,
            body_lines,
        }
    }

    pub fn render(&self, d: &ApiDescriptor) -> Result<String, RenderError> {
        let data = self.template_data(d);
        debug!(
            api_code = %d.api_code,
            operation = ?d.schema_config.operation,
            statements = data.body_lines.len(),
            "rendering PL/SQL package"
        );
        Ok(data.render()?)
    }
}

impl ArtifactRenderer for PlsqlRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Plsql
    }

    fn try_render(&self, descriptor: &ApiDescriptor) -> Result<String, RenderError> {
        self.render(descriptor)
    }
}

/// The API code is used as written, matching the header and error message.
pub fn package_name(api_code: &str) -> String {
    format!("{api_code}_PKG")
}

fn spec_param(p: &Parameter) -> String {
    let mut line = format!("{} IN {}", p.plsql_name(), p.oracle_type);
    if p.required {
        line.push_str(" NOT NULL");
    }
    if let Some(default) = p.default_value.as_deref() {
        line.push_str(" DEFAULT ");
        line.push_str(default);
    }
    line
}

/// `WHERE 1=1` plus one `AND` line per path or query parameter.
fn where_lines(params: &[&Parameter]) -> Vec<String> {
    let mut lines = vec!["WHERE 1=1".to_string()];
    lines.extend(
        params
            .iter()
            .filter(|p| p.location.is_filter())
            .map(|p| format!("AND {} = {}", p.column(), p.plsql_name())),
    );
    lines
}

fn terminate(lines: &mut [String]) {
    if let Some(last) = lines.last_mut() {
        last.push(';');
    }
}

fn indent(lines: Vec<String>, by: &str) -> impl Iterator<Item = String> + '_ {
    lines.into_iter().map(move |l| format!("{by}{l}"))
}

fn select_body(
    d: &ApiDescriptor,
    params: &[&Parameter],
    columns: &[&ResponseMapping],
) -> (Vec<String>, Vec<String>) {
    let schema = &d.schema_config;
    let select_list = if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|m| m.db_column.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut query = vec![
        format!("SELECT {select_list}"),
        format!("FROM {}", schema.qualified_object()),
    ];
    query.extend(where_lines(params));
    if schema.enable_sorting {
        if let Some(col) = schema.default_sort_column.as_deref() {
            query.push(format!(
                "ORDER BY {col} {}",
                schema.default_sort_direction.as_str()
            ));
        }
    }
    if schema.enable_pagination {
        query.push(format!("FETCH FIRST {} ROWS ONLY", schema.page_size));
    }
    terminate(&mut query);

    let mut body = vec!["OPEN v_cursor FOR".to_string()];
    body.extend(indent(query, "    "));
    body.push("DBMS_SQL.RETURN_RESULT(v_cursor);".to_string());
    (vec!["v_cursor SYS_REFCURSOR;".to_string()], body)
}

fn insert_body(
    d: &ApiDescriptor,
    params: &[&Parameter],
    columns: &[&ResponseMapping],
) -> (Vec<String>, Vec<String>) {
    let schema = &d.schema_config;
    let mut cols: Vec<String> = columns.iter().map(|m| m.db_column.clone()).collect();
    let mut values: Vec<String> = params.iter().map(|p| p.plsql_name()).collect();

    if let (Some(pk), Some(seq)) = (
        schema.primary_key_column.as_deref(),
        schema.sequence_name.as_deref(),
    ) {
        if !cols.iter().any(|c| c.eq_ignore_ascii_case(pk)) {
            cols.insert(0, pk.to_string());
            values.insert(0, format!("{seq}.NEXTVAL"));
        }
    }

    let target = schema.qualified_object();
    let head = if cols.is_empty() {
        format!("INSERT INTO {target}")
    } else {
        format!("INSERT INTO {target} ({})", cols.join(", "))
    };
    let body = vec![
        head,
        format!("VALUES ({});", values.join(", ")),
        "COMMIT;".to_string(),
    ];
    (Vec::new(), body)
}

fn update_body(d: &ApiDescriptor, params: &[&Parameter]) -> (Vec<String>, Vec<String>) {
    let assignments: Vec<String> = params
        .iter()
        .filter(|p| !p.location.is_filter())
        .map(|p| format!("{} = {}", p.column(), p.plsql_name()))
        .collect();

    let mut stmt = vec![format!("UPDATE {}", d.schema_config.qualified_object())];
    if assignments.is_empty() {
        stmt.push("SET <no updatable parameters>".to_string());
        stmt.extend(where_lines(params));
        let mut body: Vec<String> = indent(stmt, "-- ").collect();
        body.push("NULL;".to_string());
        return (Vec::new(), body);
    }

    stmt.push(format!("SET {}", assignments.join(", ")));
    stmt.extend(where_lines(params));
    terminate(&mut stmt);
    stmt.push("COMMIT;".to_string());
    (Vec::new(), stmt)
}

fn delete_body(d: &ApiDescriptor, params: &[&Parameter]) -> (Vec<String>, Vec<String>) {
    let mut stmt = vec![format!("DELETE FROM {}", d.schema_config.qualified_object())];
    stmt.extend(where_lines(params));
    terminate(&mut stmt);
    stmt.push("COMMIT;".to_string());
    (Vec::new(), stmt)
}

fn execute_body(
    d: &ApiDescriptor,
    params: &[&Parameter],
    columns: &[&ResponseMapping],
) -> (Vec<String>, Vec<String>) {
    let target = d.schema_config.qualified_object();
    let call = if params.is_empty() {
        target
    } else {
        // Positional and named notation cannot be mixed in one call.
        let named = params.iter().any(|p| p.db_parameter.is_some());
        let args: Vec<String> = params
            .iter()
            .map(|p| {
                if named {
                    format!("{} => {}", p.db_parameter_name(), p.plsql_name())
                } else {
                    p.plsql_name()
                }
            })
            .collect();
        format!("{target}({})", args.join(", "))
    };

    if d.schema_config.effective_object_type() == ObjectType::Function {
        let result_type = columns
            .first()
            .map(|m| local_type(&m.oracle_type))
            .unwrap_or_else(|| RESULT_FALLBACK_TYPE.to_string());
        (
            vec![format!("v_result {result_type};")],
            vec![format!("v_result := {call};")],
        )
    } else {
        (Vec::new(), vec![format!("{call};")])
    }
}

/// Local variables need a length on character types.
fn local_type(oracle_type: &str) -> String {
    match oracle_type.trim().to_ascii_uppercase().as_str() {
        "VARCHAR2" | "NVARCHAR2" | "VARCHAR" => format!("{}(4000)", oracle_type.trim()),
        "" => RESULT_FALLBACK_TYPE.to_string(),
        _ => oracle_type.trim().to_string(),
    }
}
