use super::{coerce_value, placeholder_value, ExecutionError, ExecutionRequest};
use crate::generator::by_position;
use crate::model::{ApiDescriptor, DbOperation, ParameterLocation};
use serde_json::{json, Map, Value};

/// Runs the bound database operation for a validated request.
pub trait ApiExecutor: Send + Sync {
    fn execute(
        &self,
        descriptor: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<Value, ExecutionError>;
}

/// Stand-in executor returning placeholder data shaped by the response mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedExecutor;

impl SimulatedExecutor {
    fn row(d: &ApiDescriptor, request: &ExecutionRequest) -> Value {
        let row: Map<String, Value> = by_position(&d.response_mappings, |m| m.position)
            .into_iter()
            .filter(|m| m.include_in_response)
            .map(|m| {
                let value = request
                    .params
                    .get(&m.api_field)
                    .map(|raw| coerce_value(raw, &m.api_type))
                    .unwrap_or_else(|| placeholder_value(&m.api_type, m.format.as_deref()));
                (m.api_field.clone(), value)
            })
            .collect();
        Value::Object(row)
    }

    fn echoed_inputs(d: &ApiDescriptor, request: &ExecutionRequest) -> Value {
        let mut out = Map::new();
        for p in &d.parameters {
            let raw = match p.location {
                ParameterLocation::Path | ParameterLocation::Query => {
                    request.params.get(&p.key).cloned()
                }
                ParameterLocation::Header => request.header(&p.key).map(str::to_string),
                ParameterLocation::Body => {
                    if let Some(v) = request.body.as_ref().and_then(|b| b.get(&p.key)) {
                        out.insert(p.key.clone(), v.clone());
                    }
                    continue;
                }
            };
            if let Some(raw) = raw.or_else(|| p.default_value.clone()) {
                out.insert(p.key.clone(), coerce_value(&raw, &p.api_type));
            }
        }
        Value::Object(out)
    }
}

impl ApiExecutor for SimulatedExecutor {
    fn execute(
        &self,
        d: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<Value, ExecutionError> {
        let data = match d.schema_config.operation {
            Some(DbOperation::Select) => json!([Self::row(d, request)]),
            Some(DbOperation::Insert | DbOperation::Update | DbOperation::Delete) => {
                json!({ "rowsAffected": 1 })
            }
            Some(DbOperation::Execute) => {
                let result = d
                    .included_mappings()
                    .next()
                    .map(|m| placeholder_value(&m.api_type, m.format.as_deref()))
                    .unwrap_or_else(|| json!("OK"));
                json!({ "result": result, "parameters": Self::echoed_inputs(d, request) })
            }
            None => json!({ "rowsAffected": 0 }),
        };
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResponseMapping, SchemaConfig};
    use http::Method;

    #[test]
    fn test_select_row_uses_mapping_types() {
        let mut d = ApiDescriptor::new(
            "Test",
            "T",
            Method::GET,
            "/t",
            SchemaConfig::new("HR", "T", DbOperation::Select),
        );
        let mut id = ResponseMapping::new("id", "EMPLOYEE_ID");
        id.api_type = "integer".into();
        let mut hired = ResponseMapping::new("hired", "HIRE_DATE");
        hired.format = Some("date".into());
        let mut hidden = ResponseMapping::new("salary", "SALARY");
        hidden.include_in_response = false;
        d.response_mappings = vec![id, hired, hidden];

        let out = SimulatedExecutor
            .execute(&d, &ExecutionRequest::new().with_param("id", "7"))
            .unwrap();
        assert_eq!(out, json!([{ "id": 7, "hired": "2024-01-01" }]));
    }

    #[test]
    fn test_dml_reports_rows_affected() {
        let d = ApiDescriptor::new(
            "Test",
            "T",
            Method::DELETE,
            "/t",
            SchemaConfig::new("HR", "T", DbOperation::Delete),
        );
        let out = SimulatedExecutor.execute(&d, &ExecutionRequest::new()).unwrap();
        assert_eq!(out["rowsAffected"], 1);
    }
}
