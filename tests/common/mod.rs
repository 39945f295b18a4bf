#![allow(dead_code)]

pub mod fixtures {
    use apiforge::model::{
        ApiDescriptor, ApiKeyAuth, AuthConfig, AuthScheme, DbOperation, Parameter,
        ParameterLocation, ResponseMapping, SchemaConfig,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use http::Method;

    /// Fixed instant used by manual clocks across the suite.
    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    /// `GET /employees/{id}` selecting two columns from `HR.EMPLOYEES`.
    pub fn get_emp_descriptor() -> ApiDescriptor {
        let mut d = ApiDescriptor::new(
            "Get Employee",
            "GET_EMP",
            Method::GET,
            "/employees/{id}",
            SchemaConfig::new("HR", "EMPLOYEES", DbOperation::Select),
        );
        d.base_path = "/api/v1".to_string();
        d.description = Some("Fetch one employee".to_string());

        let mut id = Parameter::new("id", ParameterLocation::Path, "NUMBER");
        id.required = true;
        id.api_type = "integer".to_string();
        id.db_column = Some("EMPLOYEE_ID".to_string());
        id.validation_pattern = Some("[0-9]+".to_string());
        d.parameters.push(id);

        let mut emp_id = ResponseMapping::new("id", "EMPLOYEE_ID");
        emp_id.api_type = "integer".to_string();
        emp_id.is_primary_key = true;
        let mut name = ResponseMapping::new("firstName", "FIRST_NAME");
        name.position = 1;
        d.response_mappings = vec![emp_id, name];
        d
    }

    /// `get_emp_descriptor` guarded by an `X-API-Key` header.
    pub fn api_key_descriptor(code: &str, key: &str) -> ApiDescriptor {
        let mut d = get_emp_descriptor();
        d.api_code = code.to_string();
        d.auth_config = AuthConfig::new(AuthScheme::ApiKey(ApiKeyAuth {
            api_key_value: Some(key.to_string()),
            ..ApiKeyAuth::default()
        }));
        d
    }

    pub const GET_EMP_JSON: &str = r#"{
  "apiName": "Get Employee",
  "apiCode": "GET_EMP",
  "httpMethod": "GET",
  "basePath": "/api/v1",
  "endpointPath": "/employees/{id}",
  "schemaConfig": {
    "schemaName": "HR",
    "objectName": "EMPLOYEES",
    "operation": "SELECT"
  },
  "authConfig": { "authType": "BEARER", "jwtSecret": "dev-token" },
  "parameters": [
    { "key": "id", "dbColumn": "EMPLOYEE_ID", "oracleType": "NUMBER",
      "apiType": "integer", "location": "path", "required": true }
  ],
  "responseMappings": [
    { "apiField": "id", "dbColumn": "EMPLOYEE_ID", "apiType": "integer" },
    { "apiField": "firstName", "dbColumn": "FIRST_NAME", "position": 1 }
  ]
}"#;
}
