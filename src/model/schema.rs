use serde::{Deserialize, Serialize};
use std::fmt;

/// Database action bound to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DbOperation {
    Select,
    Insert,
    Update,
    Delete,
    Execute,
}

impl DbOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbOperation::Select => "SELECT",
            DbOperation::Insert => "INSERT",
            DbOperation::Update => "UPDATE",
            DbOperation::Delete => "DELETE",
            DbOperation::Execute => "EXECUTE",
        }
    }
}

impl fmt::Display for DbOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of Oracle object the descriptor targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectType {
    #[default]
    Table,
    View,
    Procedure,
    Function,
    Synonym,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::View => "VIEW",
            ObjectType::Procedure => "PROCEDURE",
            ObjectType::Function => "FUNCTION",
            ObjectType::Synonym => "SYNONYM",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Where a synonym actually points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynonymTarget {
    pub target_type: ObjectType,
    pub target_name: String,
    #[serde(default)]
    pub target_owner: Option<String>,
}

/// Binding between the API and one Oracle object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    #[serde(default)]
    pub schema_name: String,
    pub object_name: String,
    #[serde(default)]
    pub object_type: ObjectType,
    /// `None` renders a package with no body statements.
    #[serde(default)]
    pub operation: Option<DbOperation>,
    #[serde(default)]
    pub primary_key_column: Option<String>,
    #[serde(default)]
    pub sequence_name: Option<String>,
    #[serde(default)]
    pub enable_pagination: bool,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub enable_sorting: bool,
    #[serde(default)]
    pub default_sort_column: Option<String>,
    #[serde(default)]
    pub default_sort_direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonym: Option<SynonymTarget>,
}

fn default_page_size() -> u32 {
    10
}

impl SchemaConfig {
    pub fn new(schema_name: &str, object_name: &str, operation: DbOperation) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            object_name: object_name.to_string(),
            object_type: ObjectType::Table,
            operation: Some(operation),
            primary_key_column: None,
            sequence_name: None,
            enable_pagination: false,
            page_size: default_page_size(),
            enable_sorting: false,
            default_sort_column: None,
            default_sort_direction: SortDirection::Asc,
            synonym: None,
        }
    }

    pub fn is_synonym(&self) -> bool {
        self.synonym.is_some()
    }

    /// `SCHEMA.OBJECT`, or just `OBJECT` when no schema is set.
    pub fn qualified_object(&self) -> String {
        if self.schema_name.trim().is_empty() {
            self.object_name.clone()
        } else {
            format!("{}.{}", self.schema_name, self.object_name)
        }
    }

    /// Object type after following a synonym.
    pub fn effective_object_type(&self) -> ObjectType {
        match &self.synonym {
            Some(target) => target.target_type,
            None => self.object_type,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            schema_name: String::new(),
            object_name: String::new(),
            object_type: ObjectType::Table,
            operation: None,
            primary_key_column: None,
            sequence_name: None,
            enable_pagination: false,
            page_size: default_page_size(),
            enable_sorting: false,
            default_sort_column: None,
            default_sort_direction: SortDirection::Asc,
            synonym: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operation_rejected() {
        let err = serde_json::from_str::<SchemaConfig>(
            r#"{"objectName":"EMP","operation":"MERGE"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_operation_allowed() {
        let cfg: SchemaConfig = serde_json::from_str(r#"{"objectName":"EMP"}"#).unwrap();
        assert_eq!(cfg.operation, None);
        assert_eq!(cfg.page_size, 10);
    }

    #[test]
    fn test_synonym_effective_type() {
        let cfg: SchemaConfig = serde_json::from_str(
            r#"{"schemaName":"APP","objectName":"CALC","objectType":"SYNONYM",
                "synonym":{"targetType":"FUNCTION","targetName":"CALC_V2","targetOwner":"CORE"}}"#,
        )
        .unwrap();
        assert!(cfg.is_synonym());
        assert_eq!(cfg.effective_object_type(), ObjectType::Function);
        assert_eq!(cfg.qualified_object(), "APP.CALC");
    }
}
