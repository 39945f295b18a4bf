use super::{ApiRepository, StoreError};
use crate::ids::ApiId;
use crate::model::{ApiDescriptor, ApiStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use http::Method;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS apis (
    id TEXT PRIMARY KEY,
    api_code TEXT NOT NULL UNIQUE,
    api_name TEXT NOT NULL,
    description TEXT,
    version TEXT NOT NULL,
    status TEXT NOT NULL,
    http_method TEXT NOT NULL,
    base_path TEXT NOT NULL,
    endpoint_path TEXT NOT NULL,
    category TEXT,
    owner TEXT,
    tags TEXT NOT NULL,
    created_at TEXT,
    updated_at TEXT,
    created_by TEXT,
    is_active INTEGER NOT NULL,
    total_calls INTEGER NOT NULL DEFAULT 0,
    last_called_at TEXT,
    source_object TEXT,
    schema_config TEXT NOT NULL,
    auth_config TEXT NOT NULL,
    request_config TEXT NOT NULL,
    response_config TEXT NOT NULL,
    settings TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS api_parameters (
    api_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    item_key TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (api_id, position),
    FOREIGN KEY (api_id) REFERENCES apis(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS api_response_mappings (
    api_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    item_key TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (api_id, position),
    FOREIGN KEY (api_id) REFERENCES apis(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS api_headers (
    api_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    item_key TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (api_id, position),
    FOREIGN KEY (api_id) REFERENCES apis(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS api_tests (
    api_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    item_key TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (api_id, position),
    FOREIGN KEY (api_id) REFERENCES apis(id) ON DELETE CASCADE
);";

const CHILD_TABLES: [&str; 4] = [
    "api_parameters",
    "api_response_mappings",
    "api_headers",
    "api_tests",
];

/// SQLite-backed descriptor repository.
///
/// Sub-configurations are stored as JSON columns on the parent row; collections
/// live in child tables keyed by `(api_id, position)`, where the row position is
/// the item's index in the saved descriptor.
pub struct SqliteApiRepository {
    connection: Mutex<Connection>,
}

fn db_err(err: rusqlite::Error) -> StoreError {
    StoreError::Io(err.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(text)?)
}

fn ts(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn parse_ts(value: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| StoreError::Serialization(format!("bad timestamp '{s}': {e}")))
        })
        .transpose()
}

impl SqliteApiRepository {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let connection = Connection::open(path).map_err(db_err)?;
        Self::with_connection(connection)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, StoreError> {
        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(db_err)?;
        connection.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Io("connection mutex poisoned".to_string()))
    }
}

fn insert_parent(tx: &Transaction<'_>, id: &str, d: &ApiDescriptor) -> Result<(), StoreError> {
    let result = tx.execute(
        "INSERT INTO apis (id, api_code, api_name, description, version, status, http_method, \
         base_path, endpoint_path, category, owner, tags, created_at, updated_at, created_by, \
         is_active, total_calls, last_called_at, source_object, schema_config, auth_config, \
         request_config, response_config, settings) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, \
         ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
        params![
            id,
            d.api_code,
            d.api_name,
            d.description,
            d.version,
            d.status.to_string(),
            d.http_method.as_str(),
            d.base_path,
            d.endpoint_path,
            d.category,
            d.owner,
            to_json(&d.tags)?,
            ts(d.created_at),
            ts(d.updated_at),
            d.created_by,
            d.is_active,
            i64::try_from(d.total_calls).unwrap_or(i64::MAX),
            ts(d.last_called_at),
            d.source_object.as_ref().map(to_json).transpose()?,
            to_json(&d.schema_config)?,
            to_json(&d.auth_config)?,
            to_json(&d.request_config)?,
            to_json(&d.response_config)?,
            to_json(&d.settings)?,
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            Err(StoreError::Conflict {
                api_code: d.api_code.clone(),
            })
        }
        Err(err) => Err(db_err(err)),
    }
}

fn insert_children<T: Serialize>(
    tx: &Transaction<'_>,
    table: &str,
    id: &str,
    items: &[T],
    key_of: impl Fn(&T) -> &str,
) -> Result<(), StoreError> {
    let mut stmt = tx
        .prepare(&format!(
            "INSERT INTO {table} (api_id, position, item_key, body) VALUES (?1, ?2, ?3, ?4)"
        ))
        .map_err(db_err)?;
    for (position, item) in items.iter().enumerate() {
        let position = i64::try_from(position).unwrap_or(i64::MAX);
        stmt.execute(params![id, position, key_of(item), to_json(item)?])
            .map_err(db_err)?;
    }
    Ok(())
}

fn load_children<T: DeserializeOwned>(
    conn: &Connection,
    table: &str,
    id: &str,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT body FROM {table} WHERE api_id = ?1 ORDER BY position"
        ))
        .map_err(db_err)?;
    let rows = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))
        .map_err(db_err)?;
    let mut out = Vec::new();
    for body in rows {
        out.push(from_json(&body.map_err(db_err)?)?);
    }
    Ok(out)
}

struct ParentRow {
    id: String,
    api_code: String,
    api_name: String,
    description: Option<String>,
    version: String,
    status: String,
    http_method: String,
    base_path: String,
    endpoint_path: String,
    category: Option<String>,
    owner: Option<String>,
    tags: String,
    created_at: Option<String>,
    updated_at: Option<String>,
    created_by: Option<String>,
    is_active: bool,
    total_calls: i64,
    last_called_at: Option<String>,
    source_object: Option<String>,
    schema_config: String,
    auth_config: String,
    request_config: String,
    response_config: String,
    settings: String,
}

impl ParentRow {
    fn into_descriptor(self) -> Result<ApiDescriptor, StoreError> {
        let id: ApiId = self
            .id
            .parse()
            .map_err(|_| StoreError::Serialization(format!("bad api id '{}'", self.id)))?;
        let status: ApiStatus = from_json(&format!("\"{}\"", self.status))?;
        let http_method = Method::from_bytes(self.http_method.as_bytes())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut d = ApiDescriptor::new(
            &self.api_name,
            &self.api_code,
            http_method,
            &self.endpoint_path,
            from_json(&self.schema_config)?,
        );
        d.id = Some(id);
        d.description = self.description;
        d.version = self.version;
        d.status = status;
        d.base_path = self.base_path;
        d.category = self.category;
        d.owner = self.owner;
        d.tags = from_json(&self.tags)?;
        d.created_at = parse_ts(self.created_at)?;
        d.updated_at = parse_ts(self.updated_at)?;
        d.created_by = self.created_by;
        d.is_active = self.is_active;
        d.total_calls = u64::try_from(self.total_calls).unwrap_or(0);
        d.last_called_at = parse_ts(self.last_called_at)?;
        d.source_object = self.source_object.as_deref().map(from_json).transpose()?;
        d.auth_config = from_json(&self.auth_config)?;
        d.request_config = from_json(&self.request_config)?;
        d.response_config = from_json(&self.response_config)?;
        d.settings = from_json(&self.settings)?;
        Ok(d)
    }
}

impl ApiRepository for SqliteApiRepository {
    fn exists_by_code(&self, api_code: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM apis WHERE api_code = ?1 LIMIT 1",
                params![api_code],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(found.is_some())
    }

    fn save(&self, mut descriptor: ApiDescriptor) -> Result<ApiDescriptor, StoreError> {
        let id = *descriptor.id.get_or_insert_with(ApiId::new);
        let id = id.to_string();
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;

        if let Err(e) = insert_parent(&tx, &id, &descriptor) {
            if !matches!(e, StoreError::Conflict { .. }) {
                error!(api_code = %descriptor.api_code, error = %e, "failed to insert descriptor");
            }
            return Err(e);
        }
        insert_children(&tx, CHILD_TABLES[0], &id, &descriptor.parameters, |p| {
            p.key.as_str()
        })?;
        insert_children(&tx, CHILD_TABLES[1], &id, &descriptor.response_mappings, |m| {
            m.api_field.as_str()
        })?;
        insert_children(&tx, CHILD_TABLES[2], &id, &descriptor.headers, |h| {
            h.key.as_str()
        })?;
        insert_children(&tx, CHILD_TABLES[3], &id, &descriptor.tests, |t| {
            t.name.as_str()
        })?;

        tx.commit().map_err(db_err)?;
        debug!(api_code = %descriptor.api_code, api_id = %id, "descriptor persisted");
        Ok(descriptor)
    }

    fn find_by_code(&self, api_code: &str) -> Result<Option<ApiDescriptor>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, api_code, api_name, description, version, status, http_method, \
                 base_path, endpoint_path, category, owner, tags, created_at, updated_at, \
                 created_by, is_active, total_calls, last_called_at, source_object, \
                 schema_config, auth_config, request_config, response_config, settings \
                 FROM apis WHERE api_code = ?1",
                params![api_code],
                |row| {
                    Ok(ParentRow {
                        id: row.get(0)?,
                        api_code: row.get(1)?,
                        api_name: row.get(2)?,
                        description: row.get(3)?,
                        version: row.get(4)?,
                        status: row.get(5)?,
                        http_method: row.get(6)?,
                        base_path: row.get(7)?,
                        endpoint_path: row.get(8)?,
                        category: row.get(9)?,
                        owner: row.get(10)?,
                        tags: row.get(11)?,
                        created_at: row.get(12)?,
                        updated_at: row.get(13)?,
                        created_by: row.get(14)?,
                        is_active: row.get(15)?,
                        total_calls: row.get(16)?,
                        last_called_at: row.get(17)?,
                        source_object: row.get(18)?,
                        schema_config: row.get(19)?,
                        auth_config: row.get(20)?,
                        request_config: row.get(21)?,
                        response_config: row.get(22)?,
                        settings: row.get(23)?,
                    })
                },
            )
            .optional()
            .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let id = row.id.clone();
        let mut d = row.into_descriptor()?;
        d.parameters = load_children(&conn, CHILD_TABLES[0], &id)?;
        d.response_mappings = load_children(&conn, CHILD_TABLES[1], &id)?;
        d.headers = load_children(&conn, CHILD_TABLES[2], &id)?;
        d.tests = load_children(&conn, CHILD_TABLES[3], &id)?;
        d.sort_by_position();
        Ok(Some(d))
    }

    fn record_call(&self, api_code: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE apis SET total_calls = total_calls + 1, last_called_at = ?2 \
                 WHERE api_code = ?1",
                params![api_code, ts(Some(at))],
            )
            .map_err(db_err)?;
        Ok(changed > 0)
    }
}
