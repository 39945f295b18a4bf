//! # Descriptor Model
//!
//! In-memory representation of one generated API: identity, HTTP binding, schema
//! binding, parameters, response mappings, headers, auth configuration, settings
//! and stored tests.
//!
//! ## Overview
//!
//! A descriptor is built once per generation request from user input (JSON or
//! YAML with camelCase keys) and is the single source for every renderer.
//!
//! - **[`ApiDescriptor`]** - root aggregate, identified by its unique `apiCode`
//! - **[`SchemaConfig`]** - target Oracle object and the bound [`DbOperation`]
//! - **[`AuthConfig`]** - an [`AuthScheme`] tagged union plus an
//!   [`AuthorizationPolicy`] that applies to every scheme
//! - **[`RequestConfig`] / [`ResponseConfig`] / [`SettingsConfig`]** - body shapes,
//!   runtime toggles and the artifact generation switches
//! - **[`Parameter`] / [`ResponseMapping`] / [`Header`]** - ordered collections with
//!   a dense `position`
//!
//! Closed enums replace the free-text operation and auth type fields, so unknown
//! values are rejected while parsing instead of being silently ignored later.

mod auth;
mod descriptor;
mod fields;
mod schema;
mod settings;

pub use auth::*;
pub use descriptor::*;
pub use fields::*;
pub use schema::*;
pub use settings::*;
