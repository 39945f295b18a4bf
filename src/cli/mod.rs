//! # CLI Module
//!
//! Command-line interface for the apiforge generator and its execution simulator.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Lint, persist and generate all enabled artifacts for a descriptor, writing them
//! to the output directory:
//!
//! ```bash
//! apiforge generate --descriptor get_emp.json --out generated
//! ```
//!
//! Files are named `<CODE>_pkg.sql`, `<CODE>.openapi.json` and
//! `<CODE>.postman_collection.json`. A JSON summary with the persisted id and
//! artifact digests is printed to stdout.
//!
//! ### `render`
//!
//! Render one artifact to stdout without touching the store:
//!
//! ```bash
//! apiforge render --descriptor get_emp.yaml --kind openapi
//! ```
//!
//! ### `show`
//!
//! Render one artifact for a stored API:
//!
//! ```bash
//! apiforge show --code GET_EMP --kind postman
//! ```
//!
//! ### `lint`
//!
//! ```bash
//! apiforge lint --descriptor get_emp.json
//! ```
//!
//! Exits non-zero when any error is reported.
//!
//! ### `execute`
//!
//! ```bash
//! apiforge execute --code GET_EMP --param id=7 --header X-API-Key=k --client ci
//! ```
//!
//! ## Global Options
//!
//! - `--config <FILE>` - YAML or TOML configuration (also `APIFORGE_CONFIG`)

mod commands;


pub use commands::{load_descriptor, open_repository, run_cli, Cli, Commands};
