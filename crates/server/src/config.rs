//! # Application Configuration
//!
//! This module defines the configuration structure for the `nl2sql-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables.
//!
//! Sources are layered, lowest priority first:
//! 1. Programmatic defaults.
//! 2. `config.yml` in the working directory, or an explicit path.
//! 3. `NL2SQL_`-prefixed environment variables (e.g. `NL2SQL_TOP_K`).
//! 4. Bare environment variables (e.g. `TOP_K`).

use config::{
    builder::{ConfigBuilder, DefaultState},
    Config, Environment, File, FileFormat,
};
use nl2sql::{providers::vector::PineconeConfig, ScopingTemplate};
use serde::Deserialize;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// A required key was absent or empty. Holds the environment variable name.
    Missing(String),
    /// Indicates an error from the underlying `config` crate.
    General(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing required configuration: {key}"),
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Default values for every optional key.
const DEFAULTS: &[(&str, &str)] = &[
    ("port", "8000"),
    ("openai_api_base", "https://api.openai.com/v1"),
    ("openai_model", "gpt-4.1-mini"),
    ("openai_embed_model", "text-embedding-3-small"),
    ("pinecone_controller_url", "https://api.pinecone.io"),
    ("pinecone_index", "nl2sql-schema-index"),
    ("pinecone_cloud", "aws"),
    ("pinecone_region", "us-east-1"),
    ("pinecone_namespace", "default"),
    ("schema_sql_path", "maindata.sql"),
    ("top_k", "8"),
    ("embed_dimension", "1536"),
    ("upsert_batch_size", "32"),
    ("temperature", "0.2"),
    ("sql_dialect", "MySQL"),
    ("primary_table", "patient"),
    ("primary_alias", "p"),
    ("primary_key", "id"),
    ("roster_table", "roster_patient"),
    ("roster_alias", "rp"),
    ("roster_fk_column", "patient_id"),
    ("roster_id_column", "roster_id"),
    ("soft_delete_column", "is_deleted"),
    ("active_column", "is_active"),
    ("tenant_column", "client_id"),
];

/// The resolved server configuration. Keys map to upper-case environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT`.
    pub port: u16,

    // --- Chat and embeddings ---
    #[serde(default)]
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub openai_model: String,
    pub openai_embed_model: String,
    pub temperature: f32,

    // --- Vector index ---
    #[serde(default)]
    pub pinecone_api_key: String,
    pub pinecone_controller_url: String,
    pub pinecone_index: String,
    pub pinecone_cloud: String,
    pub pinecone_region: String,
    pub pinecone_namespace: String,
    pub embed_dimension: usize,
    pub upsert_batch_size: usize,

    // --- Schema and retrieval ---
    /// Path of the DDL dump read at startup.
    pub schema_sql_path: String,
    pub top_k: usize,

    // --- Prompt scoping ---
    pub sql_dialect: String,
    pub primary_table: String,
    pub primary_alias: String,
    pub primary_key: String,
    pub roster_table: String,
    pub roster_alias: String,
    pub roster_fk_column: String,
    pub roster_id_column: String,
    pub soft_delete_column: String,
    pub active_column: String,
    pub tenant_column: String,
}

impl AppConfig {
    /// Builds a configuration from the defaults and a YAML document only,
    /// without consulting the environment.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings = defaults_builder()?
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;
        resolve(settings)
    }

    /// The scoping names used by the prompt assembler.
    pub fn scoping_template(&self) -> ScopingTemplate {
        ScopingTemplate {
            dialect: self.sql_dialect.clone(),
            primary_table: self.primary_table.clone(),
            primary_alias: self.primary_alias.clone(),
            primary_key: self.primary_key.clone(),
            roster_table: self.roster_table.clone(),
            roster_alias: self.roster_alias.clone(),
            roster_fk_column: self.roster_fk_column.clone(),
            roster_id_column: self.roster_id_column.clone(),
            soft_delete_column: self.soft_delete_column.clone(),
            active_column: self.active_column.clone(),
            tenant_column: self.tenant_column.clone(),
        }
    }

    pub fn pinecone_config(&self) -> PineconeConfig {
        PineconeConfig {
            api_key: self.pinecone_api_key.clone(),
            controller_url: self.pinecone_controller_url.clone(),
            index_name: self.pinecone_index.clone(),
            namespace: self.pinecone_namespace.clone(),
            cloud: self.pinecone_cloud.clone(),
            region: self.pinecone_region.clone(),
            dimension: self.embed_dimension,
        }
    }
}

fn defaults_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = Config::builder();
    for (key, value) in DEFAULTS {
        builder = builder.set_default(*key, *value)?;
    }
    Ok(builder)
}

fn resolve(settings: Config) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = settings.try_deserialize()?;
    if config.openai_api_key.trim().is_empty() {
        return Err(ConfigError::Missing("OPENAI_API_KEY".to_string()));
    }
    if config.pinecone_api_key.trim().is_empty() {
        return Err(ConfigError::Missing("PINECONE_API_KEY".to_string()));
    }
    if config.top_k == 0 {
        return Err(ConfigError::General("TOP_K must be at least 1".to_string()));
    }
    Ok(config)
}

/// Loads the application configuration from a file and environment variables.
///
/// With `config_path_override` the file must exist; otherwise `config.yml` in
/// the working directory is used when present.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = defaults_builder()?;

    builder = match config_path_override {
        Some(path) => {
            info!("Loading configuration from '{path}'.");
            builder.add_source(File::new(path, FileFormat::Yaml).required(true))
        }
        None => builder.add_source(File::new("config.yml", FileFormat::Yaml).required(false)),
    };

    let settings = builder
        .add_source(Environment::with_prefix("NL2SQL").prefix_separator("_"))
        .add_source(Environment::default())
        .build()?;

    resolve(settings)
}
