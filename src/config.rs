use crate::backend::MemoryBackend;
use crate::schema::{EntitySchema, EnumType, SchemaError, SchemaRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse schema file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse data file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid schema in '{path}': {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },
    #[error("Invalid data file '{path}': {reason}")]
    InvalidData { path: String, reason: String },
}

/// On-disk schema description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaFile {
    #[serde(rename = "enum")]
    pub enums: Vec<EnumSpec>,
    #[serde(rename = "entity")]
    pub entities: Vec<EntitySpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumSpec {
    pub name: String,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Type expression, e.g. `int`, `float?`, `list<Review>`
    #[serde(rename = "type")]
    pub ty: String,
}

impl SchemaFile {
    /// Build a validated registry: enums first, then entities, then
    /// cross-entity references
    pub fn into_registry(self) -> Result<SchemaRegistry, SchemaError> {
        let mut registry = SchemaRegistry::new();

        for spec in self.enums {
            registry.register_enum(EnumType::new(spec.name, spec.variants))?;
        }

        for spec in self.entities {
            let mut schema = EntitySchema::new(spec.name);
            for field in spec.fields {
                let ty = registry.parse_type(&field.ty)?;
                schema = schema.with_field(field.name, ty);
            }
            registry.register(schema)?;
        }

        registry.validate()?;
        Ok(registry)
    }
}

pub fn load_schema(path: &Path) -> Result<SchemaRegistry, ConfigError> {
    let path_display = path.display().to_string();
    let raw = read(path)?;
    parse_schema(&raw, &path_display)
}

/// Parse schema TOML; `origin` labels errors
pub fn parse_schema(raw: &str, origin: &str) -> Result<SchemaRegistry, ConfigError> {
    let file = toml::from_str::<SchemaFile>(raw).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })?;

    file.into_registry().map_err(|source| ConfigError::Schema {
        path: origin.to_string(),
        source,
    })
}

/// Load a JSON object mapping entity names to arrays of documents
pub fn load_data(path: &Path) -> Result<MemoryBackend, ConfigError> {
    let path_display = path.display().to_string();
    let raw = read(path)?;
    parse_data(&raw, &path_display)
}

pub fn parse_data(raw: &str, origin: &str) -> Result<MemoryBackend, ConfigError> {
    let data: Json = serde_json::from_str(raw).map_err(|source| ConfigError::Json {
        path: origin.to_string(),
        source,
    })?;

    let Json::Object(collections) = data else {
        return Err(ConfigError::InvalidData {
            path: origin.to_string(),
            reason: "expected an object of entity name to document array".to_string(),
        });
    };

    let backend = MemoryBackend::new();
    for (entity, docs) in collections {
        let Json::Array(docs) = docs else {
            return Err(ConfigError::InvalidData {
                path: origin.to_string(),
                reason: format!("entry '{}' is not an array", entity),
            });
        };
        tracing::debug!(entity = %entity, documents = docs.len(), "loaded documents");
        backend.extend(&entity, docs);
    }

    Ok(backend)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}
