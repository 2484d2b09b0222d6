//! Entity schema metadata
//!
//! The filter pipeline never inspects live entities to learn their shape.
//! Every entity type registers a field table (name, declared type) with a
//! [`SchemaProvider`], and path/sort resolution walks those tables.

mod entities;

pub use entities::*;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Entity '{0}' is registered more than once")]
    DuplicateEntity(String),

    #[error("Enum '{0}' is declared more than once")]
    DuplicateEnum(String),

    #[error("Enum '{0}' has no variants")]
    EmptyEnum(String),

    #[error("Field '{field}' is declared more than once on entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    #[error("Field '{field}' on entity '{entity}' refers to unknown type '{type_name}'")]
    UnknownType {
        entity: String,
        field: String,
        type_name: String,
    },

    #[error("Invalid type expression: '{0}'")]
    InvalidType(String),
}

/// Supplies field metadata per entity type
pub trait SchemaProvider {
    /// Case-insensitive lookup by entity name
    fn entity(&self, name: &str) -> Option<&EntitySchema>;

    /// Field table exposed by a declared type, if it is an object reference
    fn fields_of(&self, ty: &FieldType) -> Option<&EntitySchema> {
        ty.object_name().and_then(|name| self.entity(name))
    }
}

impl<T: SchemaProvider + ?Sized> SchemaProvider for Arc<T> {
    fn entity(&self, name: &str) -> Option<&EntitySchema> {
        (**self).entity(name)
    }
}

impl<T: SchemaProvider + ?Sized> SchemaProvider for &T {
    fn entity(&self, name: &str) -> Option<&EntitySchema> {
        (**self).entity(name)
    }
}

/// In-process schema provider, populated at startup
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, EntitySchema>,
    enums: BTreeMap<String, EnumType>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: EntitySchema) -> Result<(), SchemaError> {
        let key = schema.name.to_lowercase();
        if self.entities.contains_key(&key) {
            return Err(SchemaError::DuplicateEntity(schema.name));
        }

        for (idx, field) in schema.fields.iter().enumerate() {
            if schema.fields[..idx]
                .iter()
                .any(|prev| prev.name.eq_ignore_ascii_case(&field.name))
            {
                return Err(SchemaError::DuplicateField {
                    entity: schema.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        tracing::debug!(entity = %schema.name, fields = schema.fields.len(), "registered entity");
        self.entities.insert(key, schema);
        Ok(())
    }

    pub fn with_entity(mut self, schema: EntitySchema) -> Result<Self, SchemaError> {
        self.register(schema)?;
        Ok(self)
    }

    pub fn register_enum(&mut self, enum_type: EnumType) -> Result<(), SchemaError> {
        if enum_type.variants.is_empty() {
            return Err(SchemaError::EmptyEnum(enum_type.name));
        }
        let key = enum_type.name.to_lowercase();
        if self.enums.contains_key(&key) {
            return Err(SchemaError::DuplicateEnum(enum_type.name));
        }
        self.enums.insert(key, enum_type);
        Ok(())
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(&name.to_lowercase())
    }

    /// Registered entities, sorted by name
    pub fn entities(&self) -> Vec<&EntitySchema> {
        let mut entities: Vec<_> = self.entities.values().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        entities
    }

    /// Check that every object reference points at a registered entity
    pub fn validate(&self) -> Result<(), SchemaError> {
        for schema in self.entities() {
            for field in &schema.fields {
                let mut ty = &field.ty;
                while let Some(element) = ty.element_type() {
                    ty = element.unwrap_nullable();
                }
                if let Some(name) = ty.object_name()
                    && self.entity(name).is_none()
                {
                    return Err(SchemaError::UnknownType {
                        entity: schema.name.clone(),
                        field: field.name.clone(),
                        type_name: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse a type expression such as `int`, `float?`, `list<Review>` or
    /// an enum/entity name. Enum names take precedence over entity names.
    pub fn parse_type(&self, expr: &str) -> Result<FieldType, SchemaError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(SchemaError::InvalidType(expr.to_string()));
        }

        if let Some(inner) = expr.strip_suffix('?') {
            return Ok(FieldType::nullable(self.parse_type(inner)?));
        }

        if expr.ends_with('>')
            && expr
                .get(..5)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("list<"))
        {
            let inner = expr
                .get(5..expr.len() - 1)
                .ok_or_else(|| SchemaError::InvalidType(expr.to_string()))?;
            return Ok(FieldType::list(self.parse_type(inner)?));
        }

        let ty = match expr.to_lowercase().as_str() {
            "string" => FieldType::String,
            "int" => FieldType::Int,
            "float" => FieldType::Float,
            "bool" => FieldType::Bool,
            "datetime" => FieldType::DateTime,
            "date" => FieldType::Date,
            _ => {
                if !expr.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(SchemaError::InvalidType(expr.to_string()));
                }
                match self.enum_type(expr) {
                    Some(enum_type) => FieldType::Enum(enum_type.clone()),
                    None => FieldType::object(expr),
                }
            }
        };
        Ok(ty)
    }
}

impl SchemaProvider for SchemaRegistry {
    fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.get(&name.to_lowercase())
    }
}
