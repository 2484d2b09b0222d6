use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of an entity field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    DateTime,
    Date,
    /// Named symbol set, ordered by declaration index
    Enum(EnumType),
    Nullable(Box<FieldType>),
    /// Collection-valued field
    List(Box<FieldType>),
    /// Reference to another registered entity type by name
    Object(String),
}

impl FieldType {
    pub fn nullable(inner: FieldType) -> Self {
        FieldType::Nullable(Box::new(inner))
    }

    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    pub fn object(name: impl Into<String>) -> Self {
        FieldType::Object(name.into())
    }

    /// Strip any nullable wrapping
    pub fn unwrap_nullable(&self) -> &FieldType {
        match self {
            FieldType::Nullable(inner) => inner.unwrap_nullable(),
            other => other,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String)
    }

    /// A non-textual enumerable type
    pub fn is_collection(&self) -> bool {
        matches!(self.unwrap_nullable(), FieldType::List(_))
    }

    pub fn element_type(&self) -> Option<&FieldType> {
        match self.unwrap_nullable() {
            FieldType::List(element) => Some(element),
            _ => None,
        }
    }

    /// Name of the entity type whose fields this type exposes, if any
    pub fn object_name(&self) -> Option<&str> {
        match self.unwrap_nullable() {
            FieldType::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Neither a collection nor an object reference
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self.unwrap_nullable(),
            FieldType::List(_) | FieldType::Object(_)
        )
    }

    /// Whether values of this type can be ranged over
    pub fn is_ordered(&self) -> bool {
        matches!(
            self.unwrap_nullable(),
            FieldType::String
                | FieldType::Int
                | FieldType::Float
                | FieldType::DateTime
                | FieldType::Date
                | FieldType::Enum(_)
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Date => write!(f, "date"),
            FieldType::Enum(enum_type) => write!(f, "{}", enum_type.name),
            FieldType::Nullable(inner) => write!(f, "{}?", inner),
            FieldType::List(element) => write!(f, "list<{}>", element),
            FieldType::Object(name) => write!(f, "{}", name),
        }
    }
}

/// An enumerated type: a name plus its symbols in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive symbol lookup, returning the ordinal
    pub fn lookup(&self, symbol: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|v| v.eq_ignore_ascii_case(symbol))
    }

}

/// Metadata for a single field of an entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Field table of one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Case-insensitive exact name match
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}
