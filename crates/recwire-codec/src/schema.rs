use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Registry key identifying how a field is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// Length-prefixed raw bytes.
    Bytes,
    /// 8-byte little-endian unsigned integer.
    UInt,
    /// 8-byte little-endian signed integer.
    Int,
    /// IEEE-754 double.
    F64,
    /// IEEE-754 single.
    F32,
    /// Single byte, nonzero is true.
    Bool,
    /// Length-prefixed UTF-8.
    Text,
    /// Caller-defined type with an explicitly registered serializer.
    Named(Cow<'static, str>),
}

impl TypeTag {
    /// Tags with serializers provided out of the box.
    pub const BUILTINS: [TypeTag; 7] = [
        TypeTag::Bytes,
        TypeTag::UInt,
        TypeTag::Int,
        TypeTag::F64,
        TypeTag::F32,
        TypeTag::Bool,
        TypeTag::Text,
    ];

    /// Tag for a caller-defined type.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        TypeTag::Named(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Bytes => "bytes",
            TypeTag::UInt => "u64",
            TypeTag::Int => "i64",
            TypeTag::F64 => "f64",
            TypeTag::F32 => "f32",
            TypeTag::Bool => "bool",
            TypeTag::Text => "text",
            TypeTag::Named(name) => name,
        }
    }

    /// Returns true for the built-in primitive tags.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, TypeTag::Named(_))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = std::convert::Infallible;

    /// Parses the primitive names (`bytes`, `u64`, `i64`, `f64`, `f32`,
    /// `bool`, `text` and a few aliases). Anything else becomes
    /// [`TypeTag::Named`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.trim() {
            "bytes" => TypeTag::Bytes,
            "u64" | "uint" => TypeTag::UInt,
            "i64" | "int" => TypeTag::Int,
            "f64" | "float" => TypeTag::F64,
            "f32" => TypeTag::F32,
            "bool" => TypeTag::Bool,
            "text" | "str" | "string" => TypeTag::Text,
            other => TypeTag::Named(Cow::Owned(other.to_string())),
        };
        Ok(tag)
    }
}

/// One named, typed slot of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Cow<'static, str>,
    pub tag: TypeTag,
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }
}

/// Ordered field layout of a record type. Field order is wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: Cow<'static, str>,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<Cow<'static, str>>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Start declaring a schema field by field.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Schema with positional field names (`field0`, `field1`, ...).
    pub fn from_tags(
        name: impl Into<Cow<'static, str>>,
        tags: impl IntoIterator<Item = TypeTag>,
    ) -> Self {
        let fields = tags
            .into_iter()
            .enumerate()
            .map(|(i, tag)| Field::new(format!("field{i}"), tag))
            .collect();
        Self::new(name, fields)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.fields.iter().map(|field| &field.tag)
    }
}

/// Builder returned by [`Schema::builder`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: Cow<'static, str>,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<Cow<'static, str>>, tag: TypeTag) -> Self {
        self.fields.push(Field::new(name, tag));
        self
    }

    pub fn build(self) -> Schema {
        Schema::new(self.name, self.fields)
    }
}
