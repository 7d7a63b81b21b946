use crate::error::ShapeError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    String,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Boolean => f.write_str("Boolean"),
            ScalarType::String => f.write_str("String"),
        }
    }
}

/// Structural type inferred from a sample value
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    Scalar(ScalarType),
    List(Box<SchemaType>),
    Object(ObjectType),
}

impl SchemaType {
    /// The object type a field ultimately yields, looking through lists
    pub fn named_object(&self) -> Option<&ObjectType> {
        match self {
            SchemaType::Object(obj) => Some(obj),
            SchemaType::List(inner) => inner.named_object(),
            SchemaType::Scalar(_) => None,
        }
    }

    /// Whether selecting this type requires a sub-selection
    pub fn is_composite(&self) -> bool {
        self.named_object().is_some()
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Scalar(s) => write!(f, "{s}"),
            SchemaType::List(inner) => write!(f, "[{inner}]"),
            SchemaType::Object(obj) => f.write_str(&obj.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: SchemaType,
    /// Filter arguments, one per scalar field of a list-of-object element
    pub args: Vec<ArgumentDef>,
}

impl FieldDef {
    pub fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.args.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDef {
    pub name: String,
    pub ty: ScalarType,
}

/// An inferred schema: the query root plus any type-name collisions noticed
/// while naming its object types.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub query: ObjectType,
    pub collisions: Vec<ShapeError>,
}

impl Schema {
    /// Every object type reachable from the root, first occurrence of each
    /// name only, in definition order.
    pub fn object_types(&self) -> Vec<&ObjectType> {
        let mut out: Vec<&ObjectType> = Vec::new();
        collect(&self.query, &mut out);
        out
    }
}

fn collect<'a>(obj: &'a ObjectType, out: &mut Vec<&'a ObjectType>) {
    if out.iter().any(|seen| seen.name == obj.name) {
        return;
    }
    out.push(obj);
    for field in &obj.fields {
        if let Some(child) = field.ty.named_object() {
            collect(child, out);
        }
    }
}
