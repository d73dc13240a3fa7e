use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl PrimitiveKind {
    /// Single-letter code used in compiled descriptors.
    pub fn code(self) -> char {
        match self {
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Double => 'D',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Boolean => 'Z',
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// Semantic type identifier decoded from a raw descriptor.
///
/// Reference names are kept in dotted form (`java.lang.String`); the
/// descriptor form is recovered on demand by [`TypeId::descriptor`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum TypeId {
    Void,
    Primitive(PrimitiveKind),
    Array(Box<TypeId>),
    Reference(String),
}

impl TypeId {
    pub fn reference(name: impl Into<String>) -> Self {
        TypeId::Reference(name.into().replace('/', "."))
    }

    pub fn array_of(element: TypeId) -> Self {
        TypeId::Array(Box::new(element))
    }

    /// Renders the skeleton-document form of the type.
    ///
    /// References are written as `L` followed by the internal name, without
    /// the trailing `;` the class-file format carries.
    pub fn descriptor(&self) -> String {
        match self {
            TypeId::Void => "V".to_string(),
            TypeId::Primitive(kind) => kind.code().to_string(),
            TypeId::Array(element) => format!("[{}", element.descriptor()),
            TypeId::Reference(name) => format!("L{}", name.replace('.', "/")),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeId::Void)
    }

    /// Number of array dimensions wrapped around the element type.
    pub fn dimensions(&self) -> usize {
        let mut current = self;
        let mut dimensions = 0;
        while let TypeId::Array(inner) = current {
            dimensions += 1;
            current = inner;
        }
        dimensions
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeId::Void => f.write_str("void"),
            TypeId::Primitive(kind) => f.write_str(kind.keyword()),
            TypeId::Array(element) => write!(f, "{element}[]"),
            TypeId::Reference(name) => f.write_str(name),
        }
    }
}

/// Argument types in declaration order plus the return type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodDescriptor {
    pub args: Vec<TypeId>,
    pub ret: TypeId,
}

impl MethodDescriptor {
    pub fn new(args: Vec<TypeId>, ret: TypeId) -> Self {
        Self { args, ret }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for arg in &self.args {
            f.write_str(&arg.descriptor())?;
        }
        write!(f, "){}", self.ret.descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_descriptor_drops_semicolon() {
        let ty = TypeId::reference("java/sql/Timestamp");
        assert_eq!(ty, TypeId::Reference("java.sql.Timestamp".to_string()));
        assert_eq!(ty.descriptor(), "Ljava/sql/Timestamp");
    }

    #[test]
    fn test_nested_array() {
        let ty = TypeId::array_of(TypeId::array_of(TypeId::Primitive(PrimitiveKind::Int)));
        assert_eq!(ty.descriptor(), "[[I");
        assert_eq!(ty.dimensions(), 2);
        assert_eq!(ty.to_string(), "int[][]");
    }

    #[test]
    fn test_method_descriptor_display() {
        let desc = MethodDescriptor::new(
            vec![TypeId::Primitive(PrimitiveKind::Long), TypeId::reference("java.lang.Object")],
            TypeId::Void,
        );
        assert_eq!(desc.to_string(), "(JLjava/lang/Object)V");
    }
}
