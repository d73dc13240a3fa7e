use super::types::{MethodDescriptor, TypeId};
use super::{CONSTRUCTOR_MARKER, STATIC_INITIALIZER_MARKER};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Category of a symbol-referencing instruction.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpCode {
    /// Any field store. Static stores carry a qualified target, instance
    /// stores a bare member name.
    #[serde(rename = "put_static")]
    PutStatic,
    #[serde(rename = "get")]
    Get,
    #[serde(rename = "call")]
    Call,
}

impl OpCode {
    pub const ALL: [OpCode; 3] = [OpCode::PutStatic, OpCode::Get, OpCode::Call];

    pub fn as_str(self) -> &'static str {
        match self {
            OpCode::PutStatic => "put_static",
            OpCode::Get => "get",
            OpCode::Call => "call",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == code)
    }

    pub fn is_field_access(self) -> bool {
        matches!(self, OpCode::PutStatic | OpCode::Get)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub code: OpCode,
    pub target: String,
}

impl Operation {
    pub fn new(code: OpCode, target: impl Into<String>) -> Self {
        Self {
            code,
            target: target.into(),
        }
    }

    /// Splits a qualified target into `(owner, member)`. Bare targets have
    /// no owner.
    pub fn split_target(&self) -> (Option<&str>, &str) {
        match self.target.rsplit_once('.') {
            Some((owner, member)) => (Some(owner), member),
            None => (None, self.target.as_str()),
        }
    }
}

/// A declared field of the unit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub type_id: TypeId,
    pub is_public: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey<'a> {
    pub name: &'a str,
    pub descriptor: &'a MethodDescriptor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSkeleton {
    name: String,
    descriptor: MethodDescriptor,
    is_constructor: bool,
    is_public: bool,
    #[serde(default)]
    is_synthetic: bool,
    ops: Vec<Operation>,
}

impl MethodSkeleton {
    pub fn new(
        name: impl Into<String>,
        descriptor: MethodDescriptor,
        is_public: bool,
        ops: Vec<Operation>,
    ) -> Self {
        let name = name.into();
        Self {
            is_constructor: name == CONSTRUCTOR_MARKER,
            name,
            descriptor,
            is_public,
            is_synthetic: false,
            ops,
        }
    }

    /// Marks a compiler-generated body that no declared method absorbed.
    pub fn synthetic(mut self, is_synthetic: bool) -> Self {
        self.is_synthetic = is_synthetic;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    pub fn args(&self) -> &[TypeId] {
        &self.descriptor.args
    }

    pub fn return_type(&self) -> &TypeId {
        &self.descriptor.ret
    }

    pub fn is_constructor(&self) -> bool {
        self.is_constructor
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_MARKER
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn key(&self) -> MethodKey<'_> {
        MethodKey {
            name: &self.name,
            descriptor: &self.descriptor,
        }
    }
}

/// Structured view of one compiled unit. Immutable once built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSkeleton {
    id: String,
    attributes: Vec<Attribute>,
    methods: Vec<MethodSkeleton>,
}

impl ClassSkeleton {
    /// Assembles a skeleton, rejecting duplicate `(name, descriptor)` method
    /// keys and duplicate attribute names.
    pub fn new(
        id: impl Into<String>,
        attributes: Vec<Attribute>,
        methods: Vec<MethodSkeleton>,
    ) -> ModelResult<Self> {
        let id = id.into();

        let mut seen = HashSet::with_capacity(methods.len());
        for method in &methods {
            if !seen.insert(method.key()) {
                return Err(ModelError::DuplicateMethod {
                    class: id,
                    name: method.name.clone(),
                    descriptor: method.descriptor.to_string(),
                });
            }
        }

        let mut names = HashSet::with_capacity(attributes.len());
        for attr in &attributes {
            if !names.insert(attr.name.as_str()) {
                return Err(ModelError::DuplicateAttribute {
                    class: id,
                    name: attr.name.clone(),
                });
            }
        }

        Ok(Self {
            id,
            attributes,
            methods,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dotted package prefix; empty for the default package.
    pub fn package(&self) -> &str {
        self.id.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
    }

    pub fn simple_name(&self) -> &str {
        self.id.rsplit_once('.').map(|(_, name)| name).unwrap_or(&self.id)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn methods(&self) -> &[MethodSkeleton] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodSkeleton> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::PrimitiveKind;

    fn void() -> MethodDescriptor {
        MethodDescriptor::new(vec![], TypeId::Void)
    }

    #[test]
    fn test_constructor_flag_follows_name() {
        let ctor = MethodSkeleton::new(
            "<init>",
            MethodDescriptor::new(
                vec![TypeId::Primitive(PrimitiveKind::Int); 3],
                TypeId::Void,
            ),
            false,
            vec![],
        );
        assert!(ctor.is_constructor());
        assert!(!MethodSkeleton::new("init", void(), true, vec![]).is_constructor());
    }

    #[test]
    fn test_duplicate_method_key_rejected() {
        let methods = vec![
            MethodSkeleton::new("run", void(), true, vec![]),
            MethodSkeleton::new("run", void(), false, vec![]),
        ];
        let err = ClassSkeleton::new("a.B", vec![], methods).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateMethod { .. }));
    }

    #[test]
    fn test_overloads_are_distinct_keys() {
        let methods = vec![
            MethodSkeleton::new("run", void(), true, vec![]),
            MethodSkeleton::new(
                "run",
                MethodDescriptor::new(vec![TypeId::Primitive(PrimitiveKind::Int)], TypeId::Void),
                true,
                vec![],
            ),
        ];
        let class = ClassSkeleton::new("a.B", vec![], methods).unwrap();
        assert_eq!(class.methods().len(), 2);
        assert_eq!(class.package(), "a");
        assert_eq!(class.simple_name(), "B");
    }

    #[test]
    fn test_split_target() {
        let op = Operation::new(OpCode::Call, "java.lang.String.length");
        assert_eq!(op.split_target(), (Some("java.lang.String"), "length"));
        let bare = Operation::new(OpCode::Get, "key");
        assert_eq!(bare.split_target(), (None, "key"));
    }

    #[test]
    fn test_op_code_round_trip_names() {
        for code in OpCode::ALL {
            assert_eq!(OpCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(OpCode::parse("put"), None);
        assert_eq!(
            serde_json::to_string(&OpCode::PutStatic).unwrap(),
            "\"put_static\""
        );
    }
}
