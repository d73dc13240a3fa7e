use crate::error::SymbolError;
use ristretto_classfile::{Constant, ConstantPool};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Field,
    Method,
    /// Call site of `invokedynamic`; the pool carries no owner for it.
    Dynamic,
}

/// `Owner.member` as named by a constant-pool reference.
///
/// Whether `owner` is the unit being analyzed or another one is left open:
/// the name is taken verbatim from the pool entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedSymbol {
    pub kind: SymbolKind,
    pub owner: Option<String>,
    pub member: String,
    pub descriptor: String,
}

impl QualifiedSymbol {
    pub fn qualified(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{owner}.{}", self.member),
            None => self.member.clone(),
        }
    }
}

impl fmt::Display for QualifiedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// Converts an internal class name (`java/lang/String`) to dotted form.
pub fn dotted(internal: &str) -> String {
    internal.replace('/', ".")
}

pub struct SymbolResolver<'a> {
    pool: &'a ConstantPool,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(pool: &'a ConstantPool) -> Self {
        Self { pool }
    }

    /// Resolves a field, method, interface-method or invokedynamic
    /// reference into its qualified symbol.
    pub fn resolve(&self, index: u16) -> Result<QualifiedSymbol, SymbolError> {
        let (kind, class_index, name_and_type_index) = match self.pool.get(index) {
            Some(Constant::FieldRef {
                class_index,
                name_and_type_index,
            }) => (SymbolKind::Field, Some(*class_index), *name_and_type_index),
            Some(Constant::MethodRef {
                class_index,
                name_and_type_index,
            })
            | Some(Constant::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            }) => (SymbolKind::Method, Some(*class_index), *name_and_type_index),
            Some(Constant::InvokeDynamic {
                name_and_type_index,
                ..
            }) => (SymbolKind::Dynamic, None, *name_and_type_index),
            Some(other) => {
                return Err(unresolved(index, format!("not a member reference: {other:?}")));
            }
            None => return Err(unresolved(index, "index out of range")),
        };

        let owner = match class_index {
            Some(class_index) => Some(self.class_name(class_index)?),
            None => None,
        };
        let (member, descriptor) = self.name_and_type(name_and_type_index)?;

        Ok(QualifiedSymbol {
            kind,
            owner,
            member,
            descriptor,
        })
    }

    /// Dotted name of a `Class` constant.
    pub fn class_name(&self, index: u16) -> Result<String, SymbolError> {
        match self.pool.get(index) {
            Some(Constant::Class(name_index)) => Ok(dotted(&self.utf8(*name_index)?)),
            Some(other) => Err(unresolved(index, format!("not a class: {other:?}"))),
            None => Err(unresolved(index, "index out of range")),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<String, SymbolError> {
        let value: &str = self
            .pool
            .try_get_utf8(index)
            .map_err(|e| unresolved(index, format!("{e:?}")))?;
        Ok(value.to_string())
    }

    fn name_and_type(&self, index: u16) -> Result<(String, String), SymbolError> {
        match self.pool.get(index) {
            Some(Constant::NameAndType {
                name_index,
                descriptor_index,
            }) => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            Some(other) => Err(unresolved(index, format!("not a name-and-type: {other:?}"))),
            None => Err(unresolved(index, "index out of range")),
        }
    }
}

fn unresolved(index: u16, reason: impl Into<String>) -> SymbolError {
    SymbolError::Unresolved {
        index,
        reason: reason.into(),
    }
}
