use super::synthetic::{self, Origin};
use crate::decode::{DescriptorDecoder, SymbolResolver};
use crate::error::BuildError;
use classpeek_api::{Attribute, ClassSkeleton, MethodSkeleton, OpCode, Operation};
use ristretto_classfile::attributes::{Attribute as ClassAttribute, Instruction};
use ristretto_classfile::{ClassFile, FieldAccessFlags, MethodAccessFlags};
use std::collections::HashSet;
use std::io::Cursor;
use tracing::{debug, warn};

/// Target recorded for an instruction whose constant-pool reference cannot
/// be resolved.
pub const UNRESOLVED_TARGET: &str = "?";

pub struct SkeletonBuilder;

impl SkeletonBuilder {
    /// Parses raw class-file bytes and builds their skeleton. Failures are
    /// labelled with `unit`, usually the file path.
    pub fn build_unit(unit: &str, bytes: Vec<u8>) -> Result<ClassSkeleton, BuildError> {
        let class = ClassFile::from_bytes(&mut Cursor::new(bytes)).map_err(|e| {
            BuildError::MalformedUnit {
                unit: unit.to_string(),
                reason: format!("{e:?}"),
            }
        })?;

        Self::build(&class).map_err(|err| match err {
            BuildError::MalformedUnit { reason, .. } => BuildError::MalformedUnit {
                unit: unit.to_string(),
                reason,
            },
            fatal => fatal,
        })
    }

    pub fn build(class: &ClassFile) -> Result<ClassSkeleton, BuildError> {
        let resolver = SymbolResolver::new(&class.constant_pool);
        let id = resolver
            .class_name(class.this_class)
            .map_err(|e| malformed("<unknown>", format!("this_class: {e}")))?;

        let attributes = Self::attributes(&id, class, &resolver)?;

        let mut candidates = Vec::with_capacity(class.methods.len());
        let mut keys = HashSet::with_capacity(class.methods.len());
        for method in &class.methods {
            let name = resolver
                .utf8(method.name_index)
                .map_err(|e| malformed(&id, format!("method name: {e}")))?;
            let raw_descriptor = resolver
                .utf8(method.descriptor_index)
                .map_err(|e| malformed(&id, format!("descriptor of {name}: {e}")))?;
            if !keys.insert((name.clone(), raw_descriptor.clone())) {
                return Err(malformed(
                    &id,
                    format!("method {name}{raw_descriptor} declared twice"),
                ));
            }
            let origin = synthetic::origin(
                &name,
                method.access_flags.contains(MethodAccessFlags::SYNTHETIC),
                method.access_flags.contains(MethodAccessFlags::BRIDGE),
            );
            candidates.push((name, raw_descriptor, origin, method));
        }

        let shape: Vec<(&str, Origin)> = candidates
            .iter()
            .map(|(name, _, origin, _)| (name.as_str(), *origin))
            .collect();
        let retained = synthetic::collapse(&shape);
        debug!(
            "{}: {} method bodies, {} retained",
            id,
            candidates.len(),
            retained.len()
        );

        let mut methods = Vec::with_capacity(retained.len());
        for index in retained {
            let (name, raw_descriptor, origin, method) = &candidates[index];
            let descriptor = DescriptorDecoder::decode_method(raw_descriptor)
                .map_err(|e| malformed(&id, e.to_string()))?;
            let is_public = method.access_flags.contains(MethodAccessFlags::PUBLIC);
            let ops = Self::operations(&id, name, &method.attributes, &resolver);
            methods.push(
                MethodSkeleton::new(name.clone(), descriptor, is_public, ops)
                    .synthetic(*origin != Origin::Declared),
            );
        }

        // Duplicate keys were rejected above, so a failure here is ours.
        ClassSkeleton::new(id.clone(), attributes, methods).map_err(|e| {
            BuildError::InternalInvariant {
                class: id,
                reason: e.to_string(),
            }
        })
    }

    fn attributes(
        id: &str,
        class: &ClassFile,
        resolver: &SymbolResolver<'_>,
    ) -> Result<Vec<Attribute>, BuildError> {
        let mut seen = HashSet::new();
        let mut attributes = Vec::with_capacity(class.fields.len());
        for field in &class.fields {
            if field.access_flags.contains(FieldAccessFlags::SYNTHETIC) {
                continue;
            }
            let name = resolver
                .utf8(field.name_index)
                .map_err(|e| malformed(id, format!("field name: {e}")))?;
            // Same name with another type is legal bytecode; keep the first.
            if !seen.insert(name.clone()) {
                continue;
            }
            attributes.push(Attribute {
                name,
                type_id: DescriptorDecoder::convert(&field.field_type),
                is_public: field.access_flags.contains(FieldAccessFlags::PUBLIC),
                is_static: field.access_flags.contains(FieldAccessFlags::STATIC),
            });
        }
        Ok(attributes)
    }

    /// Projects the instruction stream onto symbol-referencing instructions,
    /// in program order.
    fn operations(
        id: &str,
        method_name: &str,
        attributes: &[ClassAttribute],
        resolver: &SymbolResolver<'_>,
    ) -> Vec<Operation> {
        let mut ops = Vec::new();
        for attribute in attributes {
            if let ClassAttribute::Code { code, .. } = attribute {
                for instruction in code {
                    if let Some(op) = Self::operation(id, method_name, instruction, resolver) {
                        ops.push(op);
                    }
                }
            }
        }
        ops
    }

    fn operation(
        id: &str,
        method_name: &str,
        instruction: &Instruction,
        resolver: &SymbolResolver<'_>,
    ) -> Option<Operation> {
        // The receiver of an instance field access is not known locally,
        // so those targets stay bare.
        let (code, index, qualified) = match instruction {
            Instruction::Putstatic(index) => (OpCode::PutStatic, *index, true),
            Instruction::Putfield(index) => (OpCode::PutStatic, *index, false),
            Instruction::Getstatic(index) => (OpCode::Get, *index, true),
            Instruction::Getfield(index) => (OpCode::Get, *index, false),
            Instruction::Invokevirtual(index)
            | Instruction::Invokespecial(index)
            | Instruction::Invokestatic(index)
            | Instruction::Invokedynamic(index) => (OpCode::Call, *index, true),
            Instruction::Invokeinterface(index, _) => (OpCode::Call, *index, true),
            _ => return None,
        };

        let target = match resolver.resolve(index) {
            Ok(symbol) if qualified => symbol.qualified(),
            Ok(symbol) => symbol.member,
            Err(e) => {
                warn!("{}.{}: {} ({} kept as placeholder)", id, method_name, e, code);
                UNRESOLVED_TARGET.to_string()
            }
        };
        Some(Operation::new(code, target))
    }
}

fn malformed(unit: &str, reason: impl Into<String>) -> BuildError {
    BuildError::MalformedUnit {
        unit: unit.to_string(),
        reason: reason.into(),
    }
}
