use crate::error::DecodeError;
use classpeek_api::{MethodDescriptor, PrimitiveKind, TypeId};
use ristretto_classfile::{BaseType, FieldType};

pub struct DescriptorDecoder;

impl DescriptorDecoder {
    /// Decodes one raw type token such as `I`, `[J`, `Ljava/util/Date;` or
    /// the return-only `V`.
    pub fn decode(raw: &str) -> Result<TypeId, DecodeError> {
        if raw == "V" {
            return Ok(TypeId::Void);
        }
        if raw.is_empty() {
            return Err(malformed(raw, "empty descriptor"));
        }

        // A lone field type parses as the single parameter of a void method.
        let wrapped = format!("({raw})V");
        let (params, _) = FieldType::parse_method_descriptor(&wrapped)
            .map_err(|e| malformed(raw, format!("{e:?}")))?;
        match params.as_slice() {
            [single] => Ok(Self::convert(single)),
            _ => Err(malformed(
                raw,
                format!("expected one type, found {}", params.len()),
            )),
        }
    }

    /// Decodes a full method descriptor, preserving argument order.
    pub fn decode_method(raw: &str) -> Result<MethodDescriptor, DecodeError> {
        if !raw.starts_with('(') {
            return Err(malformed(raw, "method descriptor must start with '('"));
        }
        let (params, ret) = FieldType::parse_method_descriptor(raw)
            .map_err(|e| malformed(raw, format!("{e:?}")))?;

        let args = params.iter().map(Self::convert).collect();
        let ret = match ret {
            None => TypeId::Void,
            Some(field_type) => Self::convert(&field_type),
        };
        Ok(MethodDescriptor::new(args, ret))
    }

    pub fn convert(ty: &FieldType) -> TypeId {
        match ty {
            FieldType::Base(base) => TypeId::Primitive(Self::primitive(base)),
            FieldType::Object(name) => TypeId::reference(name.replace('/', ".")),
            FieldType::Array(component) => TypeId::array_of(Self::convert(component.as_ref())),
        }
    }

    fn primitive(base: &BaseType) -> PrimitiveKind {
        match base {
            BaseType::Byte => PrimitiveKind::Byte,
            BaseType::Char => PrimitiveKind::Char,
            BaseType::Double => PrimitiveKind::Double,
            BaseType::Float => PrimitiveKind::Float,
            BaseType::Int => PrimitiveKind::Int,
            BaseType::Long => PrimitiveKind::Long,
            BaseType::Short => PrimitiveKind::Short,
            BaseType::Boolean => PrimitiveKind::Boolean,
        }
    }
}

fn malformed(raw: &str, reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        descriptor: raw.to_string(),
        reason: reason.into(),
    }
}
