//! Leaf decoders over a parsed class file: raw descriptors into
//! [`classpeek_api::TypeId`]s and constant-pool references into qualified
//! symbols.

pub mod descriptor;
pub mod symbol;

pub use descriptor::DescriptorDecoder;
pub use symbol::{QualifiedSymbol, SymbolKind, SymbolResolver, dotted};
