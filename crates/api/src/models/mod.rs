pub mod metric;
pub mod skeleton;
pub mod types;

pub use metric::{
    IndexReport, MetricScore, MetricSection, MetricSummary, RUN_SCOPE_ID, Score, UnitFailure,
};
pub use skeleton::{Attribute, ClassSkeleton, MethodKey, MethodSkeleton, OpCode, Operation};
pub use types::{MethodDescriptor, PrimitiveKind, TypeId};

/// Name the platform gives to instance constructors.
pub const CONSTRUCTOR_MARKER: &str = "<init>";

/// Name the platform gives to static initializers.
pub const STATIC_INITIALIZER_MARKER: &str = "<clinit>";
