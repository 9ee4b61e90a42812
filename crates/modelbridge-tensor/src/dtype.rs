use crate::TensorError;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Element kinds a tensor can hold.
///
/// The mapping between a kind and its canonical name is a bijection: parsing an unknown
/// name fails with [`TensorError::UnknownDtype`] rather than falling back to a default.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    UInt8,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
    Bool,
}

impl ScalarKind {
    /// Size in bytes of a single element.
    pub const fn width(self) -> usize {
        match self {
            ScalarKind::UInt8 | ScalarKind::Int8 | ScalarKind::Bool => 1,
            ScalarKind::Int16 | ScalarKind::Float16 => 2,
            ScalarKind::Int32 | ScalarKind::Float32 => 4,
            ScalarKind::Int64 | ScalarKind::Float64 => 8,
        }
    }

    /// Canonical external name, e.g. `"float32"`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Scalar-type code used by the inference engine.
    pub const fn code(self) -> i32 {
        match self {
            ScalarKind::UInt8 => 0,
            ScalarKind::Int8 => 1,
            ScalarKind::Int16 => 2,
            ScalarKind::Int32 => 3,
            ScalarKind::Int64 => 4,
            ScalarKind::Float16 => 5,
            ScalarKind::Float32 => 6,
            ScalarKind::Float64 => 7,
            ScalarKind::Bool => 11,
        }
    }

    /// Inverse of [`ScalarKind::code`]. Engine types outside the table (complex, quantized,
    /// bfloat16, bit-packed) are rejected.
    pub fn from_code(code: i32) -> Result<Self, TensorError> {
        Self::iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| TensorError::UnknownDtype(format!("scalar type code {code}")))
    }

    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            ScalarKind::Float16 | ScalarKind::Float32 | ScalarKind::Float64
        )
    }

    pub fn all() -> impl Iterator<Item = ScalarKind> {
        Self::iter()
    }
}

/// Looks up a kind by its canonical name.
pub fn kind_of(name: &str) -> Result<ScalarKind, TensorError> {
    name.parse::<ScalarKind>()
        .map_err(|_| TensorError::UnknownDtype(name.to_string()))
}

pub fn name_of(kind: ScalarKind) -> &'static str {
    kind.name()
}

pub fn width_of(kind: ScalarKind) -> usize {
    kind.width()
}
