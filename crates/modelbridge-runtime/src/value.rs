use modelbridge_tensor::{BufferLease, ScalarKind, TensorBytes};
use serde::{Deserialize, Serialize};

/// The engine's value tags, with their wire codes.
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
    strum::FromRepr,
)]
#[repr(u32)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tag {
    None = 0,
    Tensor = 1,
    String = 2,
    Double = 3,
    Int = 4,
    Bool = 5,
    ListBool = 6,
    ListDouble = 7,
    ListInt = 8,
    ListTensor = 9,
    ListScalar = 10,
    ListOptionalTensor = 11,
}

impl Tag {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_repr(code)
    }
}

/// Bytes of an engine tensor value.
#[derive(Debug, Clone)]
pub enum TensorData {
    /// Read-only lease on a host view's buffer.
    Lent(BufferLease),
    /// Bytes owned by the value itself, typically an engine output.
    Owned(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct TensorValue {
    pub kind: ScalarKind,
    pub shape: Vec<usize>,
    pub data: TensorData,
}

impl TensorValue {
    pub fn owned(kind: ScalarKind, shape: Vec<usize>, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            shape,
            data: TensorData::Owned(bytes),
        }
    }

    pub fn lent(kind: ScalarKind, shape: Vec<usize>, lease: BufferLease) -> Self {
        Self {
            kind,
            shape,
            data: TensorData::Lent(lease),
        }
    }

    pub fn is_lent(&self) -> bool {
        matches!(self.data, TensorData::Lent(_))
    }

    pub fn byte_len(&self) -> usize {
        match &self.data {
            TensorData::Lent(lease) => lease.len(),
            TensorData::Owned(bytes) => bytes.len(),
        }
    }

    /// Runs `f` over the tensor bytes without copying them.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        match &self.data {
            TensorData::Lent(lease) => {
                let bytes: TensorBytes<'_> = lease.read();
                f(&bytes)
            }
            TensorData::Owned(bytes) => f(bytes),
        }
    }

    /// Takes the bytes out, copying only when they are borrowed from a host view.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.data {
            TensorData::Lent(lease) => lease.to_vec(),
            TensorData::Owned(bytes) => bytes,
        }
    }
}

/// A value crossing the engine boundary. The tag is fixed by the variant.
#[derive(Debug, Clone)]
pub enum TaggedValue {
    None,
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Tensor(TensorValue),
    ListBool(Vec<bool>),
    ListDouble(Vec<f64>),
    ListInt(Vec<i64>),
    ListTensor(Vec<TensorValue>),
    ListOptionalTensor(Vec<Option<TensorValue>>),
}

impl TaggedValue {
    pub fn tag(&self) -> Tag {
        match self {
            TaggedValue::None => Tag::None,
            TaggedValue::Int(_) => Tag::Int,
            TaggedValue::Double(_) => Tag::Double,
            TaggedValue::Bool(_) => Tag::Bool,
            TaggedValue::String(_) => Tag::String,
            TaggedValue::Tensor(_) => Tag::Tensor,
            TaggedValue::ListBool(_) => Tag::ListBool,
            TaggedValue::ListDouble(_) => Tag::ListDouble,
            TaggedValue::ListInt(_) => Tag::ListInt,
            TaggedValue::ListTensor(_) => Tag::ListTensor,
            TaggedValue::ListOptionalTensor(_) => Tag::ListOptionalTensor,
        }
    }

    pub fn as_tensor(&self) -> Option<&TensorValue> {
        match self {
            TaggedValue::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tag_codes() {
        for code in 0..=11 {
            assert_eq!(Tag::from_code(code).unwrap().code(), code);
        }
        assert_eq!(Tag::from_code(12), None);
        assert_eq!(Tag::ListOptionalTensor.to_string(), "list_optional_tensor");
        assert_eq!("int".parse::<Tag>().unwrap(), Tag::Int);
    }

    #[test]
    fn test_tag_follows_variant() {
        assert_eq!(TaggedValue::None.tag(), Tag::None);
        assert_eq!(TaggedValue::Int(3).tag(), Tag::Int);
        assert_eq!(TaggedValue::ListDouble(vec![1.0]).tag(), Tag::ListDouble);
        assert_eq!(TaggedValue::ListTensor(vec![]).tag(), Tag::ListTensor);
        let tensor = TensorValue::owned(ScalarKind::UInt8, vec![2], vec![1, 2]);
        assert_eq!(TaggedValue::Tensor(tensor).tag(), Tag::Tensor);
    }

    #[test]
    fn test_tensor_value_bytes() {
        let owned = TensorValue::owned(ScalarKind::UInt8, vec![3], vec![1, 2, 3]);
        assert!(!owned.is_lent());
        assert_eq!(owned.byte_len(), 3);
        assert_eq!(owned.with_bytes(|b| b.iter().map(|&x| x as u32).sum::<u32>()), 6);
        assert_eq!(owned.into_bytes(), vec![1, 2, 3]);
    }
}
