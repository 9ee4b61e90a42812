use modelbridge_tensor::TensorView;
use std::collections::BTreeMap;

/// A dynamic value as seen by the host scripting environment.
#[derive(Debug)]
pub enum HostValue {
    Undefined,
    Null,
    Number(f64),
    BigInt(i64),
    Boolean(bool),
    Text(String),
    Tensor(TensorView),
    Array(Vec<HostValue>),
    Bytes(Vec<u8>),
    Object(BTreeMap<String, HostValue>),
}

impl HostValue {
    /// Host-facing type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Number(_) => "number",
            HostValue::BigInt(_) => "bigint",
            HostValue::Boolean(_) => "boolean",
            HostValue::Text(_) => "string",
            HostValue::Tensor(_) => "tensor",
            HostValue::Array(_) => "array",
            HostValue::Bytes(_) => "bytes",
            HostValue::Object(_) => "object",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, HostValue::Undefined | HostValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&TensorView> {
        match self {
            HostValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_tensor(self) -> Option<TensorView> {
        match self {
            HostValue::Tensor(t) => Some(t),
            _ => None,
        }
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Number(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::BigInt(value)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Boolean(value)
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::Text(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::Text(value.to_string())
    }
}

impl From<TensorView> for HostValue {
    fn from(value: TensorView) -> Self {
        HostValue::Tensor(value)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(value: Vec<HostValue>) -> Self {
        HostValue::Array(value)
    }
}
