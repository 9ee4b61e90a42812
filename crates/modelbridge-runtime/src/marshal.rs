//! Conversion between host values and engine tagged values.
//!
//! Host tensors are handed to the engine as read-only leases, never copied. Engine
//! tensors come back as new views that adopt the engine's buffer.

use crate::config::NumericInputMode;
use crate::error::{BridgeError, BridgeResult};
use crate::host::HostValue;
use crate::meta::MethodMeta;
use crate::value::{Tag, TaggedValue, TensorData, TensorValue};
use modelbridge_tensor::TensorView;

/// Converts one host value. `slot` is the declared tag of the receiving input, if known.
pub fn to_engine(
    value: &HostValue,
    slot: Option<Tag>,
    mode: NumericInputMode,
) -> BridgeResult<TaggedValue> {
    let tagged = match value {
        HostValue::Undefined | HostValue::Null => TaggedValue::None,
        HostValue::Number(n) => number_to_engine(*n, slot, mode),
        HostValue::BigInt(i) => TaggedValue::Int(*i),
        HostValue::Boolean(b) => TaggedValue::Bool(*b),
        HostValue::Text(s) => TaggedValue::String(s.clone()),
        HostValue::Tensor(view) => {
            if view.is_disposed() {
                return Err(BridgeError::Disposed("Tensor"));
            }
            TaggedValue::Tensor(TensorValue::lent(
                view.kind(),
                view.shape().to_vec(),
                view.lease()?,
            ))
        }
        HostValue::Array(_) | HostValue::Bytes(_) | HostValue::Object(_) => {
            return Err(BridgeError::UnsupportedValueType(format!(
                "cannot pass a host {} to the engine",
                value.type_name()
            )));
        }
    };
    Ok(tagged)
}

fn number_to_engine(n: f64, slot: Option<Tag>, mode: NumericInputMode) -> TaggedValue {
    let integral =
        n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64;
    match (mode, slot) {
        (NumericInputMode::FollowMethodMeta, Some(Tag::Int)) if integral => {
            TaggedValue::Int(n as i64)
        }
        _ => TaggedValue::Double(n),
    }
}

/// Converts a method's inputs, consulting `meta` for slot tags.
pub fn inputs_to_engine(
    values: &[HostValue],
    meta: Option<&MethodMeta>,
    mode: NumericInputMode,
) -> BridgeResult<Vec<TaggedValue>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| to_engine(value, meta.and_then(|m| m.input_tag(i)), mode))
        .collect()
}

/// Converts one engine value back into a host value.
pub fn to_host(value: TaggedValue) -> BridgeResult<HostValue> {
    let host = match value {
        TaggedValue::None => HostValue::Null,
        TaggedValue::Int(i) => HostValue::BigInt(i),
        TaggedValue::Double(d) => HostValue::Number(d),
        TaggedValue::Bool(b) => HostValue::Boolean(b),
        TaggedValue::String(s) => HostValue::Text(s),
        TaggedValue::Tensor(tensor) => HostValue::Tensor(tensor_to_host(tensor)?),
        TaggedValue::ListBool(values) => {
            HostValue::Array(values.into_iter().map(HostValue::Boolean).collect())
        }
        TaggedValue::ListDouble(values) => {
            HostValue::Array(values.into_iter().map(HostValue::Number).collect())
        }
        TaggedValue::ListInt(values) => {
            HostValue::Array(values.into_iter().map(HostValue::BigInt).collect())
        }
        other @ (TaggedValue::ListTensor(_) | TaggedValue::ListOptionalTensor(_)) => {
            return Err(BridgeError::UnsupportedValueType(format!(
                "engine returned a {} value",
                other.tag()
            )));
        }
    };
    Ok(host)
}

pub fn outputs_to_host(values: Vec<TaggedValue>) -> BridgeResult<Vec<HostValue>> {
    values.into_iter().map(to_host).collect()
}

fn tensor_to_host(tensor: TensorValue) -> BridgeResult<TensorView> {
    let TensorValue { kind, shape, data } = tensor;
    let view = match data {
        TensorData::Owned(bytes) => TensorView::from_engine(kind, shape, bytes)?,
        // The engine echoed a host buffer; copy it so no two views alias.
        TensorData::Lent(lease) => {
            let dims = shape
                .iter()
                .map(|&d| i64::try_from(d))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| BridgeError::InvalidArgument(e.to_string()))?;
            TensorView::new(kind, &dims, &lease.read())?
        }
    };
    Ok(view)
}
