use crate::value::Tag;
use modelbridge_tensor::ScalarKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct TensorInfo {
    pub dtype: ScalarKind,
    pub shape: Vec<i64>,
}

/// Declared type of one method input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ValueSpec {
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tensor_info: Option<TensorInfo>,
}

impl ValueSpec {
    pub fn scalar(tag: Tag) -> Self {
        Self::new(tag, None)
    }

    pub fn tensor(dtype: ScalarKind, shape: Vec<i64>) -> Self {
        Self::new(Tag::Tensor, Some(TensorInfo::new(dtype, shape)))
    }
}

/// Signature of a program method as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct MethodMeta {
    pub name: String,
    pub inputs: Vec<ValueSpec>,
    pub outputs: Vec<ValueSpec>,
}

impl MethodMeta {
    pub fn input_tag(&self, index: usize) -> Option<Tag> {
        self.inputs.get(index).map(|spec| spec.tag)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "inputs": self.inputs,
            "outputs": self.outputs,
        })
    }
}
