use super::numeric::{BinaryOp, encode_values, zip_bytes};
use crate::engine::{EngineError, ErrorCode, Program};
use crate::meta::{MethodMeta, ValueSpec};
use crate::value::{TaggedValue, TensorValue};
use anyhow::{Context, bail};
use modelbridge_tensor::ScalarKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// On-disk description of a reference program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDef {
    pub methods: Vec<MethodDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ValueSpec>,
    #[serde(default)]
    pub outputs: Vec<ValueSpec>,
    /// Loaded together with the program.
    #[serde(default)]
    pub preload: bool,
    /// Artificial latency added to method loads and executions.
    #[serde(default)]
    pub delay_ms: u64,
    /// Makes loading this method fail with the given code.
    #[serde(default)]
    pub load_error: Option<ErrorCode>,
    #[serde(flatten)]
    pub op: Operation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Elementwise product of two tensors.
    Mul,
    /// Elementwise sum of two tensors.
    Add,
    /// Returns the inputs unchanged.
    Identity,
    /// Returns fixed values, ignoring the inputs.
    Constant { values: Vec<ConstantValue> },
    /// Always fails with `code`.
    Fail {
        code: ErrorCode,
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantTensor {
    pub dtype: ScalarKind,
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl ConstantTensor {
    fn to_value(&self) -> TensorValue {
        TensorValue::owned(
            self.dtype,
            self.shape.clone(),
            encode_values(self.dtype, &self.data),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value", rename_all = "snake_case")]
pub enum ConstantValue {
    None,
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Tensor(ConstantTensor),
    ListBool(Vec<bool>),
    ListDouble(Vec<f64>),
    ListInt(Vec<i64>),
    ListTensor(Vec<ConstantTensor>),
    ListOptionalTensor(Vec<Option<ConstantTensor>>),
}

impl ConstantValue {
    fn to_value(&self) -> TaggedValue {
        match self {
            ConstantValue::None => TaggedValue::None,
            ConstantValue::Int(v) => TaggedValue::Int(*v),
            ConstantValue::Double(v) => TaggedValue::Double(*v),
            ConstantValue::Bool(v) => TaggedValue::Bool(*v),
            ConstantValue::String(v) => TaggedValue::String(v.clone()),
            ConstantValue::Tensor(t) => TaggedValue::Tensor(t.to_value()),
            ConstantValue::ListBool(v) => TaggedValue::ListBool(v.clone()),
            ConstantValue::ListDouble(v) => TaggedValue::ListDouble(v.clone()),
            ConstantValue::ListInt(v) => TaggedValue::ListInt(v.clone()),
            ConstantValue::ListTensor(v) => {
                TaggedValue::ListTensor(v.iter().map(ConstantTensor::to_value).collect())
            }
            ConstantValue::ListOptionalTensor(v) => TaggedValue::ListOptionalTensor(
                v.iter().map(|t| t.as_ref().map(ConstantTensor::to_value)).collect(),
            ),
        }
    }
}

/// A [`Program`] interpreted from a [`ProgramDef`].
#[derive(Debug)]
pub struct ReferenceProgram {
    def: ProgramDef,
    loaded: Mutex<BTreeSet<String>>,
}

impl ReferenceProgram {
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let def: ProgramDef =
            serde_json::from_str(content).context("Failed to parse program definition")?;
        Self::from_def(def)
    }

    pub fn from_def(def: ProgramDef) -> anyhow::Result<Self> {
        let mut names = BTreeSet::new();
        for method in &def.methods {
            if method.name.is_empty() {
                bail!("Method names must not be empty");
            }
            if !names.insert(method.name.as_str()) {
                bail!("Duplicate method '{}'", method.name);
            }
        }
        let loaded = def
            .methods
            .iter()
            .filter(|m| m.preload && m.load_error.is_none())
            .map(|m| m.name.clone())
            .collect();
        Ok(Self {
            def,
            loaded: Mutex::new(loaded),
        })
    }

    fn method(&self, name: &str) -> Result<&MethodDef, EngineError> {
        self.def
            .methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| {
                EngineError::with_message(ErrorCode::NotFound, format!("no method named '{name}'"))
            })
    }

    fn loaded(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Program for ReferenceProgram {
    fn method_names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.def.methods.iter().map(|m| m.name.clone()).collect())
    }

    fn method_meta(&self, name: &str) -> Result<MethodMeta, EngineError> {
        let method = self.method(name)?;
        Ok(MethodMeta::new(
            method.name.clone(),
            method.inputs.clone(),
            method.outputs.clone(),
        ))
    }

    fn load_method(&self, name: &str) -> Result<(), EngineError> {
        let method = self.method(name)?;
        if self.is_method_loaded(name) {
            return Ok(());
        }
        delay(method);
        if let Some(code) = method.load_error {
            return Err(EngineError::with_message(
                code,
                format!("method '{name}' could not be loaded"),
            ));
        }
        self.loaded().insert(name.to_string());
        log::debug!("Reference method '{name}' loaded");
        Ok(())
    }

    fn is_method_loaded(&self, name: &str) -> bool {
        self.loaded().contains(name)
    }

    fn execute(&self, name: &str, inputs: &[TaggedValue]) -> Result<Vec<TaggedValue>, EngineError> {
        let method = self.method(name)?;
        if !self.is_method_loaded(name) {
            self.load_method(name)?;
        }
        delay(method);
        match &method.op {
            Operation::Mul => elementwise(inputs, BinaryOp::Mul),
            Operation::Add => elementwise(inputs, BinaryOp::Add),
            Operation::Identity => Ok(inputs.to_vec()),
            Operation::Constant { values } => {
                Ok(values.iter().map(ConstantValue::to_value).collect())
            }
            Operation::Fail { code, message } => Err(EngineError {
                code: *code,
                message: message.clone(),
            }),
        }
    }
}

fn delay(method: &MethodDef) {
    if method.delay_ms > 0 {
        std::thread::sleep(Duration::from_millis(method.delay_ms));
    }
}

fn elementwise(inputs: &[TaggedValue], op: BinaryOp) -> Result<Vec<TaggedValue>, EngineError> {
    let invalid = |message: String| EngineError::with_message(ErrorCode::InvalidArgument, message);

    let [lhs, rhs] = inputs else {
        return Err(invalid(format!("expected 2 inputs, got {}", inputs.len())));
    };
    let (Some(lhs), Some(rhs)) = (lhs.as_tensor(), rhs.as_tensor()) else {
        return Err(invalid(format!(
            "expected two tensors, got {} and {}",
            lhs.tag(),
            rhs.tag()
        )));
    };
    if lhs.kind != rhs.kind {
        return Err(invalid(format!(
            "dtype mismatch: {} vs {}",
            lhs.kind, rhs.kind
        )));
    }
    if lhs.shape != rhs.shape {
        return Err(invalid(format!(
            "shape mismatch: {:?} vs {:?}",
            lhs.shape, rhs.shape
        )));
    }

    let bytes = lhs.with_bytes(|l| rhs.with_bytes(|r| zip_bytes(lhs.kind, l, r, op)));
    Ok(vec![TaggedValue::Tensor(TensorValue::owned(
        lhs.kind,
        lhs.shape.clone(),
        bytes,
    ))])
}
