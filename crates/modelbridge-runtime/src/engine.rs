//! The narrow interface to the inference engine.
//!
//! Everything the bridge needs from the engine goes through [`Engine`] and [`Program`].
//! Implementations must be shareable across threads: a loaded program is used by the
//! worker pool while the host context keeps its own reference.

use crate::meta::MethodMeta;
use crate::value::TaggedValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Status codes reported by the engine.
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
pub enum ErrorCode {
    Ok = 0,
    Internal = 1,
    InvalidState = 2,
    EndOfMethod = 3,
    NotSupported = 16,
    NotImplemented = 17,
    InvalidArgument = 18,
    InvalidType = 19,
    OperatorMissing = 20,
    NotFound = 32,
    MemoryAllocationFailed = 33,
    AccessFailed = 34,
    InvalidProgram = 35,
    DelegateInvalidCompatibility = 48,
    DelegateMemoryAllocationFailed = 49,
    DelegateInvalidHandle = 50,
}

impl ErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_repr(code)
    }
}

/// A failed engine call: the status code plus whatever detail the engine attached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} (0x{:x}){}", .code.code(), detail_suffix(.message))]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: Option<String>,
}

impl EngineError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }
}

fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl From<ErrorCode> for EngineError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

/// Memory locking strategy used when mapping a program file.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MlockPolicy {
    #[default]
    NoMlock,
    UseMlock,
    UseMlockIgnoreErrors,
}

/// Loads programs from disk.
pub trait Engine: Send + Sync {
    fn load(&self, path: &Path, mlock: MlockPolicy) -> Result<Box<dyn Program>, EngineError>;
}

/// A loaded model program and its named methods.
pub trait Program: Send + Sync {
    fn method_names(&self) -> Result<Vec<String>, EngineError>;

    fn method_meta(&self, name: &str) -> Result<MethodMeta, EngineError>;

    /// Prepares `name` for execution. Loading an already loaded method is a no-op.
    fn load_method(&self, name: &str) -> Result<(), EngineError>;

    fn is_method_loaded(&self, name: &str) -> bool;

    /// Runs `name`, loading it first if needed. Tensor inputs are read-only leases; tensor
    /// outputs should carry engine-owned bytes.
    fn execute(&self, name: &str, inputs: &[TaggedValue]) -> Result<Vec<TaggedValue>, EngineError>;
}
