//! Bridge between a single-threaded host environment and an embedded inference engine.
//!
//! Host values are marshaled into engine [`TaggedValue`]s, engine calls run on a
//! [`WorkerPool`], and results come back as [`Promise`]s settled on the [`HostContext`].
//!
//! ```no_run
//! use modelbridge_runtime::{BridgeConfig, HostContext, HostValue, Module, ReferenceEngine};
//! use modelbridge_tensor::TensorView;
//! use std::sync::Arc;
//!
//! let host = HostContext::new(Arc::new(ReferenceEngine), BridgeConfig::default())?;
//! let module = host.block_on(Module::load(&host, "model.json"))?;
//!
//! let x = TensorView::from_elements(&[2], &[1f32, 2.])?;
//! let y = TensorView::from_elements(&[2], &[3f32, 4.])?;
//! let _outputs = host.block_on(module.forward(&[HostValue::from(x), HostValue::from(y)])?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod engine;
mod error;
mod host;
mod meta;
mod module;
mod pipeline;
mod value;

pub mod logging;
pub mod marshal;
pub mod reference;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{BridgeConfig, ConfigError, ENV_PREFIX, ExecutionPolicy, NumericInputMode};
pub use engine::{Engine, EngineError, ErrorCode, MlockPolicy, Program};
pub use error::{BridgeError, BridgeResult};
pub use host::HostValue;
pub use meta::{MethodMeta, TensorInfo, ValueSpec};
pub use module::{FORWARD, Module};
pub use pipeline::{HostContext, Promise, TaskId, WorkerPool};
pub use reference::ReferenceEngine;
pub use value::{Tag, TaggedValue, TensorData, TensorValue};
