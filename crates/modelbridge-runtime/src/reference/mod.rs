//! A small interpreted engine for exercising the bridge without a native runtime.
//!
//! Programs are JSON files:
//!
//! ```json
//! {
//!   "methods": [
//!     {
//!       "name": "forward",
//!       "op": "mul",
//!       "preload": true,
//!       "inputs": [
//!         { "tag": "tensor", "tensor_info": { "dtype": "float32", "shape": [2, 2] } },
//!         { "tag": "tensor", "tensor_info": { "dtype": "float32", "shape": [2, 2] } }
//!       ],
//!       "outputs": [
//!         { "tag": "tensor", "tensor_info": { "dtype": "float32", "shape": [2, 2] } }
//!       ]
//!     },
//!     { "name": "version", "op": "constant", "values": [{ "tag": "int", "value": 3 }] },
//!     { "name": "broken", "op": "fail", "code": "OperatorMissing" }
//!   ]
//! }
//! ```

mod numeric;
mod program;

#[cfg(test)]
mod tests;

pub use program::{
    ConstantTensor, ConstantValue, MethodDef, Operation, ProgramDef, ReferenceProgram,
};

use crate::engine::{Engine, EngineError, ErrorCode, MlockPolicy, Program};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceEngine;

impl Engine for ReferenceEngine {
    fn load(&self, path: &Path, mlock: MlockPolicy) -> Result<Box<dyn Program>, EngineError> {
        log::debug!("Loading reference program {} ({mlock})", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::with_message(ErrorCode::AccessFailed, format!("{}: {e}", path.display()))
        })?;
        let program = ReferenceProgram::from_json(&content).map_err(|e| {
            EngineError::with_message(ErrorCode::InvalidProgram, format!("{e:#}"))
        })?;
        Ok(Box::new(program))
    }
}
