//! Host-facing handle on a loaded program.

mod program;


use self::program::ProgramCell;
use crate::config::NumericInputMode;
use crate::engine::{EngineError, Program};
use crate::error::{BridgeError, BridgeResult};
use crate::host::HostValue;
use crate::marshal;
use crate::meta::MethodMeta;
use crate::pipeline::{HostContext, Promise};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

/// Name of the method invoked by [`Module::forward`].
pub const FORWARD: &str = "forward";

struct Loaded {
    program: Box<dyn Program>,
    method_names: Vec<String>,
    loaded_methods: BTreeSet<String>,
}

struct ModuleState {
    program: Option<Arc<ProgramCell>>,
    method_names: Vec<String>,
    loaded_methods: BTreeSet<String>,
}

impl ModuleState {
    /// Records a method the engine reported as loaded. Ignored once disposed.
    fn mark_loaded(&mut self, method: String) {
        if self.program.is_some() && self.method_names.contains(&method) {
            self.loaded_methods.insert(method);
        }
    }
}

/// A loaded model program.
///
/// A `Module` only exists once [`Module::load`] has resolved, so every handle starts out
/// ready. After [`dispose`](Module::dispose) every operation fails with
/// [`BridgeError::Disposed`]. Clones share the same underlying program.
#[derive(Clone)]
pub struct Module {
    host: HostContext,
    path: String,
    state: Rc<RefCell<ModuleState>>,
}

impl Module {
    /// Loads the program at `path` on a worker.
    ///
    /// The promise rejects with [`BridgeError::ModuleLoadFailed`] carrying the engine's
    /// error when the program cannot be loaded.
    pub fn load(host: &HostContext, path: impl AsRef<Path>) -> Promise<Module> {
        let path = path.as_ref().to_path_buf();
        let display = path.display().to_string();
        let engine = host.engine();
        let mlock = host.config().mlock;
        let weak_host = host.downgrade();

        host.submit(
            format!("load {display}"),
            move || -> Result<Loaded, EngineError> {
                let program = engine.load(&path, mlock)?;
                let method_names = program.method_names()?;
                let loaded_methods = method_names
                    .iter()
                    .filter(|name| program.is_method_loaded(name))
                    .cloned()
                    .collect();
                Ok(Loaded {
                    program,
                    method_names,
                    loaded_methods,
                })
            },
            move |result| {
                let loaded = result.map_err(|err| {
                    log::error!("Failed to load module from {display}: {err}");
                    BridgeError::ModuleLoadFailed {
                        path: display.clone(),
                        reason: err.to_string(),
                    }
                })?;
                let host = weak_host.upgrade().ok_or(BridgeError::PipelineClosed)?;
                log::info!(
                    "Loaded module {display} with methods {:?}",
                    loaded.method_names
                );
                Ok(Module::new(host, display, loaded))
            },
        )
    }

    fn new(host: HostContext, path: String, loaded: Loaded) -> Self {
        let cell = ProgramCell::new(
            loaded.program,
            &loaded.method_names,
            host.config().execution_policy,
        );
        Self {
            host,
            path,
            state: Rc::new(RefCell::new(ModuleState {
                program: Some(Arc::new(cell)),
                method_names: loaded.method_names,
                loaded_methods: loaded.loaded_methods,
            })),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn program(&self) -> BridgeResult<Arc<ProgramCell>> {
        self.state
            .borrow()
            .program
            .clone()
            .ok_or(BridgeError::Disposed("Module"))
    }

    fn ensure_method(&self, name: &str) -> BridgeResult<()> {
        if self.state.borrow().method_names.iter().any(|m| m == name) {
            Ok(())
        } else {
            Err(BridgeError::MethodNotFound(name.to_string()))
        }
    }

    pub fn method_names(&self) -> BridgeResult<Vec<String>> {
        self.program()?;
        Ok(self.state.borrow().method_names.clone())
    }

    pub fn loaded_methods(&self) -> BridgeResult<Vec<String>> {
        self.program()?;
        Ok(self.state.borrow().loaded_methods.iter().cloned().collect())
    }

    pub fn is_method_loaded(&self, name: &str) -> BridgeResult<bool> {
        self.program()?;
        Ok(self.state.borrow().loaded_methods.contains(name))
    }

    /// Declared signature of `name`, or `None` when the program has no such method.
    pub fn method_meta(&self, name: &str) -> BridgeResult<Option<MethodMeta>> {
        let program = self.program()?;
        if self.ensure_method(name).is_err() {
            return Ok(None);
        }
        program
            .get()
            .method_meta(name)
            .map(Some)
            .map_err(|err| BridgeError::InvalidArgument(format!("metadata for '{name}': {err}")))
    }

    /// Loads `name` on a worker. Resolves immediately when it is already loaded.
    pub fn load_method(&self, name: &str) -> BridgeResult<Promise<()>> {
        let program = self.program()?;
        if self.is_method_loaded(name)? {
            return Ok(Promise::resolved(()));
        }
        self.ensure_method(name)?;

        let method = name.to_string();
        let state = self.state.clone();
        Ok(self.host.submit(
            format!("{}.{name}: load", self.path),
            {
                let method = method.clone();
                move || program.guarded(&method, |p| p.load_method(&method))
            },
            move |result| {
                result.map_err(|err| BridgeError::MethodLoadFailed {
                    method: method.clone(),
                    reason: err.to_string(),
                })?;
                state.borrow_mut().mark_loaded(method);
                Ok(())
            },
        ))
    }

    /// Runs `name` on a worker with `inputs` and resolves with its outputs.
    ///
    /// Inputs are converted before anything is dispatched, so conversion errors are
    /// returned directly. Tensor inputs are lent to the engine, not copied.
    pub fn execute(
        &self,
        name: &str,
        inputs: &[HostValue],
    ) -> BridgeResult<Promise<Vec<HostValue>>> {
        let program = self.program()?;
        self.ensure_method(name)?;

        let meta = match self.host.config().numeric_inputs {
            NumericInputMode::Double => None,
            NumericInputMode::FollowMethodMeta => program.get().method_meta(name).ok(),
        };
        let tagged =
            marshal::inputs_to_engine(inputs, meta.as_ref(), self.host.config().numeric_inputs)?;

        let method = name.to_string();
        let state = self.state.clone();
        Ok(self.host.submit(
            format!("{}.{name}", self.path),
            {
                let method = method.clone();
                move || {
                    let outputs = program.guarded(&method, |p| p.execute(&method, &tagged));
                    let loaded = program.get().is_method_loaded(&method);
                    (outputs, loaded)
                }
            },
            move |(outputs, loaded)| {
                if loaded {
                    state.borrow_mut().mark_loaded(method.clone());
                }
                let outputs = outputs.map_err(|err| BridgeError::MethodExecutionFailed {
                    method,
                    reason: err.to_string(),
                })?;
                marshal::outputs_to_host(outputs)
            },
        ))
    }

    pub fn forward(&self, inputs: &[HostValue]) -> BridgeResult<Promise<Vec<HostValue>>> {
        self.execute(FORWARD, inputs)
    }

    /// Releases the program. Tasks already dispatched keep their own reference and run to
    /// completion. Disposing twice is a no-op.
    pub fn dispose(&self) {
        let mut state = self.state.borrow_mut();
        if state.program.take().is_some() {
            state.loaded_methods.clear();
            log::info!("Disposed module {}", self.path);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().program.is_none()
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Module")
            .field("path", &self.path)
            .field("disposed", &state.program.is_none())
            .field("method_names", &state.method_names)
            .field("loaded_methods", &state.loaded_methods)
            .finish()
    }
}
