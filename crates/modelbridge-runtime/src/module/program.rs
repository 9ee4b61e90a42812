use crate::config::ExecutionPolicy;
use crate::engine::Program;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// The engine program shared between a module and its in-flight tasks.
pub(super) struct ProgramCell {
    program: Box<dyn Program>,
    policy: ExecutionPolicy,
    method_locks: HashMap<String, Mutex<()>>,
}

impl ProgramCell {
    pub(super) fn new(
        program: Box<dyn Program>,
        methods: &[String],
        policy: ExecutionPolicy,
    ) -> Self {
        let method_locks = match policy {
            ExecutionPolicy::Concurrent => HashMap::new(),
            ExecutionPolicy::SerializePerMethod => methods
                .iter()
                .map(|name| (name.clone(), Mutex::new(())))
                .collect(),
        };
        Self {
            program,
            policy,
            method_locks,
        }
    }

    pub(super) fn get(&self) -> &dyn Program {
        self.program.as_ref()
    }

    /// Runs `f` against the program, holding `method`'s lock when calls are serialized.
    pub(super) fn guarded<R>(&self, method: &str, f: impl FnOnce(&dyn Program) -> R) -> R {
        let _guard = match self.policy {
            ExecutionPolicy::Concurrent => None,
            ExecutionPolicy::SerializePerMethod => self
                .method_locks
                .get(method)
                .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner)),
        };
        f(self.get())
    }
}
