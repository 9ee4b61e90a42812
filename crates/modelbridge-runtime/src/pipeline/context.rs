use super::pool::WorkerPool;
use super::promise::{Promise, TaskId};
use crate::config::BridgeConfig;
use crate::engine::Engine;
use crate::error::{BridgeError, BridgeResult};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::sync::Arc;

type Settle = Box<dyn FnOnce()>;

struct PendingTask {
    label: String,
    settle: Settle,
}

struct Inner {
    engine: Arc<dyn Engine>,
    config: BridgeConfig,
    pool: WorkerPool,
    done_tx: crossbeam::channel::Sender<TaskId>,
    done_rx: crossbeam::channel::Receiver<TaskId>,
    pending: RefCell<HashMap<TaskId, PendingTask>>,
    next_id: Cell<u64>,
}

/// The host's single-threaded execution context.
///
/// Background work runs on the worker pool; its completion is observed here, on the host
/// thread, where the matching promise is settled. The context is cheap to clone and is
/// neither `Send` nor `Sync`.
#[derive(Clone)]
pub struct HostContext {
    inner: Rc<Inner>,
}

impl HostContext {
    pub fn new(engine: Arc<dyn Engine>, config: BridgeConfig) -> std::io::Result<Self> {
        let pool = WorkerPool::new(config.worker_threads)?;
        log::debug!("Host context started with {} workers", pool.size());
        let (done_tx, done_rx) = crossbeam::channel::unbounded();
        Ok(Self {
            inner: Rc::new(Inner {
                engine,
                config,
                pool,
                done_tx,
                done_rx,
                pending: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
            }),
        })
    }

    pub(crate) fn downgrade(&self) -> WeakHostContext {
        WeakHostContext(Rc::downgrade(&self.inner))
    }

    pub fn engine(&self) -> Arc<dyn Engine> {
        self.inner.engine.clone()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Runs `work` on a worker and returns a promise for its outcome.
    ///
    /// `settle` runs later on the host context with the value `work` produced, and its
    /// result settles the promise. A panic in `work` rejects the promise with
    /// [`BridgeError::TaskPanicked`] and `settle` is not called.
    pub fn submit<T, R, W, S>(&self, label: impl Into<String>, work: W, settle: S) -> Promise<R>
    where
        T: Send + 'static,
        R: 'static,
        W: FnOnce() -> T + Send + 'static,
        S: FnOnce(T) -> BridgeResult<R> + 'static,
    {
        let label = label.into();
        let id = self.next_task_id();
        let (promise, resolver) = Promise::pending(id);
        let (result_tx, result_rx) = crossbeam::channel::bounded(1);
        let done_tx = self.inner.done_tx.clone();

        let dispatched = self.inner.pool.execute(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(work));
            let _ = result_tx.send(outcome);
            let _ = done_tx.send(id);
        });
        if let Err(err) = dispatched {
            log::error!("Failed to dispatch task {id} ({label}): {err}");
            resolver.settle(Err(err));
            return promise;
        }

        let task = label.clone();
        let finish: Settle = Box::new(move || {
            let result = match result_rx.try_recv() {
                Ok(Ok(value)) => settle(value),
                Ok(Err(payload)) => Err(BridgeError::TaskPanicked {
                    task,
                    message: panic_payload_message(payload),
                }),
                Err(_) => Err(BridgeError::PipelineClosed),
            };
            resolver.settle(result);
        });

        log::debug!("Submitted task {id} ({label})");
        self.inner
            .pending
            .borrow_mut()
            .insert(id, PendingTask {
                label,
                settle: finish,
            });
        promise
    }

    /// Settles every task that has already completed, without blocking. Returns the
    /// number of promises settled.
    pub fn poll(&self) -> usize {
        let mut settled = 0;
        while let Ok(id) = self.inner.done_rx.try_recv() {
            self.settle(id);
            settled += 1;
        }
        settled
    }

    /// Drives the context until `promise` settles, then returns its outcome.
    pub fn block_on<T>(&self, promise: Promise<T>) -> BridgeResult<T> {
        loop {
            if let Some(result) = promise.try_take() {
                return result;
            }
            if promise.is_taken() {
                return Err(BridgeError::InvalidArgument(
                    "promise outcome was already taken".to_string(),
                ));
            }
            if self.pending_tasks() == 0 {
                return Err(BridgeError::PipelineClosed);
            }
            self.wait_one()?;
        }
    }

    /// Blocks until no task is pending. Returns the number of promises settled.
    pub fn run_until_idle(&self) -> BridgeResult<usize> {
        let mut settled = 0;
        while self.pending_tasks() > 0 {
            self.wait_one()?;
            settled += 1;
        }
        Ok(settled)
    }

    fn wait_one(&self) -> BridgeResult<()> {
        let id = self
            .inner
            .done_rx
            .recv()
            .map_err(|_| BridgeError::PipelineClosed)?;
        self.settle(id);
        Ok(())
    }

    fn settle(&self, id: TaskId) {
        // Released before running `settle`, which may submit follow-up tasks.
        let task = self.inner.pending.borrow_mut().remove(&id);
        match task {
            Some(PendingTask { label, settle }) => {
                settle();
                log::debug!("Settled task {id} ({label})");
            }
            None => log::warn!("Completion for unknown task {id}"),
        }
    }

    fn next_task_id(&self) -> TaskId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        TaskId::from(id)
    }
}

/// Non-owning reference held by settle callbacks, so pending tasks do not keep the
/// context alive.
pub(crate) struct WeakHostContext(Weak<Inner>);

impl WeakHostContext {
    pub(crate) fn upgrade(&self) -> Option<HostContext> {
        self.0.upgrade().map(|inner| HostContext { inner })
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("workers", &self.inner.pool.size())
            .field("pending", &self.pending_tasks())
            .finish()
    }
}

fn panic_payload_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
