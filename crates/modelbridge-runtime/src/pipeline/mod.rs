//! Background execution of engine calls with results delivered on the host context.

mod context;
mod pool;
mod promise;


pub use context::HostContext;
pub(crate) use context::WeakHostContext;
pub use pool::WorkerPool;
pub use promise::{Promise, TaskId};
