use crate::error::{BridgeError, BridgeResult};
use std::cell::RefCell;
use std::rc::Rc;

/// Identifier of a background task, unique within one host context.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::From,
    derive_more::Deref,
)]
pub struct TaskId(u64);

enum State<T> {
    Pending,
    Settled(BridgeResult<T>),
    Taken,
}

/// Host-side handle on the eventual result of a background task.
///
/// A promise is settled exactly once, on the host context, when the host drives the
/// context with [`HostContext::poll`](super::HostContext::poll) or one of its blocking
/// variants.
pub struct Promise<T> {
    task: Option<TaskId>,
    state: Rc<RefCell<State<T>>>,
}

impl<T> Promise<T> {
    pub(crate) fn pending(task: TaskId) -> (Self, Resolver<T>) {
        let state = Rc::new(RefCell::new(State::Pending));
        let resolver = Resolver {
            state: state.clone(),
        };
        (
            Self {
                task: Some(task),
                state,
            },
            resolver,
        )
    }

    fn settled(result: BridgeResult<T>) -> Self {
        Self {
            task: None,
            state: Rc::new(RefCell::new(State::Settled(result))),
        }
    }

    pub fn resolved(value: T) -> Self {
        Self::settled(Ok(value))
    }

    pub fn rejected(error: BridgeError) -> Self {
        Self::settled(Err(error))
    }

    /// Task backing this promise. `None` for promises created already settled.
    pub fn task(&self) -> Option<TaskId> {
        self.task
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), State::Pending)
    }

    pub fn is_taken(&self) -> bool {
        matches!(*self.state.borrow(), State::Taken)
    }

    /// Takes the outcome once the promise is settled. Returns `None` while pending and
    /// after the outcome has been taken.
    pub fn try_take(&self) -> Option<BridgeResult<T>> {
        let mut state = self.state.borrow_mut();
        match std::mem::replace(&mut *state, State::Taken) {
            State::Settled(result) => Some(result),
            other => {
                *state = other;
                None
            }
        }
    }
}

impl<T> std::fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.state.borrow() {
            State::Pending => "pending",
            State::Settled(Ok(_)) => "resolved",
            State::Settled(Err(_)) => "rejected",
            State::Taken => "taken",
        };
        f.debug_struct("Promise")
            .field("task", &self.task)
            .field("state", &state)
            .finish()
    }
}

/// Settling side of a [`Promise`]. Consumed on use, so a promise settles at most once.
pub(crate) struct Resolver<T> {
    state: Rc<RefCell<State<T>>>,
}

impl<T> Resolver<T> {
    pub(crate) fn settle(self, result: BridgeResult<T>) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, State::Pending) {
            *state = State::Settled(result);
        }
    }
}
