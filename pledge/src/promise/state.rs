use crate::context::{ExecutionContext, Work};
use crate::error::Error;
use std::cell::RefCell;
use std::collections::VecDeque;

/// The handler half of a callback. It receives whichever outcome the promise settled with
type Handler<T> = Box<dyn FnOnce(Result<T, Error>) + Send + 'static>;

/// A handler bound to the context that must run it
pub(crate) struct Callback<T> {
    handler: Handler<T>,
    context: Box<dyn ExecutionContext>,
}

impl<T: Clone + Send + 'static> Callback<T> {
    pub(crate) fn new<C, F, R>(on: &C, on_fulfilled: F, on_rejected: R) -> Self
    where
        C: ExecutionContext + Clone,
        F: FnOnce(T) + Send + 'static,
        R: FnOnce(Error) + Send + 'static,
    {
        Self::with_outcome(on, move |outcome| match outcome {
            Ok(value) => on_fulfilled(value),
            Err(error) => on_rejected(error),
        })
    }

    pub(crate) fn with_outcome<C, F>(on: &C, handler: F) -> Self
    where
        C: ExecutionContext + Clone,
        F: FnOnce(Result<T, Error>) + Send + 'static,
    {
        Self {
            handler: Box::new(handler),
            context: Box::new(on.clone()),
        }
    }
}

pub(crate) enum State<T> {
    /// Not settled yet; callbacks are kept in registration order
    Pending(Vec<Callback<T>>),
    Fulfilled(T),
    Rejected(Error),
}

impl<T> State<T> {
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub(crate) fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    pub(crate) fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub(crate) fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn error(&self) -> Option<&Error> {
        match self {
            Self::Rejected(error) => Some(error),
            _ => None,
        }
    }

    pub(crate) fn pending_callbacks(&self) -> usize {
        match self {
            Self::Pending(callbacks) => callbacks.len(),
            _ => 0,
        }
    }
}

impl<T: Clone> State<T> {
    /// The settled outcome, or `None` while pending
    pub(crate) fn outcome(&self) -> Option<Result<T, Error>> {
        match self {
            Self::Pending(_) => None,
            Self::Fulfilled(value) => Some(Ok(value.clone())),
            Self::Rejected(error) => Some(Err(error.clone())),
        }
    }
}

impl<T> From<Result<T, Error>> for State<T> {
    fn from(outcome: Result<T, Error>) -> Self {
        match outcome {
            Ok(value) => Self::Fulfilled(value),
            Err(error) => Self::Rejected(error),
        }
    }
}

thread_local! {
    /// Delivery steps queued behind the delivery loop running on this thread.
    /// `None` while no loop runs.
    static DEFERRED: RefCell<Option<VecDeque<Work>>> = RefCell::new(None);
}

/// Runs `step` at once, or queues it behind the delivery loop already
/// running on this thread.
///
/// With contexts that run work synchronously, each delivered callback would
/// otherwise start the next one from deeper in the stack. Queued steps keep
/// the stack depth constant however many callbacks or chained links fire.
fn run_flat(step: Work) {
    let owned = DEFERRED.with(|deferred| {
        let mut deferred = deferred.borrow_mut();
        match deferred.as_mut() {
            Some(queue) => {
                queue.push_back(step);
                None
            }
            None => {
                *deferred = Some(VecDeque::new());
                Some(step)
            }
        }
    });

    let Some(first) = owned else {
        return;
    };

    let _drain = DrainOnExit;
    first();
    while let Some(next) = DEFERRED.with(|deferred| deferred.borrow_mut().as_mut().and_then(VecDeque::pop_front)) {
        next();
    }
}

/// Ends the delivery loop of this thread. Steps still queued when a handler
/// panic unwinds through the loop are run in unwinding mode, where only
/// callbacks of asynchronous contexts are handed over.
struct DrainOnExit;

impl Drop for DrainOnExit {
    fn drop(&mut self) {
        let leftover = DEFERRED
            .with(|deferred| deferred.borrow_mut().take())
            .unwrap_or_default();

        for step in leftover {
            step();
        }
    }
}

/// Delivers one outcome to a list of callbacks, strictly one after another.
///
/// The next callback is handed to its context only after the previous one ran
/// or was dropped by its context without running (an invalidated context, a
/// runtime that shut down). Either way the rest of the list keeps flowing.
///
/// While a handler panic unwinds, callbacks whose context runs inline are
/// dropped unrun; the others are still handed to their contexts.
pub(crate) struct Delivery<T: Clone + Send + 'static> {
    outcome: Result<T, Error>,
    queue: VecDeque<Callback<T>>,
}

impl<T: Clone + Send + 'static> Delivery<T> {
    pub(crate) fn new(outcome: Result<T, Error>, callbacks: Vec<Callback<T>>) -> Self {
        Self {
            outcome,
            queue: callbacks.into(),
        }
    }

    pub(crate) fn start(self) {
        run_flat(Box::new(move || self.fire_next()))
    }

    fn fire_next(mut self) {
        let unwinding = std::thread::panicking();

        while let Some(Callback { handler, context }) = self.queue.pop_front() {
            if unwinding && context.runs_inline() {
                log::warn!(target: "pledge", "Dropping an inline callback while a handler panic unwinds");
                continue;
            }

            if self.queue.is_empty() {
                let outcome = self.outcome;
                context.execute(Box::new(move || handler(outcome)));
                return;
            }

            let outcome = self.outcome.clone();
            let rest = FireOnDrop(Some(self));
            context.execute(Box::new(move || {
                handler(outcome);
                drop(rest);
            }));
            return;
        }
    }
}

/// Continues a delivery once the scheduled work that owns it is gone,
/// whether it ran to completion, unwound, or was discarded unrun
struct FireOnDrop<T: Clone + Send + 'static>(Option<Delivery<T>>);

impl<T: Clone + Send + 'static> Drop for FireOnDrop<T> {
    fn drop(&mut self) {
        if let Some(delivery) = self.0.take() {
            if std::thread::panicking() {
                delivery.fire_next()
            } else {
                run_flat(Box::new(move || delivery.fire_next()))
            }
        }
    }
}
