//! # Event dispatcher: isolated concurrent fan-out.
//!
//! [`dispatch`] runs every handler in a snapshot independently: one handler's
//! error or panic never prevents the others from running and never propagates
//! to the publisher. Failures are routed to a pluggable [`ErrorSink`].
//!
//! ## Rules
//! - One tokio task per handler; no ordering between handlers.
//! - `Err` results and panics go to the sink; nothing is retried.
//! - The fan-out completes when every handler task has settled.
//!
//! ## Diagram
//! ```text
//!    dispatch(event, snapshot)
//!        │                      (clone per handler)
//!        ├────────► task H1 ─► handle(&event) ─► Err/panic ─► sink.report()
//!        ├────────► task H2 ─► handle(&event)
//!        └────────► task HN ─► handle(&event)
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::error;

use crate::error::{ModuleError, panic_message};
use crate::events::event::Event;
use crate::events::handler::HandlerRef;

/// Policy for handler failures.
///
/// The minimum viable policy logs the error together with the offending
/// event ([`LogSink`]); alternate sinks can emit metrics or dead-letter.
pub trait ErrorSink: Send + Sync + 'static {
    /// Reports one isolated handler failure.
    fn report(&self, error: &ModuleError, event: &Event);
}

/// Default sink: logs the error and the offending event.
#[derive(Debug, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: &ModuleError, event: &Event) {
        error!(
            kind = ?event.kind(),
            label = error.as_label(),
            "event handler failed: {error}"
        );
    }
}

/// Runs every handler in `handlers` against `event`, isolating failures.
///
/// Completes when all handler tasks have settled. Handlers run concurrently
/// on the runtime's pool; each receives its own clone of the event (clones
/// share the cancellation flag).
pub(crate) async fn dispatch(event: &Event, handlers: Vec<HandlerRef>, sink: Arc<dyn ErrorSink>) {
    let mut set = JoinSet::new();

    for handler in handlers {
        let ev = event.clone();
        let sink = Arc::clone(&sink);
        set.spawn(async move {
            let fut = handler.handle(&ev);
            match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => sink.report(&err, &ev),
                Err(panic) => {
                    let err = ModuleError::Panicked {
                        name: handler.name().to_string(),
                        info: panic_message(panic),
                    };
                    sink.report(&err, &ev);
                }
            }
        });
    }

    while set.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::handler::FnHandler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink(AtomicUsize);

    impl ErrorSink for CountingSink {
        fn report(&self, _error: &ModuleError, _event: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_error_and_panic_both_reach_the_sink() {
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let handlers: Vec<HandlerRef> = vec![
            FnHandler::arc("errors", |_ev| async { Err(ModuleError::failed("boom")) }),
            FnHandler::arc("panics", |_ev| async { panic!("kaboom") }),
            FnHandler::arc("fine", |_ev| async { Ok(()) }),
        ];

        let ev = Event::new_chat("buyer", "1289");
        dispatch(&ev, handlers, sink.clone()).await;

        assert_eq!(sink.0.load(Ordering::SeqCst), 2);
    }
}
