// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process event/command bridge between the sync core and a single UI
//! consumer.
//!
//! The core can run long before any UI attaches (background jobs, push
//! processing). Outbound events are queued in an unbounded FIFO backlog
//! until a sink attaches; on attach the backlog drains in original order and
//! delivery switches to synchronous. Inbound commands fan out to every
//! registered handler against an immutable snapshot of the handler list.
//!
//! The backlog is deliberately unbounded: no event is ever dropped while
//! memory holds. Sustained disconnection therefore grows the queue without
//! limit; the `tether_bridge_backlog_depth` gauge exists so operators can
//! watch for that.

pub mod events;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use metrics::gauge;
use tracing::{debug, trace};

pub use events::{commands, WebCommand, WebEvent};

/// The single outward consumer of bridge events.
///
/// `deliver` is called synchronously, potentially from any background
/// thread, and must not call back into the bridge.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: WebEvent);
}

/// A registered consumer of inbound commands.
pub trait CommandHandler: Send + Sync {
    fn handle(&self, command: &WebCommand);
}

/// Blanket impl so closures can be registered directly.
impl<F> CommandHandler for F
where
    F: Fn(&WebCommand) + Send + Sync,
{
    fn handle(&self, command: &WebCommand) {
        self(command)
    }
}

/// Outbound delivery state: either a live sink or a backlog queue.
struct Outbound {
    sink: Option<Arc<dyn EventSink>>,
    backlog: VecDeque<WebEvent>,
}

/// Bidirectional event/command bridge.
///
/// Thread-safe; all methods may be called concurrently from any execution
/// context. Nothing held here survives a process restart.
pub struct Bridge {
    outbound: Mutex<Outbound>,
    handlers: ArcSwap<Vec<Arc<dyn CommandHandler>>>,
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            outbound: Mutex::new(Outbound {
                sink: None,
                backlog: VecDeque::new(),
            }),
            handlers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Post an event toward the UI consumer.
    ///
    /// With a sink attached the event is delivered immediately and
    /// synchronously; otherwise it is appended to the backlog. Delivery
    /// happens under the state lock so concurrent posts and the
    /// queued-to-live transition cannot reorder events.
    pub fn post_to_web(&self, event: WebEvent) {
        let mut outbound = self.outbound.lock().expect("bridge lock poisoned");
        match &outbound.sink {
            Some(sink) => {
                trace!(kind = %event.kind, "delivering event");
                sink.deliver(event);
            }
            None => {
                outbound.backlog.push_back(event);
                gauge!("tether_bridge_backlog_depth").set(outbound.backlog.len() as f64);
            }
        }
    }

    /// Attach or detach (`None`) the single outward consumer.
    ///
    /// On attach, the queued backlog drains in original order before any
    /// event posted after this call is delivered. Detaching resumes
    /// queueing.
    pub fn set_event_sink(&self, sink: Option<Arc<dyn EventSink>>) {
        let mut outbound = self.outbound.lock().expect("bridge lock poisoned");
        if let Some(sink) = &sink {
            let backlog_len = outbound.backlog.len();
            if backlog_len > 0 {
                debug!(backlog_len, "draining event backlog to new sink");
            }
            while let Some(event) = outbound.backlog.pop_front() {
                sink.deliver(event);
            }
            gauge!("tether_bridge_backlog_depth").set(0.0);
        }
        outbound.sink = sink;
    }

    /// Fan a command out to every registered handler, in registration
    /// order, against a snapshot of the handler list.
    pub fn on_from_web(&self, command: &WebCommand) {
        let snapshot = self.handlers.load_full();
        trace!(kind = %command.kind, handlers = snapshot.len(), "dispatching command");
        for handler in snapshot.iter() {
            handler.handle(command);
        }
    }

    /// Register a command handler. Handlers registered during a dispatch do
    /// not see the in-flight command.
    pub fn register_command_handler(&self, handler: Arc<dyn CommandHandler>) {
        self.handlers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(handler.clone());
            next
        });
    }

    /// Remove all command handlers.
    pub fn clear_command_handlers(&self) {
        self.handlers.store(Arc::new(Vec::new()));
    }

    /// Number of events currently queued (no sink attached).
    pub fn backlog_len(&self) -> usize {
        self.outbound.lock().expect("bridge lock poisoned").backlog.len()
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sink that records delivered events.
    struct RecordingSink {
        events: Mutex<Vec<WebEvent>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn kinds(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.kind.clone())
                .collect()
        }
    }

    impl EventSink for RecordingSink {
        fn deliver(&self, event: WebEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn events_queue_until_sink_attaches_then_drain_in_order() {
        let bridge = Bridge::new();
        bridge.post_to_web(WebEvent::new("e1"));
        bridge.post_to_web(WebEvent::new("e2"));
        bridge.post_to_web(WebEvent::new("e3"));
        assert_eq!(bridge.backlog_len(), 3);

        let sink = RecordingSink::new();
        bridge.set_event_sink(Some(sink.clone()));
        assert_eq!(bridge.backlog_len(), 0);

        // Posted after attach: delivered directly, after the backlog.
        bridge.post_to_web(WebEvent::new("e4"));
        assert_eq!(sink.kinds(), vec!["e1", "e2", "e3", "e4"]);
    }

    #[test]
    fn detaching_resumes_queueing() {
        let bridge = Bridge::new();
        let sink = RecordingSink::new();
        bridge.set_event_sink(Some(sink.clone()));
        bridge.post_to_web(WebEvent::new("live"));

        bridge.set_event_sink(None);
        bridge.post_to_web(WebEvent::new("queued"));
        assert_eq!(sink.kinds(), vec!["live"]);
        assert_eq!(bridge.backlog_len(), 1);

        // Re-attach drains what accumulated while detached.
        bridge.set_event_sink(Some(sink.clone()));
        assert_eq!(sink.kinds(), vec!["live", "queued"]);
    }

    #[test]
    fn commands_fan_out_in_registration_order() {
        let bridge = Bridge::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bridge.register_command_handler(Arc::new(move |_cmd: &WebCommand| {
                order.lock().unwrap().push(tag);
            }));
        }

        bridge.on_from_web(&WebCommand::new(commands::GET_OFFLINE_STATUS));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn handler_registered_during_dispatch_misses_inflight_command() {
        let bridge = Arc::new(Bridge::new());
        let late_calls = Arc::new(AtomicUsize::new(0));

        let bridge_inner = bridge.clone();
        let late_inner = late_calls.clone();
        bridge.register_command_handler(Arc::new(move |_cmd: &WebCommand| {
            // Mutating the handler list mid-dispatch must not affect the
            // snapshot being iterated.
            let late = late_inner.clone();
            bridge_inner.register_command_handler(Arc::new(move |_c: &WebCommand| {
                late.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        bridge.on_from_web(&WebCommand::new("X"));
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        bridge.on_from_web(&WebCommand::new("Y"));
        // First dispatch registered one late handler, second registered
        // another; only the first late handler saw the second command.
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_command_handlers_removes_all() {
        let bridge = Bridge::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_inner = count.clone();
        bridge.register_command_handler(Arc::new(move |_cmd: &WebCommand| {
            count_inner.fetch_add(1, Ordering::SeqCst);
        }));

        bridge.on_from_web(&WebCommand::new("X"));
        bridge.clear_command_handlers();
        bridge.on_from_web(&WebCommand::new("X"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_posts_are_all_retained() {
        let bridge = Arc::new(Bridge::new());
        let mut threads = Vec::new();
        for t in 0..8 {
            let bridge = bridge.clone();
            threads.push(std::thread::spawn(move || {
                for i in 0..100 {
                    bridge.post_to_web(WebEvent::new(format!("t{t}-{i}")));
                }
            }));
        }
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(bridge.backlog_len(), 800);

        // Per-producer FIFO order survives the drain.
        let sink = RecordingSink::new();
        bridge.set_event_sink(Some(sink.clone()));
        let kinds = sink.kinds();
        for t in 0..8 {
            let of_thread: Vec<&String> = kinds
                .iter()
                .filter(|k| k.starts_with(&format!("t{t}-")))
                .collect();
            assert_eq!(of_thread.len(), 100);
            for (i, kind) in of_thread.iter().enumerate() {
                assert_eq!(**kind, format!("t{t}-{i}"));
            }
        }
    }
}
