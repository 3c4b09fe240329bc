//! Hook Dispatcher
//!
//! 등록 순서대로 관찰자를 동기 호출합니다. 실패는 `ObserverFailure`로 감싸
//! 모은 뒤 호출자에게 돌려주며, 나머지 관찰자는 계속 실행됩니다.

use keel_foundation::Error;
use parking_lot::RwLock;
use std::sync::Arc;

use super::types::{ContextObserver, HookEvent};

/// Registered observer list
#[derive(Default)]
pub struct HookDispatcher {
    observers: RwLock<Vec<Arc<dyn ContextObserver>>>,
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn register<O: ContextObserver + 'static>(&self, observer: O) {
        self.register_arc(Arc::new(observer));
    }

    /// Register an `Arc`-wrapped observer
    pub fn register_arc(&self, observer: Arc<dyn ContextObserver>) {
        tracing::debug!(observer = observer.name(), "Observer registered");
        self.observers.write().push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Deliver an event to every observer.
    ///
    /// Returns one `ObserverFailure` per failing observer, in registration
    /// order.
    pub fn dispatch(&self, event: &HookEvent<'_>) -> Vec<Error> {
        // 관찰자가 다시 register 할 수 있도록 목록을 복사한 뒤 호출
        let observers: Vec<_> = self.observers.read().clone();
        let event_type = event.event_type();

        observers
            .iter()
            .filter_map(|observer| match observer.handle(event) {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(
                        observer = observer.name(),
                        event = %event_type,
                        error = %e,
                        "Observer failed"
                    );
                    Some(Error::observer_failure(observer.name(), event_type.as_str(), e))
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .observers
            .read()
            .iter()
            .map(|o| o.name().to_string())
            .collect();
        f.debug_struct("HookDispatcher")
            .field("observers", &names)
            .finish()
    }
}
