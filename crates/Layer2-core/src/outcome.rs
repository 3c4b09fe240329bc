//! Operation result paired with observer failures

use keel_foundation::Error;

/// Primary result plus the observer failures collected while dispatching
/// its events
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub observer_failures: Vec<Error>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            observer_failures: Vec::new(),
        }
    }

    pub fn with_failures(value: T, observer_failures: Vec<Error>) -> Self {
        Self {
            value,
            observer_failures,
        }
    }

    /// No observer failed
    pub fn is_clean(&self) -> bool {
        self.observer_failures.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            observer_failures: self.observer_failures,
        }
    }

    pub(crate) fn absorb(&mut self, failures: Vec<Error>) {
        self.observer_failures.extend(failures);
    }
}

impl<T> std::ops::Deref for Outcome<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
