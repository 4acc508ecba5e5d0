use super::Promise;
use super::capability::{Reject, Resolve};

use std::fmt;

/// What a callback produced, as seen by the promise it settles.
pub enum Outcome<T, E> {
    /// A plain value: fulfills.
    Value(T),

    /// An error: rejects.
    Error(E),

    /// Another promise: adopted once it settles.
    Promise(Promise<T, E>),

    /// A foreign promise-like value: adopted through its `then`.
    Thenable(Box<dyn Thenable<T, E>>),
}

impl<T, E> Outcome<T, E> {
    /// Wraps a foreign thenable.
    pub fn thenable(thenable: impl Thenable<T, E> + 'static) -> Self {
        Outcome::Thenable(Box::new(thenable))
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Outcome::Error(error) => f.debug_tuple("Error").field(error).finish(),
            Outcome::Promise(promise) => f.debug_tuple("Promise").field(&promise.cell.id()).finish(),
            Outcome::Thenable(_) => f.write_str("Thenable(..)"),
        }
    }
}

/// Conversion into an [`Outcome`].
///
/// Implemented for `Result` (the common case for callbacks), for
/// [`Promise`], and for `Outcome` itself.
pub trait IntoOutcome<T, E> {
    fn into_outcome(self) -> Outcome<T, E>;
}

impl<T, E> IntoOutcome<T, E> for Outcome<T, E> {
    fn into_outcome(self) -> Outcome<T, E> {
        self
    }
}

impl<T, E> IntoOutcome<T, E> for Result<T, E> {
    fn into_outcome(self) -> Outcome<T, E> {
        match self {
            Ok(value) => Outcome::Value(value),
            Err(error) => Outcome::Error(error),
        }
    }
}

impl<T, E> IntoOutcome<T, E> for Promise<T, E> {
    fn into_outcome(self) -> Outcome<T, E> {
        Outcome::Promise(self)
    }
}

/// A promise-like value that can be adopted.
///
/// `then` receives a fresh pair of settlement capabilities. The
/// implementation may call them any number of times, in any order, now or
/// later: only the first call has an effect. Returning `Err` rejects the
/// adopting promise, unless a capability was already called.
///
/// # Examples
///
/// ```rust,ignore
/// struct Ready(i32);
///
/// impl Thenable<i32, String> for Ready {
///     fn then(self: Box<Self>, resolve: Resolve<i32, String>, _: Reject<i32, String>) -> Result<(), String> {
///         resolve.resolve(self.0);
///         Ok(())
///     }
/// }
/// ```
pub trait Thenable<T, E> {
    fn then(self: Box<Self>, resolve: Resolve<T, E>, reject: Reject<T, E>) -> Result<(), E>;
}

impl<T, E> Thenable<T, E> for Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    fn then(self: Box<Self>, resolve: Resolve<T, E>, reject: Reject<T, E>) -> Result<(), E> {
        self.subscribe(move |settled| {
            match settled {
                Ok(value) => resolve.resolve(value),
                Err(error) => reject.reject(error),
            };
        });

        Ok(())
    }
}
