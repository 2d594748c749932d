/*   Copyright (c) 2020 TensorBase, and its contributors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.*/
use std::fmt;

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::Future;

use crate::errors::{Result, TargetError};
use crate::options::ConnectOptions;

/// Outcome of a deferred target computation
pub type TargetResult = std::result::Result<ConnectOptions, TargetError>;
/// Deferred target. Computed at most once, every clone observes the same outcome.
pub type PendingTarget = Shared<BoxFuture<'static, TargetResult>>;

/// Whether a target is already available or still has to be computed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetShape {
    Resolved,
    Pending,
}

impl fmt::Display for TargetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetShape::Resolved => f.write_str("resolved"),
            TargetShape::Pending => f.write_str("pending"),
        }
    }
}

/// Server a new physical connection should be opened to.
///
/// The pool receives one of these per connection it is about to create.
/// `Resolved` carries the options right away, `Pending` carries a shared
/// computation that eventually yields them or fails.
#[derive(Clone)]
pub enum Target {
    Resolved(ConnectOptions),
    Pending(PendingTarget),
}

impl Target {
    /// Wrap a computation producing connect options
    pub fn pending<F>(fut: F) -> Target
    where
        F: Future<Output = TargetResult> + Send + 'static,
    {
        Target::Pending(fut.boxed().shared())
    }

    /// A pending target that fails when resolved
    pub fn failed(err: TargetError) -> Target {
        Target::pending(futures::future::ready(Err(err)))
    }

    #[inline]
    pub fn shape(&self) -> TargetShape {
        match self {
            Target::Resolved(_) => TargetShape::Resolved,
            Target::Pending(_) => TargetShape::Pending,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.shape() == TargetShape::Resolved
    }

    #[inline]
    pub fn as_resolved(&self) -> Option<&ConnectOptions> {
        match self {
            Target::Resolved(options) => Some(options),
            Target::Pending(_) => None,
        }
    }

    /// Wait for the connect options.
    /// Resolved targets are returned without suspending.
    pub async fn resolve(self) -> Result<ConnectOptions> {
        match self {
            Target::Resolved(options) => Ok(options),
            Target::Pending(fut) => Ok(fut.await?),
        }
    }
}

impl From<ConnectOptions> for Target {
    fn from(options: ConnectOptions) -> Self {
        Target::Resolved(options)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Resolved(options) => f.debug_tuple("Resolved").field(options).finish(),
            Target::Pending(fut) => match fut.peek() {
                Some(outcome) => f.debug_tuple("Pending").field(outcome).finish(),
                None => f.write_str("Pending(..)"),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::Error;
    use futures::executor::block_on;

    #[test]
    fn test_shape() {
        let resolved: Target = ConnectOptions::new("a", 9000).into();
        assert_eq!(resolved.shape(), TargetShape::Resolved);
        assert!(resolved.is_resolved());
        assert_eq!(resolved.as_resolved().map(|o| o.host()), Some("a"));

        let pending = Target::pending(async { Ok(ConnectOptions::new("b", 9000)) });
        assert_eq!(pending.shape(), TargetShape::Pending);
        assert!(pending.as_resolved().is_none());
        assert_eq!(format!("{:?}", pending), "Pending(..)");
    }

    #[test]
    fn test_resolve() {
        let resolved: Target = ConnectOptions::new("a", 9000).into();
        assert_eq!(block_on(resolved.resolve()).unwrap().host(), "a");

        let pending = Target::pending(async { Ok(ConnectOptions::new("b", 9001)) });
        assert_eq!(block_on(pending.resolve()).unwrap().addr(), "b:9001");

        let failed = Target::failed(TargetError::Lookup("no such host".into()));
        assert_eq!(
            block_on(failed.resolve()),
            Err(Error::Target(TargetError::Lookup("no such host".into())))
        );
    }

    #[test]
    fn test_pending_is_computed_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let pending = Target::pending(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ConnectOptions::new("c", 9000))
        });

        let copy = pending.clone();
        assert_eq!(block_on(pending.resolve()).unwrap().host(), "c");
        assert_eq!(block_on(copy.resolve()).unwrap().host(), "c");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
