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
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ConfigError;
use crate::target::{Target, TargetShape};

/// Source of targets for new physical connections.
///
/// Called by the pool each time it is about to open a connection, possibly
/// from several tasks at once.
pub trait TargetProvider: Send + Sync {
    fn next_target(&self) -> Target;
}

impl<F> TargetProvider for F
where
    F: Fn() -> Target + Send + Sync,
{
    #[inline]
    fn next_target(&self) -> Target {
        self()
    }
}

/// Position in a cyclic list of fixed length.
///
/// `advance` reads the current position and moves to the next one in a
/// single atomic step, wrapping to 0 after the last index. Concurrent
/// callers always get distinct consecutive positions.
pub struct Cursor {
    pos: AtomicUsize,
    len: NonZeroUsize,
}

impl Cursor {
    pub fn new(len: NonZeroUsize) -> Cursor {
        Cursor {
            pos: AtomicUsize::new(0),
            len,
        }
    }

    /// Return the current position and step to the next one
    #[inline]
    pub fn advance(&self) -> usize {
        let len = self.len.get();
        let step = |i: usize| Some(if i + 1 >= len { 0 } else { i + 1 });
        match self.pos.fetch_update(Ordering::AcqRel, Ordering::Acquire, step) {
            Ok(i) | Err(i) => i,
        }
    }

    /// Position the next `advance` will return
    #[inline]
    pub fn position(&self) -> usize {
        self.pos.load(Ordering::Acquire)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len.get()
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.position())
            .field("len", &self.len)
            .finish()
    }
}

/// Built-in provider: hands out the configured targets in list order,
/// starting over after the last one.
///
/// No weighting, no health checks, failed targets are not skipped.
/// The pool or a custom provider has to take care of that.
#[derive(Debug)]
pub struct RoundRobin {
    targets: Box<[Target]>,
    cursor: Cursor,
}

impl RoundRobin {
    /// Fails if `targets` is empty or mixes resolved and pending targets.
    pub fn new(targets: Vec<Target>) -> Result<RoundRobin, ConfigError> {
        let len = NonZeroUsize::new(targets.len()).ok_or(ConfigError::EmptyTargetList)?;

        let expected = targets[0].shape();
        if let Some((index, found)) = targets
            .iter()
            .map(Target::shape)
            .enumerate()
            .find(|(_, shape)| *shape != expected)
        {
            return Err(ConfigError::HeterogeneousTargetShapes {
                index,
                expected,
                found,
            });
        }

        Ok(RoundRobin {
            targets: targets.into_boxed_slice(),
            cursor: Cursor::new(len),
        })
    }

    #[inline]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Common shape of all targets
    #[inline]
    pub fn shape(&self) -> TargetShape {
        self.targets[0].shape()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }
}

impl TargetProvider for RoundRobin {
    fn next_target(&self) -> Target {
        let idx = self.cursor.advance();
        log::trace!("round robin picked target #{} of {}", idx, self.len());
        self.targets[idx].clone()
    }
}
