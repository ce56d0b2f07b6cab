// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded per-endpoint queue honoring the history policy.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// FIFO bounded by KEEP_LAST depth or the KEEP_ALL resource limit.
///
/// When full, the oldest item is dropped to make room.
pub(crate) struct HistoryQueue<T> {
    items: Mutex<VecDeque<T>>,
    limit: usize,
    keep_all: bool,
}

impl<T> HistoryQueue<T> {
    pub(crate) fn new(limit: usize, keep_all: bool) -> Self {
        let limit = limit.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(limit.min(64))),
            limit,
            keep_all,
        }
    }

    /// Append an item; returns the oldest one if it was evicted.
    pub(crate) fn push(&self, item: T) -> Option<T> {
        let mut items = self.items.lock();
        let evicted = if items.len() >= self.limit {
            items.pop_front()
        } else {
            None
        };
        items.push_back(item);

        if evicted.is_some() && self.keep_all {
            log::warn!(
                "[queue] KEEP_ALL limit of {} reached, dropping oldest sample",
                self.limit
            );
        }
        evicted
    }

    /// Pop the oldest item, discarding leading items rejected by `keep`.
    pub(crate) fn pop_retained<F>(&self, mut keep: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut items = self.items.lock();
        while let Some(item) = items.pop_front() {
            if keep(&item) {
                return Some(item);
            }
        }
        None
    }

    /// Inspect the oldest item retained by `keep` without removing it.
    pub(crate) fn peek_retained<R, K, F>(&self, mut keep: K, f: F) -> Option<R>
    where
        K: FnMut(&T) -> bool,
        F: FnOnce(&T) -> R,
    {
        let mut items = self.items.lock();
        while let Some(front) = items.front() {
            if keep(front) {
                break;
            }
            items.pop_front();
        }
        items.front().map(f)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }
}
