// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscriptions: receive side of a topic.

use crate::condition::{Waitable, WaiterList};
use crate::error::Result;
use crate::gid::Gid;
use crate::graph::endpoints_match;
use crate::message::{MessageInfo, SerializedMessage, TypeSupport};
use crate::names;
use crate::node::{ChildGuard, Node};
use crate::qos::{HistoryPolicy, QosProfile};
use crate::queue::HistoryQueue;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sample queued on a subscription.
#[derive(Clone)]
pub(crate) struct Sample {
    pub(crate) payload: Arc<[u8]>,
    pub(crate) info: MessageInfo,
    pub(crate) published_at: Instant,
    pub(crate) lifespan: Option<Duration>,
}

impl Sample {
    pub(crate) fn is_alive(&self, now: Instant) -> bool {
        self.lifespan
            .map_or(true, |lifespan| now.saturating_duration_since(self.published_at) <= lifespan)
    }
}

pub(crate) struct SubscriptionShared {
    pub(crate) gid: Gid,
    pub(crate) topic: String,
    pub(crate) type_support: TypeSupport,
    pub(crate) qos: QosProfile,
    queue: HistoryQueue<Sample>,
    waiters: WaiterList,
}

impl SubscriptionShared {
    /// Queue a sample and wake wait sets blocked on this subscription.
    pub(crate) fn deliver(&self, sample: Sample) {
        if self.queue.push(sample).is_some() {
            log::trace!("[subscription] {} queue full, oldest sample dropped", self.gid);
        }
        self.waiters.notify_all();
    }
}

impl Waitable for SubscriptionShared {
    fn is_ready(&self) -> bool {
        !self.queue.is_empty()
    }

    fn waiters(&self) -> &WaiterList {
        &self.waiters
    }
}

/// Subscription handle.
pub struct Subscription {
    shared: Arc<SubscriptionShared>,
    parent: ChildGuard,
}

impl Subscription {
    pub(crate) fn new(
        node: &Node,
        topic: &str,
        type_support: &TypeSupport,
        qos: &QosProfile,
    ) -> Result<Self> {
        let topic = names::expand_topic_name(topic, node.name(), node.namespace())?;
        let parent = node.child_guard()?;
        let context = parent.context();

        let keep_all = qos.resolved().history() == HistoryPolicy::KeepAll;
        let shared = Arc::new(SubscriptionShared {
            gid: context.next_gid(),
            topic,
            type_support: type_support.clone(),
            qos: *qos,
            queue: HistoryQueue::new(
                qos.queue_limit(context.keep_all_limit()),
                keep_all,
            ),
            waiters: WaiterList::new(),
        });
        context.graph().add_subscription(&shared);
        log::debug!(
            "[subscription] {} created on '{}' type={} depth={}",
            shared.gid,
            shared.topic,
            shared.type_support,
            shared.queue.limit()
        );

        Ok(Self { shared, parent })
    }

    /// Take the oldest live sample into `message`.
    ///
    /// Returns `Ok(None)` when nothing is queued; a subscription reported ready
    /// by a wait set can still come up empty when its last sample expired.
    pub fn take(&self, message: &mut SerializedMessage) -> Result<Option<MessageInfo>> {
        self.parent.context().ensure_valid()?;
        let now = Instant::now();
        match self.shared.queue.pop_retained(|sample| sample.is_alive(now)) {
            Some(sample) => {
                message.fill_from(&sample.payload);
                Ok(Some(sample.info))
            }
            None => Ok(None),
        }
    }

    /// Size of the payload the next `take` would return.
    #[must_use]
    pub fn next_payload_len(&self) -> Option<usize> {
        let now = Instant::now();
        self.shared
            .queue
            .peek_retained(|sample| sample.is_alive(now), |sample| sample.payload.len())
    }

    /// Expanded topic name.
    #[must_use]
    pub fn topic_name(&self) -> &str {
        &self.shared.topic
    }

    #[must_use]
    pub fn gid(&self) -> Gid {
        self.shared.gid
    }

    #[must_use]
    pub fn qos(&self) -> &QosProfile {
        &self.shared.qos
    }

    #[must_use]
    pub fn type_support(&self) -> &TypeSupport {
        &self.shared.type_support
    }

    /// Number of publishers currently matched with this subscription.
    #[must_use]
    pub fn publisher_count(&self) -> usize {
        self.parent
            .context()
            .graph()
            .publishers(&self.shared.topic)
            .iter()
            .filter(|publisher| endpoints_match(publisher, &self.shared))
            .count()
    }

    pub(crate) fn waitable(&self) -> Arc<dyn Waitable> {
        Arc::clone(&self.shared) as Arc<dyn Waitable>
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.parent
            .context()
            .graph()
            .remove_subscription(&self.shared.topic, self.shared.gid);
        log::debug!("[subscription] {} destroyed", self.shared.gid);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("gid", &self.shared.gid)
            .field("topic", &self.shared.topic)
            .field("node", &self.parent.node_name())
            .finish()
    }
}
