// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publishers: send side of a topic.

use crate::error::Result;
use crate::gid::Gid;
use crate::graph::endpoints_match;
use crate::message::{MessageInfo, SerializedMessage, TypeSupport};
use crate::names;
use crate::node::{ChildGuard, Node};
use crate::qos::{DurabilityPolicy, QosProfile};
use crate::subscription::{Sample, SubscriptionShared};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

pub(crate) struct PublisherShared {
    pub(crate) gid: Gid,
    pub(crate) topic: String,
    pub(crate) type_support: TypeSupport,
    pub(crate) qos: QosProfile,
    sequence: AtomicI64,
    /// Last `depth` samples, kept only for TRANSIENT_LOCAL publishers
    history: Option<Mutex<VecDeque<Sample>>>,
    history_depth: usize,
}

impl PublisherShared {
    /// Replay retained samples to a late-joining subscription.
    pub(crate) fn replay_history(&self, subscription: &SubscriptionShared) {
        let Some(history) = &self.history else {
            return;
        };
        let samples: Vec<Sample> = history.lock().iter().cloned().collect();
        if samples.is_empty() {
            return;
        }
        log::debug!(
            "[publisher] {} replaying {} samples to late joiner {}",
            self.gid,
            samples.len(),
            subscription.gid
        );
        for sample in samples {
            subscription.deliver(sample);
        }
    }

    fn retain(&self, sample: &Sample) {
        if let Some(history) = &self.history {
            let mut history = history.lock();
            if history.len() >= self.history_depth {
                history.pop_front();
            }
            history.push_back(sample.clone());
        }
    }
}

/// Publisher handle.
pub struct Publisher {
    shared: Arc<PublisherShared>,
    parent: ChildGuard,
}

impl Publisher {
    pub(crate) fn new(
        node: &Node,
        topic: &str,
        type_support: &TypeSupport,
        qos: &QosProfile,
    ) -> Result<Self> {
        let topic = names::expand_topic_name(topic, node.name(), node.namespace())?;
        let parent = node.child_guard()?;
        let context = parent.context();

        let transient_local = qos.resolved().durability() == DurabilityPolicy::TransientLocal;
        let shared = Arc::new(PublisherShared {
            gid: context.next_gid(),
            topic,
            type_support: type_support.clone(),
            qos: *qos,
            sequence: AtomicI64::new(0),
            history: transient_local.then(|| Mutex::new(VecDeque::new())),
            history_depth: qos.queue_limit(context.keep_all_limit()),
        });
        context.graph().add_publisher(&shared);
        log::debug!(
            "[publisher] {} created on '{}' type={} transient_local={}",
            shared.gid,
            shared.topic,
            shared.type_support,
            transient_local
        );

        Ok(Self { shared, parent })
    }

    /// Deliver `message` to every matched subscription.
    ///
    /// Returns the number of subscriptions reached.
    pub fn publish(&self, message: &SerializedMessage) -> Result<usize> {
        let context = self.parent.context();
        context.ensure_valid()?;

        let sequence_number = self.shared.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        let sample = Sample {
            payload: Arc::from(message.as_bytes()),
            info: MessageInfo {
                publisher_gid: self.shared.gid,
                sequence_number,
                source_timestamp: SystemTime::now(),
            },
            published_at: Instant::now(),
            lifespan: self.shared.qos.lifespan().to_duration(),
        };
        self.shared.retain(&sample);

        let mut delivered = 0;
        for subscription in context.graph().subscriptions(&self.shared.topic) {
            if endpoints_match(&self.shared, &subscription) {
                subscription.deliver(sample.clone());
                delivered += 1;
            }
        }
        log::trace!(
            "[publisher] {} seq={} len={} delivered to {}",
            self.shared.gid,
            sequence_number,
            message.len(),
            delivered
        );
        Ok(delivered)
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

    /// Number of subscriptions currently matched with this publisher.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.parent
            .context()
            .graph()
            .subscriptions(&self.shared.topic)
            .iter()
            .filter(|subscription| endpoints_match(&self.shared, subscription))
            .count()
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.parent
            .context()
            .graph()
            .remove_publisher(&self.shared.topic, self.shared.gid);
        log::debug!("[publisher] {} destroyed", self.shared.gid);
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("gid", &self.shared.gid)
            .field("topic", &self.shared.topic)
            .field("node", &self.parent.node_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextOptions;
    use crate::context::Context;
    use crate::qos::{HistoryPolicy, LivelinessPolicy, QosDuration, ReliabilityPolicy};
    use std::time::Duration;

    fn setup() -> (Context, Node, TypeSupport) {
        let context = Context::isolated(ContextOptions::default()).expect("context");
        let node = context.create_node("pub_test", "/unit").expect("node");
        (context, node, TypeSupport::named("test/msg/Bytes"))
    }

    fn profile(
        depth: usize,
        durability: DurabilityPolicy,
        lifespan: QosDuration,
    ) -> QosProfile {
        let mut qos = QosProfile::default();
        qos.write(
            HistoryPolicy::KeepLast,
            depth,
            ReliabilityPolicy::Reliable,
            durability,
            QosDuration::UNSPECIFIED,
            lifespan,
            LivelinessPolicy::Automatic,
            QosDuration::UNSPECIFIED,
            false,
        );
        qos
    }

    #[test]
    fn publish_counts_matched_subscriptions() {
        let (_context, node, ts) = setup();
        let publisher = node.create_publisher("data", &ts).expect("publisher");
        assert_eq!(publisher.topic_name(), "/unit/data");
        assert_eq!(publisher.publish(&SerializedMessage::from_bytes(b"x")).expect("publish"), 0);

        let sub_a = node.create_subscription("data", &ts).expect("sub a");
        let _sub_b = node.create_subscription("/unit/data", &ts).expect("sub b");
        let other_type = TypeSupport::named("test/msg/Other");
        let _mismatched = node.create_subscription("data", &other_type).expect("sub c");

        assert_eq!(publisher.subscription_count(), 2);
        assert_eq!(sub_a.publisher_count(), 1);
        assert_eq!(publisher.publish(&SerializedMessage::from_bytes(b"y")).expect("publish"), 2);

        let mut msg = SerializedMessage::new();
        let info = sub_a.take(&mut msg).expect("take").expect("sample");
        assert_eq!(msg.as_bytes(), b"y");
        assert_eq!(info.publisher_gid, publisher.gid());
        assert_eq!(info.sequence_number, 2);
    }

    #[test]
    fn keep_last_depth_drops_oldest() {
        let (_context, node, ts) = setup();
        let publisher = node.create_publisher("depth", &ts).expect("publisher");
        let qos = profile(2, DurabilityPolicy::Volatile, QosDuration::UNSPECIFIED);
        let subscription = node
            .create_subscription_with_qos("depth", &ts, &qos)
            .expect("subscription");

        for payload in [b"1", b"2", b"3"] {
            publisher.publish(&SerializedMessage::from_bytes(payload)).expect("publish");
        }

        let mut msg = SerializedMessage::new();
        subscription.take(&mut msg).expect("take").expect("first");
        assert_eq!(msg.as_bytes(), b"2");
        subscription.take(&mut msg).expect("take").expect("second");
        assert_eq!(msg.as_bytes(), b"3");
        assert!(subscription.take(&mut msg).expect("take").is_none());
    }

    #[test]
    fn transient_local_replays_to_late_joiner() {
        let (_context, node, ts) = setup();
        let latched = profile(2, DurabilityPolicy::TransientLocal, QosDuration::UNSPECIFIED);
        let publisher = node
            .create_publisher_with_qos("latched", &ts, &latched)
            .expect("publisher");
        for payload in [b"a", b"b", b"c"] {
            publisher.publish(&SerializedMessage::from_bytes(payload)).expect("publish");
        }

        let late = node
            .create_subscription_with_qos("latched", &ts, &latched)
            .expect("late subscription");
        assert_eq!(late.next_payload_len(), Some(1));

        let mut msg = SerializedMessage::new();
        late.take(&mut msg).expect("take").expect("replayed b");
        assert_eq!(msg.as_bytes(), b"b");
        late.take(&mut msg).expect("take").expect("replayed c");
        assert_eq!(msg.as_bytes(), b"c");

        let volatile = node.create_subscription("latched", &ts).expect("volatile");
        assert!(volatile.next_payload_len().is_none());
    }

    #[test]
    fn expired_samples_are_discarded() {
        let (_context, node, ts) = setup();
        let short = profile(
            10,
            DurabilityPolicy::Volatile,
            QosDuration::from(Duration::from_millis(1)),
        );
        let publisher = node
            .create_publisher_with_qos("short", &ts, &short)
            .expect("publisher");
        let subscription = node.create_subscription("short", &ts).expect("subscription");

        publisher.publish(&SerializedMessage::from_bytes(b"stale")).expect("publish");
        std::thread::sleep(Duration::from_millis(20));

        let mut msg = SerializedMessage::new();
        assert!(subscription.take(&mut msg).expect("take").is_none());
    }

    #[test]
    fn dropped_subscription_stops_receiving() {
        let (_context, node, ts) = setup();
        let publisher = node.create_publisher("gone", &ts).expect("publisher");
        let subscription = node.create_subscription("gone", &ts).expect("subscription");
        assert_eq!(publisher.subscription_count(), 1);

        drop(subscription);
        assert_eq!(publisher.subscription_count(), 0);
        assert_eq!(node.child_count(), 1);
    }
}
