// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entity graph of the intra-process backend.
//!
//! Endpoints are indexed by topic or service name and held weakly: the public
//! handle owns the endpoint, the graph only routes to it. Lookups clone the
//! live `Arc`s out of the map so no shard lock is held while delivering.

use crate::client::ClientShared;
use crate::gid::Gid;
use crate::publisher::PublisherShared;
use crate::qos::{check_compatible, Compatibility, DurabilityPolicy};
use crate::service::ServiceShared;
use crate::subscription::SubscriptionShared;
use dashmap::DashMap;
use std::sync::{Arc, Weak};

#[derive(Default)]
struct TopicEntry {
    publishers: Vec<Weak<PublisherShared>>,
    subscriptions: Vec<Weak<SubscriptionShared>>,
}

impl TopicEntry {
    fn is_empty(&self) -> bool {
        self.publishers.is_empty() && self.subscriptions.is_empty()
    }
}

/// Whether a publisher delivers to a subscription.
pub(crate) fn endpoints_match(publisher: &PublisherShared, subscription: &SubscriptionShared) -> bool {
    publisher.type_support == subscription.type_support
        && check_compatible(&publisher.qos, &subscription.qos).is_compatible()
}

fn report_mismatch(publisher: &PublisherShared, subscription: &SubscriptionShared) {
    if publisher.type_support != subscription.type_support {
        log::warn!(
            "[graph] topic '{}': type '{}' of publisher {} does not match '{}' of subscription {}",
            publisher.topic,
            publisher.type_support,
            publisher.gid,
            subscription.type_support,
            subscription.gid
        );
        return;
    }
    if let Compatibility::Error(reason) = check_compatible(&publisher.qos, &subscription.qos) {
        log::warn!(
            "[graph] topic '{}': publisher {} and subscription {} not matched: {}",
            publisher.topic,
            publisher.gid,
            subscription.gid,
            reason
        );
    }
}

fn upgrade_all<T>(list: &[Weak<T>]) -> Vec<Arc<T>> {
    list.iter().filter_map(Weak::upgrade).collect()
}

/// Name-indexed registry of every endpoint created under one context.
pub(crate) struct Graph {
    topics: DashMap<String, TopicEntry>,
    services: DashMap<String, Vec<Weak<ServiceShared>>>,
    clients: DashMap<Gid, Weak<ClientShared>>,
    nodes: DashMap<String, usize>,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self {
            topics: DashMap::new(),
            services: DashMap::new(),
            clients: DashMap::new(),
            nodes: DashMap::new(),
        }
    }

    pub(crate) fn add_node(&self, fqn: &str) {
        let mut count = self.nodes.entry(fqn.to_string()).or_insert(0);
        *count += 1;
        if *count > 1 {
            log::warn!(
                "[graph] {} nodes share the name '{}'",
                *count,
                fqn
            );
        }
    }

    pub(crate) fn remove_node(&self, fqn: &str) {
        self.nodes.remove_if_mut(fqn, |_, count| {
            *count = count.saturating_sub(1);
            *count == 0
        });
    }

    pub(crate) fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub(crate) fn add_publisher(&self, publisher: &Arc<PublisherShared>) {
        let subscriptions = {
            let mut entry = self.topics.entry(publisher.topic.clone()).or_default();
            entry.publishers.retain(|p| p.strong_count() > 0);
            entry.publishers.push(Arc::downgrade(publisher));
            upgrade_all(&entry.subscriptions)
        };

        for subscription in &subscriptions {
            if !endpoints_match(publisher, subscription) {
                report_mismatch(publisher, subscription);
            }
        }
        log::debug!(
            "[graph] publisher {} on '{}' ({} subscriptions)",
            publisher.gid,
            publisher.topic,
            subscriptions.len()
        );
    }

    /// Register a subscription and replay transient-local history into it.
    pub(crate) fn add_subscription(&self, subscription: &Arc<SubscriptionShared>) {
        let publishers = {
            let mut entry = self.topics.entry(subscription.topic.clone()).or_default();
            entry.subscriptions.retain(|s| s.strong_count() > 0);
            entry.subscriptions.push(Arc::downgrade(subscription));
            upgrade_all(&entry.publishers)
        };

        for publisher in &publishers {
            if !endpoints_match(publisher, subscription) {
                report_mismatch(publisher, subscription);
                continue;
            }
            if subscription.qos.resolved().durability() == DurabilityPolicy::TransientLocal {
                publisher.replay_history(subscription);
            }
        }
        log::debug!(
            "[graph] subscription {} on '{}' ({} publishers)",
            subscription.gid,
            subscription.topic,
            publishers.len()
        );
    }

    pub(crate) fn remove_publisher(&self, topic: &str, gid: Gid) {
        if let Some(mut entry) = self.topics.get_mut(topic) {
            entry
                .publishers
                .retain(|p| p.upgrade().is_some_and(|p| p.gid != gid));
        }
        self.topics.remove_if(topic, |_, entry| entry.is_empty());
    }

    pub(crate) fn remove_subscription(&self, topic: &str, gid: Gid) {
        if let Some(mut entry) = self.topics.get_mut(topic) {
            entry
                .subscriptions
                .retain(|s| s.upgrade().is_some_and(|s| s.gid != gid));
        }
        self.topics.remove_if(topic, |_, entry| entry.is_empty());
    }

    pub(crate) fn subscriptions(&self, topic: &str) -> Vec<Arc<SubscriptionShared>> {
        self.topics
            .get(topic)
            .map(|entry| upgrade_all(&entry.subscriptions))
            .unwrap_or_default()
    }

    pub(crate) fn publishers(&self, topic: &str) -> Vec<Arc<PublisherShared>> {
        self.topics
            .get(topic)
            .map(|entry| upgrade_all(&entry.publishers))
            .unwrap_or_default()
    }

    pub(crate) fn add_service(&self, service: &Arc<ServiceShared>) {
        let mut entry = self.services.entry(service.name.clone()).or_default();
        entry.retain(|s| s.strong_count() > 0);
        if !entry.is_empty() {
            log::warn!(
                "[graph] service '{}' already has {} server(s); requests go to all of them",
                service.name,
                entry.len()
            );
        }
        entry.push(Arc::downgrade(service));
    }

    pub(crate) fn remove_service(&self, name: &str, gid: Gid) {
        if let Some(mut entry) = self.services.get_mut(name) {
            entry.retain(|s| s.upgrade().is_some_and(|s| s.gid != gid));
        }
        self.services.remove_if(name, |_, entry| entry.is_empty());
    }

    pub(crate) fn services(&self, name: &str) -> Vec<Arc<ServiceShared>> {
        self.services
            .get(name)
            .map(|entry| upgrade_all(&entry))
            .unwrap_or_default()
    }

    pub(crate) fn add_client(&self, client: &Arc<ClientShared>) {
        self.clients.insert(client.gid, Arc::downgrade(client));
    }

    pub(crate) fn remove_client(&self, gid: Gid) {
        self.clients.remove(&gid);
    }

    pub(crate) fn client(&self, gid: Gid) -> Option<Arc<ClientShared>> {
        self.clients.get(&gid).and_then(|weak| weak.upgrade())
    }
}
