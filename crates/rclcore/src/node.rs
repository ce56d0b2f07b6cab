// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Nodes: named parents of publishers, subscriptions, services and clients.

use crate::client::Client;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::message::TypeSupport;
use crate::names;
use crate::publisher::Publisher;
use crate::qos::QosProfile;
use crate::service::Service;
use crate::subscription::Subscription;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub(crate) struct NodeShared {
    pub(crate) name: String,
    pub(crate) namespace: String,
    fqn: String,
    pub(crate) context: Context,
    children: AtomicUsize,
}

impl Drop for NodeShared {
    fn drop(&mut self) {
        self.context.graph().remove_node(&self.fqn);
        log::debug!("[node] {} released", self.fqn);
    }
}

/// Keeps the parent node's child count accurate for the entity's lifetime.
pub(crate) struct ChildGuard {
    node: Arc<NodeShared>,
}

impl ChildGuard {
    fn new(node: &Arc<NodeShared>) -> Self {
        node.children.fetch_add(1, Ordering::AcqRel);
        Self {
            node: Arc::clone(node),
        }
    }

    pub(crate) fn node_name(&self) -> &str {
        &self.node.name
    }

    pub(crate) fn context(&self) -> &Context {
        &self.node.context
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.node.children.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Node handle.
pub struct Node {
    shared: Arc<NodeShared>,
}

/// Returned by [`Node::destroy`] when entities created under the node are
/// still alive. Carries the node back so the caller can retry later.
#[derive(Error)]
#[error("node '{}' still owns {} entities", .node.fully_qualified_name(), .node.child_count())]
pub struct NodeInUse {
    node: Node,
}

impl NodeInUse {
    /// Take the node back.
    pub fn into_inner(self) -> Node {
        self.node
    }
}

impl fmt::Debug for NodeInUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInUse").field("node", &self.node).finish()
    }
}

impl From<NodeInUse> for Error {
    fn from(err: NodeInUse) -> Self {
        Error::NodeInUse {
            node: err.node.fully_qualified_name().to_string(),
            children: err.node.child_count(),
        }
    }
}

impl Node {
    /// Create a node under `context`.
    ///
    /// The namespace may be empty (root) or relative, in which case it is made
    /// absolute.
    pub fn new(context: &Context, name: &str, namespace: &str) -> Result<Self> {
        context.ensure_valid()?;
        names::validate_node_name(name)?;
        let namespace = names::normalize_namespace(namespace)?;
        let fqn = names::fully_qualified_node_name(name, &namespace);

        context.graph().add_node(&fqn);
        log::debug!("[node] created {}", fqn);

        Ok(Self {
            shared: Arc::new(NodeShared {
                name: name.to_string(),
                namespace,
                fqn,
                context: context.clone(),
                children: AtomicUsize::new(0),
            }),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.shared.namespace
    }

    #[must_use]
    pub fn fully_qualified_name(&self) -> &str {
        &self.shared.fqn
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.shared.context
    }

    /// Number of live publishers, subscriptions, services and clients.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.shared.children.load(Ordering::Acquire)
    }

    /// Fully-qualified names of every node in this node's context.
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        self.shared.context.graph().node_names()
    }

    /// Destroy the node; fails while child entities are alive.
    pub fn destroy(self) -> std::result::Result<(), NodeInUse> {
        if self.child_count() > 0 {
            log::debug!(
                "[node] destroy refused for {}: {} children alive",
                self.shared.fqn,
                self.child_count()
            );
            return Err(NodeInUse { node: self });
        }
        drop(self);
        Ok(())
    }

    pub(crate) fn child_guard(&self) -> Result<ChildGuard> {
        self.shared.context.ensure_valid()?;
        Ok(ChildGuard::new(&self.shared))
    }

    pub fn create_publisher(&self, topic: &str, type_support: &TypeSupport) -> Result<Publisher> {
        Publisher::new(self, topic, type_support, &QosProfile::default())
    }

    pub fn create_publisher_with_qos(
        &self,
        topic: &str,
        type_support: &TypeSupport,
        qos: &QosProfile,
    ) -> Result<Publisher> {
        Publisher::new(self, topic, type_support, qos)
    }

    pub fn create_subscription(
        &self,
        topic: &str,
        type_support: &TypeSupport,
    ) -> Result<Subscription> {
        Subscription::new(self, topic, type_support, &QosProfile::default())
    }

    pub fn create_subscription_with_qos(
        &self,
        topic: &str,
        type_support: &TypeSupport,
        qos: &QosProfile,
    ) -> Result<Subscription> {
        Subscription::new(self, topic, type_support, qos)
    }

    pub fn create_service(&self, service: &str, type_support: &TypeSupport) -> Result<Service> {
        Service::new(self, service, type_support, &QosProfile::services_default())
    }

    pub fn create_service_with_qos(
        &self,
        service: &str,
        type_support: &TypeSupport,
        qos: &QosProfile,
    ) -> Result<Service> {
        Service::new(self, service, type_support, qos)
    }

    pub fn create_client(&self, service: &str, type_support: &TypeSupport) -> Result<Client> {
        Client::new(self, service, type_support, &QosProfile::services_default())
    }

    pub fn create_client_with_qos(
        &self,
        service: &str,
        type_support: &TypeSupport,
        qos: &QosProfile,
    ) -> Result<Client> {
        Client::new(self, service, type_support, qos)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("fqn", &self.shared.fqn)
            .field("children", &self.child_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextOptions;

    fn context() -> Context {
        Context::isolated(ContextOptions::default()).expect("context")
    }

    #[test]
    fn node_names_are_validated_and_qualified() {
        let context = context();
        let node = Node::new(&context, "talker", "robot").expect("node");
        assert_eq!(node.name(), "talker");
        assert_eq!(node.namespace(), "/robot");
        assert_eq!(node.fully_qualified_name(), "/robot/talker");

        assert!(matches!(
            Node::new(&context, "bad name", ""),
            Err(Error::InvalidNodeName { .. })
        ));
        assert!(matches!(
            Node::new(&context, "ok", "/trailing/"),
            Err(Error::InvalidNamespace { .. })
        ));
    }

    #[test]
    fn destroy_refused_while_children_alive() {
        let context = context();
        let node = context.create_node("owner", "").expect("node");
        let ts = TypeSupport::named("test/msg/Empty");
        let publisher = node.create_publisher("chatter", &ts).expect("publisher");
        assert_eq!(node.child_count(), 1);

        let err = node.destroy().expect_err("child alive");
        assert_eq!(err.to_string(), "node '/owner' still owns 1 entities");
        let node = err.into_inner();

        drop(publisher);
        assert_eq!(node.child_count(), 0);
        node.destroy().expect("destroy after children");
    }

    #[test]
    fn node_registry_tracks_lifetimes() {
        let context = context();
        let a = context.create_node("a", "").expect("a");
        let b = context.create_node("b", "/ns").expect("b");
        assert_eq!(a.node_names(), vec!["/a".to_string(), "/ns/b".to_string()]);

        b.destroy().expect("destroy b");
        assert_eq!(a.node_names(), vec!["/a".to_string()]);
    }

    #[test]
    fn creation_fails_after_shutdown() {
        let context = context();
        let node = context.create_node("late", "").expect("node");
        context.shutdown().expect("shutdown");

        assert!(matches!(context.create_node("later", ""), Err(Error::NotInit)));
        let ts = TypeSupport::named("test/msg/Empty");
        assert!(matches!(node.create_publisher("chatter", &ts), Err(Error::NotInit)));
    }
}
