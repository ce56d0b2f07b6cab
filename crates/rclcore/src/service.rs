// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Services: server side of a request/response pair.

use crate::condition::{Waitable, WaiterList};
use crate::error::Result;
use crate::gid::Gid;
use crate::message::{MessageInfo, SerializedMessage, TypeSupport};
use crate::names;
use crate::node::{ChildGuard, Node};
use crate::qos::{HistoryPolicy, QosProfile};
use crate::queue::HistoryQueue;
use crate::rpc::{Envelope, RequestId};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

pub(crate) struct ServiceShared {
    pub(crate) gid: Gid,
    pub(crate) name: String,
    pub(crate) type_support: TypeSupport,
    requests: HistoryQueue<Envelope>,
    waiters: WaiterList,
}

impl ServiceShared {
    pub(crate) fn deliver_request(&self, request: Envelope) {
        if self.requests.push(request).is_some() {
            log::warn!("[service] '{}' request queue full, oldest request dropped", self.name);
        }
        self.waiters.notify_all();
    }
}

impl Waitable for ServiceShared {
    fn is_ready(&self) -> bool {
        !self.requests.is_empty()
    }

    fn waiters(&self) -> &WaiterList {
        &self.waiters
    }
}

/// Service handle.
pub struct Service {
    shared: Arc<ServiceShared>,
    qos: QosProfile,
    parent: ChildGuard,
}

impl Service {
    pub(crate) fn new(
        node: &Node,
        service: &str,
        type_support: &TypeSupport,
        qos: &QosProfile,
    ) -> Result<Self> {
        let name = names::expand_service_name(service, node.name(), node.namespace())?;
        let parent = node.child_guard()?;
        let context = parent.context();

        let keep_all = qos.resolved().history() == HistoryPolicy::KeepAll;
        let shared = Arc::new(ServiceShared {
            gid: context.next_gid(),
            name,
            type_support: type_support.clone(),
            requests: HistoryQueue::new(qos.queue_limit(context.keep_all_limit()), keep_all),
            waiters: WaiterList::new(),
        });
        context.graph().add_service(&shared);
        log::debug!(
            "[service] {} created for '{}' type={}",
            shared.gid,
            shared.name,
            shared.type_support
        );

        Ok(Self {
            shared,
            qos: *qos,
            parent,
        })
    }

    /// Take the oldest pending request.
    ///
    /// On success `request_id` holds the correlation key that must be passed
    /// unchanged to [`Service::send_response`].
    pub fn take_request(
        &self,
        request_id: &mut RequestId,
        request: &mut SerializedMessage,
    ) -> Result<Option<MessageInfo>> {
        self.parent.context().ensure_valid()?;
        let Some(envelope) = self.shared.requests.pop_retained(|_| true) else {
            return Ok(None);
        };

        *request_id = envelope.id;
        request.fill_from(&envelope.payload);
        Ok(Some(MessageInfo {
            publisher_gid: envelope.sender,
            sequence_number: envelope.id.sequence_number,
            source_timestamp: envelope.source_timestamp,
        }))
    }

    /// Route a response back to the client identified by `request_id`.
    ///
    /// A client that no longer exists is not an error; the response is dropped.
    pub fn send_response(&self, request_id: &RequestId, response: &SerializedMessage) -> Result<()> {
        let context = self.parent.context();
        context.ensure_valid()?;

        let Some(client) = context.graph().client(request_id.writer_gid) else {
            log::debug!(
                "[service] '{}' response for {} dropped: client is gone",
                self.shared.name,
                request_id
            );
            return Ok(());
        };

        client.deliver_response(Envelope {
            id: *request_id,
            payload: response.as_bytes().to_vec(),
            sender: self.shared.gid,
            source_timestamp: SystemTime::now(),
        });
        Ok(())
    }

    /// Expanded service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.shared.name
    }

    #[must_use]
    pub fn gid(&self) -> Gid {
        self.shared.gid
    }

    #[must_use]
    pub fn qos(&self) -> &QosProfile {
        &self.qos
    }

    /// Size of the payload the next `take_request` would return.
    #[must_use]
    pub fn next_payload_len(&self) -> Option<usize> {
        self.shared
            .requests
            .peek_retained(|_| true, |envelope| envelope.payload.len())
    }

    pub(crate) fn waitable(&self) -> Arc<dyn Waitable> {
        Arc::clone(&self.shared) as Arc<dyn Waitable>
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        self.parent
            .context()
            .graph()
            .remove_service(&self.shared.name, self.shared.gid);
        log::debug!("[service] {} destroyed", self.shared.gid);
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("gid", &self.shared.gid)
            .field("name", &self.shared.name)
            .field("node", &self.parent.node_name())
            .finish()
    }
}
