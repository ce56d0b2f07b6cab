// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clients: caller side of a request/response pair.

use crate::condition::{Waitable, WaiterList};
use crate::error::Result;
use crate::gid::Gid;
use crate::message::{MessageInfo, SerializedMessage, TypeSupport};
use crate::names;
use crate::node::{ChildGuard, Node};
use crate::qos::{HistoryPolicy, QosProfile};
use crate::queue::HistoryQueue;
use crate::rpc::{Envelope, RequestId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

pub(crate) struct ClientShared {
    pub(crate) gid: Gid,
    pub(crate) name: String,
    pub(crate) type_support: TypeSupport,
    sequence: AtomicI64,
    /// Sequence numbers of requests still waiting for a response
    pending: Mutex<HashSet<i64>>,
    responses: HistoryQueue<Envelope>,
    waiters: WaiterList,
}

impl ClientShared {
    pub(crate) fn deliver_response(&self, response: Envelope) {
        if !self.pending.lock().contains(&response.id.sequence_number) {
            log::warn!(
                "[client] '{}' dropping response {}: no outstanding request",
                self.name,
                response.id
            );
            return;
        }
        if let Some(dropped) = self.responses.push(response) {
            self.pending.lock().remove(&dropped.id.sequence_number);
            log::warn!(
                "[client] '{}' response queue full, response {} dropped",
                self.name,
                dropped.id
            );
        }
        self.waiters.notify_all();
    }
}

impl Waitable for ClientShared {
    fn is_ready(&self) -> bool {
        !self.responses.is_empty()
    }

    fn waiters(&self) -> &WaiterList {
        &self.waiters
    }
}

/// Client handle.
pub struct Client {
    shared: Arc<ClientShared>,
    qos: QosProfile,
    parent: ChildGuard,
}

impl Client {
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
        let shared = Arc::new(ClientShared {
            gid: context.next_gid(),
            name,
            type_support: type_support.clone(),
            sequence: AtomicI64::new(0),
            pending: Mutex::new(HashSet::new()),
            responses: HistoryQueue::new(qos.queue_limit(context.keep_all_limit()), keep_all),
            waiters: WaiterList::new(),
        });
        context.graph().add_client(&shared);
        log::debug!(
            "[client] {} created for '{}' type={}",
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

    /// Send a request to every server of the service.
    ///
    /// Returns the sequence number assigned to the request (starting at 1).
    pub fn send_request(&self, request: &SerializedMessage) -> Result<i64> {
        let context = self.parent.context();
        context.ensure_valid()?;

        let sequence_number = self.shared.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        let id = RequestId::new(self.shared.gid, sequence_number);

        let servers: Vec<_> = context
            .graph()
            .services(&self.shared.name)
            .into_iter()
            .filter(|service| {
                let matched = service.type_support == self.shared.type_support;
                if !matched {
                    log::warn!(
                        "[client] '{}' skipping server {}: type '{}' differs from '{}'",
                        self.shared.name,
                        service.gid,
                        service.type_support,
                        self.shared.type_support
                    );
                }
                matched
            })
            .collect();

        if servers.is_empty() {
            log::debug!(
                "[client] '{}' request {} sent with no server available",
                self.shared.name,
                sequence_number
            );
            return Ok(sequence_number);
        }

        // Recorded before delivery: a server may answer before this loop ends
        self.shared.pending.lock().insert(sequence_number);
        for service in servers {
            service.deliver_request(Envelope {
                id,
                payload: request.as_bytes().to_vec(),
                sender: self.shared.gid,
                source_timestamp: SystemTime::now(),
            });
        }
        Ok(sequence_number)
    }

    /// Take the oldest response.
    ///
    /// On success `request_id` holds the id of the request being answered and
    /// that sequence number is no longer outstanding.
    pub fn take_response(
        &self,
        request_id: &mut RequestId,
        response: &mut SerializedMessage,
    ) -> Result<Option<MessageInfo>> {
        self.parent.context().ensure_valid()?;
        let Some(envelope) = self.shared.responses.pop_retained(|_| true) else {
            return Ok(None);
        };

        self.shared.pending.lock().remove(&envelope.id.sequence_number);
        *request_id = envelope.id;
        response.fill_from(&envelope.payload);
        Ok(Some(MessageInfo {
            publisher_gid: envelope.sender,
            sequence_number: envelope.id.sequence_number,
            source_timestamp: envelope.source_timestamp,
        }))
    }

    /// Whether at least one server with the same type is registered.
    #[must_use]
    pub fn service_is_available(&self) -> bool {
        self.parent
            .context()
            .graph()
            .services(&self.shared.name)
            .iter()
            .any(|service| service.type_support == self.shared.type_support)
    }

    /// Number of requests sent and not yet answered.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.shared.pending.lock().len()
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

    /// Size of the payload the next `take_response` would return.
    #[must_use]
    pub fn next_payload_len(&self) -> Option<usize> {
        self.shared
            .responses
            .peek_retained(|_| true, |envelope| envelope.payload.len())
    }

    pub(crate) fn waitable(&self) -> Arc<dyn Waitable> {
        Arc::clone(&self.shared) as Arc<dyn Waitable>
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.parent.context().graph().remove_client(self.shared.gid);
        log::debug!("[client] {} destroyed", self.shared.gid);
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("gid", &self.shared.gid)
            .field("name", &self.shared.name)
            .field("node", &self.parent.node_name())
            .finish()
    }
}
