// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-pass dispatch over one wait set.
//!
//! [`spin_once`] runs one clear-add-wait-dispatch cycle. Ready entities are
//! dispatched guard conditions first, then subscriptions, services and
//! clients; within a kind, in the order given in [`SpinEntities`].

use crate::client::Client;
use crate::error::Result;
use crate::guard_condition::GuardCondition;
use crate::message::{MessageInfo, SerializedMessage};
use crate::rpc::RequestId;
use crate::service::Service;
use crate::subscription::Subscription;
use crate::waitset::{WaitSet, WaitStatus};
use std::time::Duration;

/// Entities taking part in one spin.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinEntities<'a> {
    pub subscriptions: &'a [&'a Subscription],
    pub services: &'a [&'a Service],
    pub clients: &'a [&'a Client],
    pub guard_conditions: &'a [&'a GuardCondition],
}

impl SpinEntities<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
            && self.services.is_empty()
            && self.clients.is_empty()
            && self.guard_conditions.is_empty()
    }
}

/// Callbacks invoked for ready entities. Indices refer to [`SpinEntities`].
pub trait SpinCallbacks {
    fn on_guard_condition(&mut self, _index: usize) {}

    fn on_message(&mut self, _index: usize, _message: &SerializedMessage, _info: &MessageInfo) {}

    /// Fill `response` for `request`; it is sent back with the request's id.
    fn on_request(
        &mut self,
        _index: usize,
        _request: &SerializedMessage,
        _response: &mut SerializedMessage,
    ) {
    }

    fn on_response(&mut self, _index: usize, _request_id: &RequestId, _response: &SerializedMessage) {}
}

/// Run one wait cycle and dispatch whatever became ready.
///
/// Returns immediately with [`WaitStatus::Timeout`] when `entities` is empty.
pub fn spin_once<C: SpinCallbacks>(
    wait_set: &mut WaitSet,
    entities: &SpinEntities<'_>,
    timeout: Option<Duration>,
    callbacks: &mut C,
) -> Result<WaitStatus> {
    if entities.is_empty() {
        return Ok(WaitStatus::Timeout);
    }

    wait_set.clear();
    for subscription in entities.subscriptions {
        wait_set.add_subscription(subscription)?;
    }
    for service in entities.services {
        wait_set.add_service(service)?;
    }
    for client in entities.clients {
        wait_set.add_client(client)?;
    }
    for guard in entities.guard_conditions {
        wait_set.add_guard_condition(guard)?;
    }

    let status = wait_set.wait(timeout)?;
    if status == WaitStatus::Timeout {
        return Ok(status);
    }

    for index in 0..entities.guard_conditions.len() {
        if wait_set.is_guard_condition_ready(index) {
            callbacks.on_guard_condition(index);
        }
    }

    let mut message = SerializedMessage::new();
    for (index, subscription) in entities.subscriptions.iter().enumerate() {
        if !wait_set.is_subscription_ready(index) {
            continue;
        }
        if let Some(info) = subscription.take(&mut message)? {
            callbacks.on_message(index, &message, &info);
        }
    }

    let mut response = SerializedMessage::new();
    for (index, service) in entities.services.iter().enumerate() {
        if !wait_set.is_service_ready(index) {
            continue;
        }
        let mut request_id = RequestId::zero();
        if service.take_request(&mut request_id, &mut message)?.is_some() {
            response.clear();
            callbacks.on_request(index, &message, &mut response);
            service.send_response(&request_id, &response)?;
        }
    }

    for (index, client) in entities.clients.iter().enumerate() {
        if !wait_set.is_client_ready(index) {
            continue;
        }
        let mut request_id = RequestId::zero();
        if client.take_response(&mut request_id, &mut message)?.is_some() {
            callbacks.on_response(index, &request_id, &message);
        }
    }

    Ok(status)
}
