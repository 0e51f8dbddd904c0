//! Live update demultiplexer.
//!
//! Inbound messages fall into three buckets: the server's welcome frame,
//! echoes of this client's own mutations, and genuine remote changes. Only
//! the last bucket reaches the pipeline. While a bootstrap or delta catch-up
//! is running, remote changes are buffered and replayed once the store is
//! current.

use std::collections::VecDeque;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::sync::pipeline::MutationPipeline;
use crate::types::mutation::MutationEnvelope;
use crate::types::wire::LiveMessage;

pub struct LiveDemultiplexer {
    client_id: String,
    pipeline: MutationPipeline,
    buffering: bool,
    pending: VecDeque<MutationEnvelope>,
}

impl LiveDemultiplexer {
    pub fn new(pipeline: MutationPipeline) -> Self {
        Self {
            client_id: Uuid::new_v4().to_string(),
            pipeline,
            // Nothing may touch the store before the coordinator says the
            // local state is current.
            buffering: true,
            pending: VecDeque::new(),
        }
    }

    /// The id stamped on outgoing mutations so our own echoes are
    /// recognizable.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn handle(&mut self, message: &LiveMessage) {
        if message.event_type == "welcome" {
            debug!("live stream welcome received");
            return;
        }
        if message.client_id == self.client_id {
            debug!(sync_id = ?message.sync_id, "ignoring echo of own mutation");
            return;
        }
        if let Some(sync_id) = &message.sync_id {
            // Cursor advancement belongs to bootstrap and delta alone.
            debug!(sync_id = %sync_id, "live message sync id noted, cursor unchanged");
        }

        let mut envelope = MutationEnvelope::new(
            &message.operation,
            &message.collection,
            message.data.clone(),
        );
        envelope.array_operation = message
            .data
            .get("arrayOperation")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        if self.buffering {
            self.pending.push_back(envelope);
            return;
        }
        self.dispatch(envelope);
    }

    /// Catch-up finished: drain whatever queued up, then apply inline.
    pub fn set_live(&mut self) {
        self.buffering = false;
        while let Some(envelope) = self.pending.pop_front() {
            self.dispatch(envelope);
        }
    }

    /// Back to buffering; queued messages from the old session are dropped.
    pub fn stop(&mut self) {
        self.buffering = true;
        self.pending.clear();
    }

    fn dispatch(&self, envelope: MutationEnvelope) {
        if let Err(err) = self.pipeline.apply(&envelope) {
            warn!(
                collection = %envelope.collection,
                operation = %envelope.operation,
                error = %err,
                "live mutation failed to apply"
            );
        }
    }
}
