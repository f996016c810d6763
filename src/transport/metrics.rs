//! Per-transport traffic counters

use std::time::Duration;

use crate::protocol::MessageType;

const NANOSECONDS_PER_MICROSECOND: u128 = 1_000;

/// Per-type frame counters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTypeCounters {
    /// START frames
    pub start: u64,
    /// STOP frames
    pub stop: u64,
    /// INFO frames
    pub info: u64,
    /// MERGE_FILE frames
    pub merge_file: u64,
    /// PARSE_STRING frames
    pub parse_string: u64,
    /// PARAMETER frames
    pub parameter: u64,
    /// PARAMETER_QUERY frames
    pub parameter_query: u64,
    /// CONNECT frames
    pub connect: u64,
    /// Frames whose type code this client does not know
    pub other: u64,
}

impl MessageTypeCounters {
    fn increment(&mut self, msg_type: Option<MessageType>) {
        use MessageType::*;

        let counter = match msg_type {
            Some(Start) => &mut self.start,
            Some(Stop) => &mut self.stop,
            Some(Info) => &mut self.info,
            Some(MergeFile) => &mut self.merge_file,
            Some(ParseString) => &mut self.parse_string,
            Some(Parameter) => &mut self.parameter,
            Some(ParameterQuery) => &mut self.parameter_query,
            Some(Connect) => &mut self.connect,
            None => &mut self.other,
        };
        *counter += 1;
    }

    /// Count recorded for `msg_type`.
    #[must_use]
    pub fn get(&self, msg_type: MessageType) -> u64 {
        use MessageType::*;

        match msg_type {
            Start => self.start,
            Stop => self.stop,
            Info => self.info,
            MergeFile => self.merge_file,
            ParseString => self.parse_string,
            Parameter => self.parameter,
            ParameterQuery => self.parameter_query,
            Connect => self.connect,
        }
    }
}

/// Direction of message flow for counting.
#[derive(Clone, Copy)]
pub(crate) enum MessageDirection {
    Sent,
    Received,
}

/// Counters owned by one transport.
///
/// A transport has exactly one owner, so plain integers suffice.
#[derive(Default, Debug, Clone)]
pub(crate) struct Metrics {
    snapshot: MetricsSnapshot,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_message(
        &mut self,
        direction: MessageDirection,
        msg_type: Option<MessageType>,
        payload_len: usize,
        elapsed: Duration,
    ) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let bytes = payload_len as u64;
        let s = &mut self.snapshot;

        match direction {
            MessageDirection::Sent => {
                s.sent_messages += 1;
                s.sent_bytes += bytes;
                s.sent_by_type.increment(msg_type);
                s.send_latency_total_ns = s.send_latency_total_ns.saturating_add(nanos);
                s.send_latency_max_ns = s.send_latency_max_ns.max(nanos);
            }
            MessageDirection::Received => {
                s.received_messages += 1;
                s.received_bytes += bytes;
                s.received_by_type.increment(msg_type);
                s.recv_latency_total_ns = s.recv_latency_total_ns.saturating_add(nanos);
                s.recv_latency_max_ns = s.recv_latency_max_ns.max(nanos);
            }
        }
    }

    #[inline]
    pub(crate) fn record_error(&mut self) {
        self.snapshot.total_errors += 1;
    }

    #[inline]
    pub(crate) fn totals(&self) -> MetricsSnapshot {
        self.snapshot
    }
}

/// Lightweight snapshot of a transport's counters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Frames written
    pub sent_messages: u64,
    /// Frames read
    pub received_messages: u64,
    /// Payload bytes only, headers excluded
    pub sent_bytes: u64,
    /// Payload bytes read
    pub received_bytes: u64,
    /// Frames written, by type
    pub sent_by_type: MessageTypeCounters,
    /// Frames read, by type
    pub received_by_type: MessageTypeCounters,
    /// Failed sends and receives
    pub total_errors: u64,
    /// Sum of send durations
    pub send_latency_total_ns: u64,
    /// Longest send
    pub send_latency_max_ns: u64,
    /// Sum of receive durations
    pub recv_latency_total_ns: u64,
    /// Longest receive
    pub recv_latency_max_ns: u64,
}

impl MetricsSnapshot {
    /// Frames moved in either direction.
    #[must_use]
    pub fn total_messages(&self) -> u64 {
        self.sent_messages + self.received_messages
    }

    /// Average send latency in microseconds.
    #[must_use]
    pub fn avg_send_latency_us(&self) -> Option<u64> {
        average_microseconds(self.send_latency_total_ns, self.sent_messages)
    }

    /// Average receive latency in microseconds.
    ///
    /// Includes the time spent blocked waiting for the host.
    #[must_use]
    pub fn avg_receive_latency_us(&self) -> Option<u64> {
        average_microseconds(self.recv_latency_total_ns, self.received_messages)
    }
}

fn average_microseconds(total_ns: u64, count: u64) -> Option<u64> {
    if count == 0 {
        return None;
    }

    let total_ns_u128 = u128::from(total_ns);
    Some((total_ns_u128 / (u128::from(count) * NANOSECONDS_PER_MICROSECOND)) as u64)
}
