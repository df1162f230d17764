//! Packet analyser: groups observed packets by structural signature and
//! accumulates per-group statistics (§4.4).
//!
//! Grounded on the teacher's per-device statistics registry
//! (`instrumentation::stats::DeviceStats`, keyed by device id, tracking
//! counts and windowed rates) generalized from a device-id key to a
//! structural signature key.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::codec::Packet;

/// A group of packets sharing the same structural signature (§3, §4.4).
#[derive(Debug, Clone)]
pub struct PacketGroup {
    pub signature: String,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub example: Packet,
    all: Vec<Packet>,
    retention: Option<usize>,
}

impl PacketGroup {
    fn new(packet: Packet, retention: Option<usize>) -> Self {
        let signature = signature_of(&packet);
        Self {
            signature,
            count: 1,
            first_seen: packet.timestamp,
            last_seen: packet.timestamp,
            example: packet.clone(),
            all: vec![packet],
            retention,
        }
    }

    fn observe(&mut self, packet: Packet) {
        self.count += 1;
        self.last_seen = packet.timestamp;
        self.all.push(packet);
        if let Some(cap) = self.retention {
            while self.all.len() > cap {
                self.all.remove(0);
            }
        }
    }

    /// All retained packets for this group, oldest first. May be a subset
    /// of `count` when a retention bound is configured (§4.4).
    pub fn all(&self) -> &[Packet] {
        &self.all
    }
}

/// The canonical structural signature of a packet (§4.4): a pure function
/// of source, destination, data type, and the ordered message ids — two
/// packets differing only in `value` fields or timestamps share a signature.
pub fn signature_of(packet: &Packet) -> String {
    let ids = packet.message_id_hexes().join(",");
    format!(
        "{}->{}:{}:[{}]",
        packet.source.dotted_hex(),
        packet.destination.dotted_hex(),
        packet.command.data_type,
        ids
    )
}

/// Aggregate total/unique-group counters (§4.4 `stats()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyserStats {
    pub total: u64,
    pub groups: usize,
}

/// One rendered entry of `report()` (§4.4).
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub signature: String,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub example_rendering: String,
    pub timestamps: Option<Vec<DateTime<Utc>>>,
}

/// Groups decoded packets by signature and tracks per-group statistics.
pub struct PacketAnalyser {
    groups: HashMap<String, PacketGroup>,
    total: u64,
    /// Per-group bound on `all`; `None` means unbounded (§4.4 "Retention").
    retention: Option<usize>,
}

impl PacketAnalyser {
    /// Create an analyser with unbounded per-group history retention.
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            total: 0,
            retention: None,
        }
    }

    /// Create an analyser that retains at most `retention` packets per
    /// group, evicting the oldest first. `count`/`last_seen` still reflect
    /// true totals regardless of eviction.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            groups: HashMap::new(),
            total: 0,
            retention: Some(retention),
        }
    }

    /// Observe a decoded packet: increment totals and fold it into its
    /// signature's group, creating the group on first sighting.
    pub fn observe(&mut self, packet: Packet) {
        self.total += 1;
        let sig = signature_of(&packet);
        self.groups
            .entry(sig)
            .and_modify(|g| g.observe(packet.clone()))
            .or_insert_with(|| PacketGroup::new(packet, self.retention));
    }

    /// Total packets observed and number of distinct groups.
    pub fn stats(&self) -> AnalyserStats {
        AnalyserStats {
            total: self.total,
            groups: self.groups.len(),
        }
    }

    /// Direct access to a group by signature, if it exists.
    pub fn group(&self, signature: &str) -> Option<&PacketGroup> {
        self.groups.get(signature)
    }

    /// Groups sorted by count descending, ties broken by `first_seen`
    /// ascending, rendered for display (§4.4 `report()`).
    pub fn report(&self) -> Vec<ReportEntry> {
        const MAX_LISTED_TIMESTAMPS: usize = 10;

        let mut groups: Vec<&PacketGroup> = self.groups.values().collect();
        groups.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        groups
            .into_iter()
            .map(|g| ReportEntry {
                signature: g.signature.clone(),
                count: g.count,
                first_seen: g.first_seen,
                last_seen: g.last_seen,
                example_rendering: render_example(&g.example),
                timestamps: if g.count as usize <= MAX_LISTED_TIMESTAMPS {
                    Some(g.all.iter().map(|p| p.timestamp).collect())
                } else {
                    None
                },
            })
            .collect()
    }

    /// Clear all groups and reset counters.
    pub fn reset(&mut self) {
        self.groups.clear();
        self.total = 0;
    }
}

impl Default for PacketAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

fn render_example(packet: &Packet) -> String {
    let messages: Vec<String> = packet.messages.iter().map(|m| m.to_string()).collect();
    format!(
        "{} -> {} [{}] {}",
        packet.source,
        packet.destination,
        packet.command.data_type,
        messages.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::command::{Command, DataType, PacketType};
    use crate::codec::message::{MessageSet, Value};
    use crate::codec::Address;
    use bytes::Bytes;

    fn packet_with(msg_numbers: &[u16], ts: DateTime<Utc>) -> Packet {
        Packet {
            source: Address::decode([0x20, 0x00, 0x00]),
            destination: Address::decode([0x10, 0x00, 0x00]),
            command: Command {
                packet_information: false,
                protocol_version: 0,
                retry_count: 0,
                packet_type: PacketType::Normal,
                data_type: DataType::Notification,
                packet_number: 0,
            },
            messages: msg_numbers
                .iter()
                .map(|&n| MessageSet { message_number: n, value: Value::Enum(0) })
                .collect(),
            raw_frame: Bytes::from_static(&[0x32, 0x34]),
            timestamp: ts,
        }
    }

    #[test]
    fn grouping_two_packets_same_signature() {
        let mut analyser = PacketAnalyser::new();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(1);

        analyser.observe(packet_with(&[0x4201], t0));
        analyser.observe(packet_with(&[0x4201], t1));

        let stats = analyser.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.groups, 1);

        let sig = signature_of(&packet_with(&[0x4201], t0));
        let group = analyser.group(&sig).unwrap();
        assert_eq!(group.count, 2);
        assert!(group.first_seen < group.last_seen);
        assert_eq!(group.example.timestamp, t0);
    }

    #[test]
    fn signature_ignores_value_and_timestamp() {
        let mut a = packet_with(&[0x4201], Utc::now());
        let mut b = packet_with(&[0x4201], Utc::now() + chrono::Duration::seconds(5));
        a.messages[0].value = Value::Enum(1);
        b.messages[0].value = Value::Enum(99);
        assert_eq!(signature_of(&a), signature_of(&b));
    }

    #[test]
    fn different_message_ids_different_signature() {
        let a = packet_with(&[0x4201], Utc::now());
        let b = packet_with(&[0x4202], Utc::now());
        assert_ne!(signature_of(&a), signature_of(&b));
    }

    #[test]
    fn report_sorted_by_count_desc_then_first_seen() {
        let mut analyser = PacketAnalyser::new();
        let t0 = Utc::now();
        analyser.observe(packet_with(&[0x01], t0));
        analyser.observe(packet_with(&[0x02], t0 + chrono::Duration::seconds(1)));
        analyser.observe(packet_with(&[0x02], t0 + chrono::Duration::seconds(2)));

        let report = analyser.report();
        assert_eq!(report[0].count, 2);
        assert_eq!(report[1].count, 1);
    }

    #[test]
    fn report_caps_timestamp_listing() {
        let mut analyser = PacketAnalyser::new();
        let t0 = Utc::now();
        for i in 0..11 {
            analyser.observe(packet_with(&[0x01], t0 + chrono::Duration::seconds(i)));
        }
        let report = analyser.report();
        assert_eq!(report[0].count, 11);
        assert!(report[0].timestamps.is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut analyser = PacketAnalyser::new();
        analyser.observe(packet_with(&[0x01], Utc::now()));
        analyser.reset();
        assert_eq!(analyser.stats(), AnalyserStats { total: 0, groups: 0 });
    }

    #[test]
    fn bounded_retention_evicts_oldest_but_keeps_true_count() {
        let mut analyser = PacketAnalyser::with_retention(2);
        let t0 = Utc::now();
        for i in 0..5 {
            analyser.observe(packet_with(&[0x01], t0 + chrono::Duration::seconds(i)));
        }
        let sig = signature_of(&packet_with(&[0x01], t0));
        let group = analyser.group(&sig).unwrap();
        assert_eq!(group.count, 5);
        assert_eq!(group.all().len(), 2);
        assert_eq!(group.last_seen, t0 + chrono::Duration::seconds(4));
    }
}
