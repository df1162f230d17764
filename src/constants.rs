//! NASA protocol wire constants.
//!
//! Mirrors the frame delimiters, size bounds, and lookup tables defined by
//! the NASA field-bus wire format.

/// Frame start delimiter.
pub const FRAME_START: u8 = 0x32;

/// Frame end delimiter.
pub const FRAME_END: u8 = 0x34;

/// Minimum legal frame length in bytes.
pub const FRAME_MIN_LEN: usize = 16;

/// Maximum legal frame length in bytes.
pub const FRAME_MAX_LEN: usize = 1500;

/// Offset of the address/command/capacity/message region, right after
/// the start byte and 2-byte size field.
pub const FRAME_HEADER_OFFSET: usize = 3;

/// Size in bytes of one `Address` record.
pub const ADDRESS_LEN: usize = 3;

/// Size in bytes of one `Command` record.
pub const COMMAND_LEN: usize = 3;

/// Size in bytes of the trailing CRC field.
pub const CRC_LEN: usize = 2;

/// Size in bytes of the trailing end-delimiter field.
pub const END_LEN: usize = 1;

/// Bitmask selecting the top 3 bits of `message_number` (the wire-shape tag).
pub const MESSAGE_KIND_MASK: u16 = 0x0600;

/// Right-shift to normalize `MESSAGE_KIND_MASK` into a small integer.
pub const MESSAGE_KIND_SHIFT: u32 = 9;

/// Operation mode message number (§4.3).
pub const MSG_OPERATION_MODE: u16 = 0x4001;

/// Fan mode message numbers (§4.3).
pub const MSG_FAN_MODE: [u16; 2] = [0x4006, 0x4007];

/// Operation mode symbolic values, indexed by raw value.
pub const OPERATION_MODE_NAMES: [&str; 5] = ["Auto", "Cool", "Dry", "Fan", "Heat"];

/// Fan mode symbolic values, indexed by raw value.
pub const FAN_MODE_NAMES: [&str; 5] = ["Auto", "Low", "Mid", "High", "Turbo"];

/// Default capacity of the live session's packet history ring (§4.5).
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Seconds the session waits for an orderly shutdown before forcing exit (§5).
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// One entry of the address-class enumeration table (§6.1).
pub struct AddressClassEntry {
    pub code: u8,
    pub name: &'static str,
}

/// The full address-class enumeration, in wire-code order.
pub const ADDRESS_CLASSES: &[AddressClassEntry] = &[
    AddressClassEntry { code: 0x10, name: "Outdoor" },
    AddressClassEntry { code: 0x11, name: "HTU" },
    AddressClassEntry { code: 0x20, name: "Indoor" },
    AddressClassEntry { code: 0x30, name: "ERV" },
    AddressClassEntry { code: 0x35, name: "Diffuser" },
    AddressClassEntry { code: 0x38, name: "MCU" },
    AddressClassEntry { code: 0x40, name: "RMC" },
    AddressClassEntry { code: 0x50, name: "WiredRemote" },
    AddressClassEntry { code: 0x58, name: "PIM" },
    AddressClassEntry { code: 0x59, name: "SIM" },
    AddressClassEntry { code: 0x5A, name: "Peak" },
    AddressClassEntry { code: 0x5B, name: "PowerDivider" },
    AddressClassEntry { code: 0x60, name: "OnOffController" },
    AddressClassEntry { code: 0x62, name: "WiFiKit" },
    AddressClassEntry { code: 0x63, name: "MIM" },
    AddressClassEntry { code: 0x65, name: "CentralController" },
    AddressClassEntry { code: 0x6A, name: "DMS" },
    AddressClassEntry { code: 0x80, name: "JIGTester" },
    AddressClassEntry { code: 0xB0, name: "BroadcastSelfLayer" },
    AddressClassEntry { code: 0xB1, name: "BroadcastControlLayer" },
    AddressClassEntry { code: 0xB2, name: "BroadcastSetLayer" },
    AddressClassEntry { code: 0xB3, name: "BroadcastControlAndSetLayer" },
    AddressClassEntry { code: 0xB4, name: "BroadcastModuleLayer" },
    AddressClassEntry { code: 0xB7, name: "BroadcastCSM" },
    AddressClassEntry { code: 0xB8, name: "BroadcastLocalLayer" },
    AddressClassEntry { code: 0xBF, name: "BroadcastCSML" },
    AddressClassEntry { code: 0xFF, name: "Undefined" },
];

/// One entry of the known symbolic message-number table (§4.3/§6.1).
pub struct KnownMessageEntry {
    pub number: u16,
    pub name: &'static str,
}

/// Known symbolic message numbers. Unknown numbers render as `UNKNOWN`.
///
/// This table is intentionally small: it covers the message classes the
/// readable-rendering heuristics in §4.3 key off (`temp`, `power`, mode,
/// fan mode) plus a handful of illustrative others. Any message number
/// absent here still decodes successfully; only its readable name differs.
pub const KNOWN_MESSAGES: &[KnownMessageEntry] = &[
    KnownMessageEntry { number: 0x4000, name: "enable_power" },
    KnownMessageEntry { number: 0x4001, name: "operation_mode" },
    KnownMessageEntry { number: 0x4006, name: "fan_mode" },
    KnownMessageEntry { number: 0x4007, name: "fan_mode_real" },
    KnownMessageEntry { number: 0x4201, name: "indoor_temp" },
    KnownMessageEntry { number: 0x4202, name: "target_temp" },
    KnownMessageEntry { number: 0x4203, name: "outdoor_temp" },
    KnownMessageEntry { number: 0x4211, name: "pipe_in_temp" },
    KnownMessageEntry { number: 0x4212, name: "pipe_out_temp" },
];

/// Look up a known message name by number.
pub fn known_message_name(message_number: u16) -> Option<&'static str> {
    KNOWN_MESSAGES
        .iter()
        .find(|e| e.number == message_number)
        .map(|e| e.name)
}

/// Look up an address-class name by wire code.
pub fn address_class_name(code: u8) -> Option<&'static str> {
    ADDRESS_CLASSES.iter().find(|e| e.code == code).map(|e| e.name)
}
