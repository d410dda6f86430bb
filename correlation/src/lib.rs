//! Correlation identifiers for user-facing error reports.
//!
//! When the bot surfaces an error to a user, the report footer carries a
//! short hexadecimal identifier that also lands in the operator log. The
//! identifier packs five fields into a 90-bit integer, most significant
//! first:
//!
//! | field | width | offset from LSB |
//! |---|---|---|
//! | schema version | 2 | 88 |
//! | invocation kind | 1 | 87 |
//! | process id | 22 | 65 |
//! | payload is message ref | 1 | 64 |
//! | payload | 64 | 0 |
//!
//! The payload is either the platform message identifier that triggered the
//! error or, when no message is at hand, the wall-clock time in Unix
//! seconds. Encoding happens once per error event; decoding is done by an
//! operator pasting an identifier out of a report, so
//! [`CorrelationId::decode`] is forgiving about surrounding whitespace, a
//! `0x` prefix, and uppercase digits.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use thiserror::Error;

/// Millisecond epoch offset the platform bakes into the timestamp bits of
/// its message identifiers.
pub const PLATFORM_EPOCH_MS: u64 = 1_420_070_400_000;

const VERSION_SHIFT: u32 = 88;
const KIND_SHIFT: u32 = 87;
const PID_SHIFT: u32 = 65;
const PAYLOAD_FLAG_SHIFT: u32 = 64;
const TOTAL_WIDTH: u32 = 90;

const VERSION_MASK: u8 = 0b11;
const PID_MASK: u32 = (1 << 22) - 1;

/// Number of low bits of a message identifier that hold allocation counters
/// rather than time.
const MESSAGE_REF_TIME_SHIFT: u32 = 22;

/// Release track of the build that emitted an identifier.
///
/// The raw wire field is two bits wide and therefore also admits the
/// unassigned pattern `3`; [`SchemaVersion::from_bits`] reports that as
/// `None` rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Stable release.
    Stable,
    /// Public beta build.
    Beta,
    /// Development build.
    Dev,
}

impl SchemaVersion {
    pub fn bits(self) -> u8 {
        match self {
            SchemaVersion::Stable => 0,
            SchemaVersion::Beta => 1,
            SchemaVersion::Dev => 2,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(SchemaVersion::Stable),
            1 => Some(SchemaVersion::Beta),
            2 => Some(SchemaVersion::Dev),
            _ => None,
        }
    }
}

/// How the failing command reached the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// Plain text command in a channel.
    Text,
    /// Structured invocation: slash command, button, or other component.
    Interactive,
}

/// The 64-bit payload together with its discriminator bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Identifier of the platform message that triggered the error.
    MessageRef(u64),
    /// Unix seconds at the time the error was recorded.
    Timestamp(u64),
}

impl Payload {
    /// Build the payload the way error reporters do: prefer the triggering
    /// message's identifier, fall back to the current time.
    pub fn from_message_ref(message_ref: Option<u64>, fallback_timestamp: u64) -> Self {
        match message_ref {
            Some(id) => Payload::MessageRef(id),
            None => Payload::Timestamp(fallback_timestamp),
        }
    }

    /// Raw 64-bit value as it appears on the wire.
    pub fn value(self) -> u64 {
        match self {
            Payload::MessageRef(v) | Payload::Timestamp(v) => v,
        }
    }

    /// Best-effort origination time in Unix seconds.
    ///
    /// Timestamps are returned as-is. For message references the time is
    /// recovered from the identifier's upper bits plus the platform epoch;
    /// that relationship is the platform's to keep stable, so treat the
    /// result as approximate.
    pub fn approximate_unix_secs(self) -> u64 {
        match self {
            Payload::Timestamp(secs) => secs,
            Payload::MessageRef(id) => {
                ((id >> MESSAGE_REF_TIME_SHIFT) + PLATFORM_EPOCH_MS) / 1000
            }
        }
    }
}

/// One decoded (or to-be-encoded) correlation identifier.
///
/// `schema_version` is kept as the raw two-bit field so that decoding stays
/// total over every 90-bit value; interpret it with
/// [`SchemaVersion::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId {
    pub schema_version: u8,
    pub invocation_kind: InvocationKind,
    /// Emitting OS process, truncated to 22 bits. Advisory only.
    pub process_id: u32,
    pub payload: Payload,
}

impl CorrelationId {
    /// Assemble an identifier for a new error event.
    ///
    /// `process_id` is masked to the 22 bits the layout affords; the field
    /// is a debugging hint, not an authoritative reference, so wrapping is
    /// acceptable and silent.
    pub fn new(
        version: SchemaVersion,
        invocation_kind: InvocationKind,
        process_id: u32,
        payload: Payload,
    ) -> Self {
        Self {
            schema_version: version.bits(),
            invocation_kind,
            process_id: process_id & PID_MASK,
            payload,
        }
    }

    /// [`CorrelationId::new`] with the live process id, which is what every
    /// reporting call site wants.
    pub fn for_current_process(
        version: SchemaVersion,
        invocation_kind: InvocationKind,
        payload: Payload,
    ) -> Self {
        Self::new(version, invocation_kind, std::process::id(), payload)
    }

    /// Render as lowercase hex with no prefix and no padding.
    ///
    /// ```
    /// use cria_correlation::CorrelationId;
    /// use cria_correlation::InvocationKind;
    /// use cria_correlation::Payload;
    /// use cria_correlation::SchemaVersion;
    ///
    /// let id = CorrelationId::new(
    ///     SchemaVersion::Beta,
    ///     InvocationKind::Interactive,
    ///     4242,
    ///     Payload::Timestamp(1_700_000_000),
    /// );
    /// assert_eq!(id.encode(), "1802124000000006553f100");
    /// ```
    pub fn encode(&self) -> String {
        format!("{:x}", self.pack())
    }

    /// Parse an identifier pasted out of a report or log line.
    ///
    /// Surrounding whitespace, an optional `0x`/`0X` prefix, and uppercase
    /// digits are all accepted; the canonical form produced by
    /// [`CorrelationId::encode`] is bare lowercase.
    ///
    /// ```
    /// # fn main() -> Result<(), cria_correlation::DecodeError> {
    /// let id = cria_correlation::CorrelationId::decode("0x1802124000000006553F100")?;
    /// assert_eq!(id.process_id, 4242);
    /// # Ok(())
    /// # }
    /// ```
    pub fn decode(input: &str) -> Result<Self, DecodeError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let value = u128::from_str_radix(digits, 16).map_err(|err| {
            // A parse overflow means the value blew past even 128 bits.
            if matches!(err.kind(), IntErrorKind::PosOverflow) {
                DecodeError::Overflow
            } else {
                DecodeError::NotHex(trimmed.to_string())
            }
        })?;
        if (value >> TOTAL_WIDTH) != 0 {
            return Err(DecodeError::Overflow);
        }

        let schema_version = ((value >> VERSION_SHIFT) as u8) & VERSION_MASK;
        let invocation_kind = if ((value >> KIND_SHIFT) & 1) == 1 {
            InvocationKind::Interactive
        } else {
            InvocationKind::Text
        };
        let process_id = ((value >> PID_SHIFT) as u32) & PID_MASK;
        let payload_value = value as u64;
        let payload = if ((value >> PAYLOAD_FLAG_SHIFT) & 1) == 1 {
            Payload::MessageRef(payload_value)
        } else {
            Payload::Timestamp(payload_value)
        };

        Ok(Self {
            schema_version,
            invocation_kind,
            process_id,
            payload,
        })
    }

    /// The 90 bits grouped by field (`vv-k-p..p-f-t..t`), for eyeballing an
    /// identifier against the wire table.
    pub fn bit_layout(&self) -> String {
        let value = self.pack();
        let version = (value >> VERSION_SHIFT) & u128::from(VERSION_MASK);
        let kind = (value >> KIND_SHIFT) & 1;
        let pid = (value >> PID_SHIFT) & u128::from(PID_MASK);
        let flag = (value >> PAYLOAD_FLAG_SHIFT) & 1;
        let payload = value as u64;
        format!("{version:02b}-{kind:01b}-{pid:022b}-{flag:01b}-{payload:064b}")
    }

    fn pack(&self) -> u128 {
        let (flag, payload_value) = match self.payload {
            Payload::MessageRef(v) => (1u128, v),
            Payload::Timestamp(v) => (0u128, v),
        };
        let kind_bit = match self.invocation_kind {
            InvocationKind::Text => 0u128,
            InvocationKind::Interactive => 1u128,
        };
        (u128::from(self.schema_version & VERSION_MASK) << VERSION_SHIFT)
            | (kind_bit << KIND_SHIFT)
            | (u128::from(self.process_id & PID_MASK) << PID_SHIFT)
            | (flag << PAYLOAD_FLAG_SHIFT)
            | u128::from(payload_value)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.pack())
    }
}

impl FromStr for CorrelationId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Why an identifier failed to decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input does not parse as a hexadecimal integer.
    #[error("not a hexadecimal identifier: {0:?}")]
    NotHex(String),
    /// The value is wider than the 90-bit layout; the identifier is
    /// corrupted or came from something else entirely.
    #[error("identifier wider than 90 bits")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_across_field_extremes() {
        let payloads = [
            Payload::Timestamp(0),
            Payload::Timestamp(u64::MAX),
            Payload::MessageRef(0),
            Payload::MessageRef(u64::MAX),
            Payload::MessageRef(882_561_395_982_495_754),
        ];
        let versions = [
            SchemaVersion::Stable,
            SchemaVersion::Beta,
            SchemaVersion::Dev,
        ];
        let kinds = [InvocationKind::Text, InvocationKind::Interactive];
        let pids = [0u32, 1, 4242, PID_MASK];

        for payload in payloads {
            for version in versions {
                for kind in kinds {
                    for pid in pids {
                        let id = CorrelationId::new(version, kind, pid, payload);
                        assert_eq!(CorrelationId::decode(&id.encode()), Ok(id));
                    }
                }
            }
        }
    }

    #[test]
    fn beta_interactive_timestamp_scenario() {
        let id = CorrelationId::new(
            SchemaVersion::Beta,
            InvocationKind::Interactive,
            4242,
            Payload::Timestamp(1_700_000_000),
        );
        let hex = id.encode();
        assert!(!hex.is_empty());
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
        assert_eq!(hex, "1802124000000006553f100");
        assert_eq!(CorrelationId::decode(&hex), Ok(id));
        assert_eq!(id.schema_version, SchemaVersion::Beta.bits());
        assert_eq!(id.payload, Payload::Timestamp(1_700_000_000));
    }

    #[test]
    fn encoded_values_stay_inside_ninety_bits() {
        let widest = CorrelationId::new(
            SchemaVersion::Dev,
            InvocationKind::Interactive,
            u32::MAX,
            Payload::MessageRef(u64::MAX),
        );
        let hex = widest.encode();
        // 90 bits is at most 23 hex digits.
        assert!(hex.len() <= 23);
        assert_eq!(CorrelationId::decode(&hex), Ok(widest));
    }

    #[test]
    fn decode_rejects_oversized_values() {
        // 2^90 exactly: one bit past the layout.
        let too_wide = format!("4{}", "0".repeat(22));
        assert_eq!(CorrelationId::decode(&too_wide), Err(DecodeError::Overflow));

        // Largest value that still fits.
        let max_fit = format!("3{}", "f".repeat(22));
        assert!(CorrelationId::decode(&max_fit).is_ok());

        // Past 128 bits the integer parse itself overflows; still Overflow,
        // not NotHex.
        let way_past = "f".repeat(33);
        assert_eq!(CorrelationId::decode(&way_past), Err(DecodeError::Overflow));
    }

    #[test]
    fn decode_rejects_junk() {
        for junk in ["", "zzz", "18-21", "0x", "1g", "ߚ"] {
            match CorrelationId::decode(junk) {
                Err(DecodeError::NotHex(_)) => {}
                other => panic!("expected NotHex for {junk:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn decode_accepts_pasted_shapes() {
        let canonical = CorrelationId::decode("1802124000000006553f100");
        assert_eq!(
            CorrelationId::decode("  1802124000000006553f100\n"),
            canonical
        );
        assert_eq!(
            CorrelationId::decode("0x1802124000000006553f100"),
            canonical
        );
        assert_eq!(
            CorrelationId::decode("0X1802124000000006553F100"),
            canonical
        );
    }

    #[test]
    fn display_and_from_str_match_the_named_operations() {
        let id = CorrelationId::new(
            SchemaVersion::Stable,
            InvocationKind::Text,
            7,
            Payload::Timestamp(123_456),
        );
        assert_eq!(id.to_string(), id.encode());
        assert_eq!(id.to_string().parse::<CorrelationId>(), Ok(id));
    }

    #[test]
    fn process_id_is_masked_not_rejected() {
        let id = CorrelationId::new(
            SchemaVersion::Stable,
            InvocationKind::Text,
            u32::MAX,
            Payload::Timestamp(0),
        );
        assert_eq!(id.process_id, PID_MASK);

        let live = CorrelationId::for_current_process(
            SchemaVersion::Stable,
            InvocationKind::Text,
            Payload::Timestamp(0),
        );
        assert!(live.process_id <= PID_MASK);
        assert_eq!(live.process_id, std::process::id() & PID_MASK);
    }

    #[test]
    fn payload_prefers_message_ref() {
        assert_eq!(
            Payload::from_message_ref(Some(42), 1_700_000_000),
            Payload::MessageRef(42)
        );
        assert_eq!(
            Payload::from_message_ref(None, 1_700_000_000),
            Payload::Timestamp(1_700_000_000)
        );
    }

    #[test]
    fn origination_time_recovery() {
        // Timestamps pass straight through.
        assert_eq!(
            Payload::Timestamp(1_700_000_000).approximate_unix_secs(),
            1_700_000_000
        );

        // A message id allocated at a known millisecond decodes back to that
        // second.
        let allocated_at_ms: u64 = 1_600_000_000_000;
        let message_id = (allocated_at_ms - PLATFORM_EPOCH_MS) << MESSAGE_REF_TIME_SHIFT;
        assert_eq!(
            Payload::MessageRef(message_id).approximate_unix_secs(),
            1_600_000_000
        );
    }

    #[test]
    fn schema_version_bits_are_a_partial_mapping() {
        for version in [
            SchemaVersion::Stable,
            SchemaVersion::Beta,
            SchemaVersion::Dev,
        ] {
            assert_eq!(SchemaVersion::from_bits(version.bits()), Some(version));
        }
        assert_eq!(SchemaVersion::from_bits(3), None);
    }

    #[test]
    fn bit_layout_groups_match_field_widths() {
        let id = CorrelationId::new(
            SchemaVersion::Beta,
            InvocationKind::Interactive,
            1,
            Payload::MessageRef(5),
        );
        let layout = id.bit_layout();
        let groups: Vec<&str> = layout.split('-').collect();
        let widths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(widths, vec![2, 1, 22, 1, 64]);
        assert_eq!(groups[0], "01");
        assert_eq!(groups[1], "1");
        assert_eq!(u32::from_str_radix(groups[2], 2), Ok(1));
        assert_eq!(groups[3], "1");
        assert_eq!(u64::from_str_radix(groups[4], 2), Ok(5));
    }
}
