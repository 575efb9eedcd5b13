use crate::errors::{ErrorKind, QuarryError, QuarryResult};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::Rng;
use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

// 5 random bytes fixed for the lifetime of the process
static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| OsRng.gen());

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(OsRng.gen_range(0..0x00ff_ffff)));

const MAX_COUNTER: u32 = 0x00ff_ffff;

/// A 12-byte object identifier.
///
/// The layout follows the server's own id format:
///
/// * bytes 0..4: seconds since the Unix epoch, big endian
/// * bytes 4..9: a random value unique to this process
/// * bytes 9..12: a counter starting at a random value
///
/// Ids generated by one process are therefore roughly ordered by creation time.
/// `ObjectId` is an opaque leaf: expression resolution never looks inside it.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::common::ObjectId;
///
/// let id = ObjectId::new();
/// let same = ObjectId::parse_str(&id.to_hex())?;
/// assert_eq!(id, same);
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    /// Generates a new `ObjectId` stamped with the current time.
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & MAX_COUNTER;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        ObjectId { bytes }
    }

    /// Wraps raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId { bytes }
    }

    /// Parses a 24 character hexadecimal string.
    pub fn parse_str(hex: &str) -> QuarryResult<ObjectId> {
        if hex.len() != 24 || !hex.is_ascii() {
            log::error!("Invalid object id {:?}: expected 24 hex characters", hex);
            return Err(QuarryError::new(
                &format!("Invalid object id {:?}: expected 24 hex characters", hex),
                ErrorKind::InvalidObjectId,
            ));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|err| {
                log::error!("Invalid object id {:?}: {}", hex, err);
                QuarryError::new(
                    &format!("Invalid object id {:?}: {}", hex, err),
                    ErrorKind::InvalidObjectId,
                )
            })?;
        }
        Ok(ObjectId { bytes })
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Returns the lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Returns the creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
        Utc.timestamp_opt(i64::from(seconds), 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}
