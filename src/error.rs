//! Errors surfaced by the repository's public API, and the lower-level
//! wire codec errors used while encoding/decoding names, records and
//! packets.
use std::fmt;
use std::io;
use std::str;

/// Errors surfaced to callers of the repository's public API.
///
/// Conflicts are not modeled here: they are a data channel
/// (`getConflictingServices`), not a failure.
#[derive(Debug)]
pub enum RepositoryError {
    /// Invalid service type, invalid TTL override, invalid hostname, or
    /// otherwise impossible rdata.
    BadParameters(String),
    /// Registration id reuse while the id is still mapped.
    AlreadyActive(i32),
    /// Unreachable decoding fault surfaced from a caller-triggered encode
    /// (malformed *incoming* packets are never propagated this way; see
    /// `getReply`/`getConflictingServices`, which drop them silently).
    InternalError(String),
    /// Per-client listener cap exceeded.
    MaxLimit,
    /// Caller referenced an id never assigned.
    NoTransaction(i32),
    /// Stop requested for an id that was never started/is unknown.
    OperationNotRunning(i32),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::BadParameters(s) => write!(f, "bad parameters: {}", s),
            RepositoryError::AlreadyActive(id) => write!(f, "service {} is already active", id),
            RepositoryError::InternalError(s) => write!(f, "internal error: {}", s),
            RepositoryError::MaxLimit => write!(f, "listener limit reached"),
            RepositoryError::NoTransaction(id) => write!(f, "no such service id {}", id),
            RepositoryError::OperationNotRunning(id) => {
                write!(f, "operation not running for id {}", id)
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Errors from the wire codec (name/record/packet (de)serialization).
///
/// These never escape the public query/conflict entry points: at those
/// boundaries a `WireError` is logged at `debug!` and treated as an empty
/// result. Malformed incoming packets are dropped silently rather than
/// surfaced as errors.
#[derive(Debug)]
pub enum WireError {
    Io(io::Error),
    Utf8(str::Utf8Error),
    /// A domain name exceeded the 255 octet wire-format bound.
    NameTooLong,
    /// A label exceeded the 63 octet wire-format bound.
    LabelTooLong,
    /// Name compression pointers chased past the loop guard (128 hops).
    PointerLoop,
    /// Buffer ran out of bytes mid-record.
    Truncated,
    UnknownType(u16),
    UnknownClass(u16),
}

pub type WireResult<T> = Result<T, WireError>;

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        WireError::Io(err)
    }
}

impl From<str::Utf8Error> for WireError {
    fn from(err: str::Utf8Error) -> Self {
        WireError::Utf8(err)
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Io(e) => write!(f, "io error: {}", e),
            WireError::Utf8(e) => write!(f, "utf8 error: {}", e),
            WireError::NameTooLong => write!(f, "domain name exceeds 255 octets"),
            WireError::LabelTooLong => write!(f, "label exceeds 63 octets"),
            WireError::PointerLoop => write!(f, "name compression pointer loop"),
            WireError::Truncated => write!(f, "buffer truncated"),
            WireError::UnknownType(t) => write!(f, "unknown RR type {}", t),
            WireError::UnknownClass(c) => write!(f, "unknown RR class {}", c),
        }
    }
}

impl std::error::Error for WireError {}

impl From<WireError> for RepositoryError {
    fn from(err: WireError) -> Self {
        RepositoryError::InternalError(err.to_string())
    }
}
