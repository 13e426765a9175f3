//! An mDNS (RFC 6762) record repository and responder core: holds service
//! registrations, builds the probe/announcement/exit/offload packets for
//! them, and answers incoming queries with known-answer suppression and
//! conflict detection.
//!
//! The repository performs no I/O and runs no timers of its own — callers
//! own a single-threaded event loop, feed it received packets and the
//! current time, and send whatever packets it hands back.

#[macro_use]
mod macros;

pub mod config;
pub mod error;
pub mod names;
pub mod offload;
pub mod packet;
pub mod record;
pub mod repository;
pub mod service;
pub mod wire;

pub use config::RepositoryConfig;
pub use error::{RepoResult, RepositoryError, WireError, WireResult};
pub use packet::{MdnsPacket, PacketFlags, Question};
pub use record::{Record, RecordHeader, RRType};
pub use repository::{
    AnnouncementInfo, ConflictKind, Destination, MdnsRecordRepository, ProbingInfo, Reply,
    MDNS_PORT, NEW_REGISTRATION,
};
pub use service::{ServiceInfo, ServiceRegistration, ServiceState};
