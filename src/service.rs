//! Service registration table: the data a caller registers,
//! validated into the shape the repository core turns into records.
use std::net::IpAddr;

use crate::error::{RepoResult, RepositoryError};
use crate::names::{truncate_utf8, Labels};
use crate::record::TxtEntry;

/// Per-client listener cap. The repository itself doesn't know about
/// "clients" (that belongs to the external registration API surface), but
/// it still enforces a hard backstop on the number of live registrations
/// it will hold.
pub const MAX_SERVICES: usize = 200;

/// TTL override bounds for non-privileged callers.
pub const MIN_TTL_OVERRIDE_SECS: u32 = 30;
pub const MAX_TTL_OVERRIDE_SECS: u32 = 36_000;

pub const MAX_INSTANCE_NAME_BYTES: usize = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Probing,
    Announcing,
    Active,
    Exiting,
    Removed,
}

/// The hostname records are advertised under: either the repository's
/// default per-process host name, or a host label shared across
/// registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hostname {
    Default,
    Custom(String),
}

impl Hostname {
    /// Labels for this host under `.local`, given the repository's default
    /// host name's hex identifier.
    pub fn labels(&self, default_host_hex: &str) -> Labels {
        let label = match self {
            Hostname::Default => format!("Android_{}", default_host_hex),
            Hostname::Custom(label) => label.clone(),
        };
        Labels::join(&[&Labels(vec![label]), &local_suffix()])
    }
}

pub fn local_suffix() -> Labels {
    Labels::from_dotted("local")
}

/// Caller-supplied registration input, before validation.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub instance_name: String,
    /// `_proto._tcp`/`_proto._udp`, optionally followed by
    /// `,_sub1,_sub2`.
    pub service_type: String,
    pub port: u16,
    pub txt: Vec<TxtEntry>,
    /// `None` uses the repository's default host; `Some(label)` shares a
    /// custom host across registrations.
    pub custom_host: Option<String>,
    /// Explicit addresses for a custom host; ignored (repository addresses
    /// used instead) when `custom_host` is `None`.
    pub addresses: Vec<IpAddr>,
}

/// Validated, in-memory registration.
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    pub id: i32,
    pub instance_name: String,
    pub service_type: Labels,
    pub subtypes: Vec<String>,
    pub port: u16,
    pub txt: Vec<TxtEntry>,
    pub hostname: Hostname,
    pub addresses: Vec<IpAddr>,
    pub state: ServiceState,
    /// TTL override in milliseconds, if any (bounds are validated in
    /// seconds at registration time).
    pub ttl_override_ms: Option<u32>,
    pub sent_packet_count: u32,
    pub replied_request_count: u32,
}

impl ServiceRegistration {
    pub fn instance_labels(&self) -> Labels {
        Labels::join(
            &[
                &Labels(vec![self.instance_name.clone()]),
                &self.service_type,
            ],
        )
    }

    pub fn host_labels(&self, default_host_label: &str) -> Labels {
        self.hostname.labels(default_host_label)
    }

    pub fn subtype_labels(&self) -> Vec<Labels> {
        self.subtypes
            .iter()
            .map(|s| {
                Labels::join(&[
                    &Labels(vec![s.clone()]),
                    &Labels::from_dotted("_sub"),
                    &self.service_type,
                ])
            })
            .collect()
    }
}

/// Validates `_proto._tcp`/`_proto._udp`[,subtype]* and splits it into the
/// base service-type labels and the subtype list.
///
/// Grammar (case-insensitive): `^(?:_[A-Za-z0-9-]+)\._(?:tcp|udp)$`,
/// followed by any number of `,_sub` subtype labels.
pub fn validate_service_type(input: &str) -> RepoResult<(Labels, Vec<String>)> {
    let mut parts = input.split(',');
    let base = parts
        .next()
        .ok_or_else(|| RepositoryError::BadParameters("empty service type".into()))?;

    let base_labels = validate_base_type(base)?;

    let mut subtypes = Vec::new();
    for sub in parts {
        validate_subtype_label(sub)?;
        subtypes.push(sub.to_string());
    }

    Ok((base_labels, subtypes))
}

fn validate_base_type(base: &str) -> RepoResult<Labels> {
    let bad = || RepositoryError::BadParameters(format!("invalid service type: {}", base));

    let labels: Vec<&str> = base.split('.').collect();
    if labels.len() != 2 {
        return Err(bad());
    }
    let (proto, transport) = (labels[0], labels[1]);

    if !is_underscore_label(proto) {
        return Err(bad());
    }
    let transport_lower = transport.to_ascii_lowercase();
    if transport_lower != "_tcp" && transport_lower != "_udp" {
        return Err(bad());
    }

    Ok(Labels(vec![proto.to_string(), transport_lower]))
}

fn validate_subtype_label(sub: &str) -> RepoResult<()> {
    validate_subtype(sub)
}

/// Validates a single `_sub`-style subtype label on its own, for
/// `updateService`'s subtype-replacement path.
pub fn validate_subtype(sub: &str) -> RepoResult<()> {
    if !is_underscore_label(sub) {
        return Err(RepositoryError::BadParameters(format!(
            "invalid subtype: {}",
            sub
        )));
    }
    Ok(())
}

fn is_underscore_label(label: &str) -> bool {
    let mut chars = label.chars();
    if chars.next() != Some('_') {
        return false;
    }
    let rest: &str = &label[1..];
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Validates a TTL override, expressed in seconds, against the caller's
/// privilege level: `[30, 36000]` for non-privileged callers,
/// `[1, u32::MAX]` for privileged ones. Returns the override in
/// milliseconds.
pub fn validate_ttl_override(ttl_secs: u32, privileged: bool) -> RepoResult<u32> {
    if privileged {
        if ttl_secs == 0 {
            return Err(RepositoryError::BadParameters(
                "ttl override must be positive".into(),
            ));
        }
    } else if !(MIN_TTL_OVERRIDE_SECS..=MAX_TTL_OVERRIDE_SECS).contains(&ttl_secs) {
        return Err(RepositoryError::BadParameters(format!(
            "ttl override {} out of range [{}, {}]",
            ttl_secs, MIN_TTL_OVERRIDE_SECS, MAX_TTL_OVERRIDE_SECS
        )));
    }
    Ok(ttl_secs.saturating_mul(1000))
}

/// Truncates an instance name to the wire-format bound, never rejecting it.
pub fn truncate_instance_name(name: &str) -> String {
    truncate_utf8(name, MAX_INSTANCE_NAME_BYTES)
}
