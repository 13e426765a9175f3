//! Repository-wide configuration: feature flags and the per-process default
//! host name.
use rand::RngCore;

/// Feature flags and identity the repository is constructed with.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// The `<hex>` portion of the default host name `Android_<hex>.local`,
    /// generated once per process and stable for its lifetime.
    pub host_label: String,
    /// Include an `ANY` question (and A/AAAA authority records) for the
    /// host name alongside the service's own probe question.
    pub include_host_in_probing: bool,
    /// Honor known-answer suppression in `get_reply`.
    pub known_answer_suppression: bool,
    /// Honor the unicast ("QU") bit when selecting a reply destination.
    pub unicast_reply: bool,
    /// Whether this caller may pass TTL overrides outside the
    /// non-privileged bounds.
    pub privileged: bool,
}

impl RepositoryConfig {
    /// Builds a config with a freshly generated host label and the usual
    /// defaults (suppression and unicast replies on, host not included in
    /// probing, non-privileged).
    pub fn new(privileged: bool) -> Self {
        RepositoryConfig {
            host_label: generate_host_label(),
            include_host_in_probing: false,
            known_answer_suppression: true,
            unicast_reply: true,
            privileged,
        }
    }

    pub fn with_include_host_in_probing(mut self, value: bool) -> Self {
        self.include_host_in_probing = value;
        self
    }

    pub fn with_known_answer_suppression(mut self, value: bool) -> Self {
        self.known_answer_suppression = value;
        self
    }

    pub fn with_unicast_reply(mut self, value: bool) -> Self {
        self.unicast_reply = value;
        self
    }
}

fn generate_host_label() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut out = String::with_capacity(32);
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
    out
}
