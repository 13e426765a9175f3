//! The repository core: the indexed registration map, the probing and
//! announcement packet builders, query-to-reply synthesis and conflict
//! detection.
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use log::{debug, trace, warn};

use crate::config::RepositoryConfig;
use crate::error::{RepoResult, RepositoryError};
use crate::names::{labels_equal, reverse_dns_ipv4, reverse_dns_ipv6, type_equals_or_is_subtype, Labels};
use crate::packet::{MdnsPacket, PacketFlags, Question};
use crate::record::{
    ARecord, AaaaRecord, NsecRecord, PtrRecord, Record, RecordHeader, RRType, SrvRecord, TxtEntry,
    TxtRecord, LONG_TTL_MS, SHORT_TTL_MS,
};
use crate::service::{
    local_suffix, truncate_instance_name, validate_service_type, validate_subtype,
    validate_ttl_override, Hostname, ServiceInfo, ServiceRegistration, ServiceState, MAX_SERVICES,
};

pub const MDNS_PORT: u16 = 5353;
const MDNS_GROUP_V4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);
const MDNS_GROUP_V6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfb);

/// `-1` meaning "newly inserted"; any other value is a pre-existing
/// registration id that the caller should treat as a soft success.
pub const NEW_REGISTRATION: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Service,
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Unicast(SocketAddr),
    MulticastV4,
    MulticastV6,
}

impl Destination {
    /// The concrete address the UDP socket layer should send to.
    pub fn socket_addr(&self) -> SocketAddr {
        match self {
            Destination::Unicast(addr) => *addr,
            Destination::MulticastV4 => SocketAddr::new(MDNS_GROUP_V4.into(), MDNS_PORT),
            Destination::MulticastV6 => SocketAddr::new(MDNS_GROUP_V6.into(), MDNS_PORT),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbingInfo {
    pub id: i32,
    pub packet: MdnsPacket,
}

#[derive(Debug, Clone)]
pub struct AnnouncementInfo {
    pub id: i32,
    pub packet: MdnsPacket,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub destination: Destination,
    pub answers: Vec<Record>,
    pub additional_answers: Vec<Record>,
    pub known_answers: Vec<Record>,
}

/// The in-memory record repository. All methods run synchronously on the
/// caller's thread; nothing here blocks or holds a lock, so the owner is
/// expected to serialize calls itself.
pub struct MdnsRecordRepository {
    config: RepositoryConfig,
    services: HashMap<i32, ServiceRegistration>,
    addresses: Vec<IpAddr>,
}

impl MdnsRecordRepository {
    pub fn new(config: RepositoryConfig) -> Self {
        MdnsRecordRepository {
            config,
            services: HashMap::new(),
            addresses: Vec::new(),
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub(crate) fn services(&self) -> &HashMap<i32, ServiceRegistration> {
        &self.services
    }

    // ---- §4.6 external-collaborator contract: interface addresses ----

    pub fn update_addresses(&mut self, addresses: Vec<IpAddr>) {
        self.addresses = addresses;
    }

    fn effective_addresses<'a>(&'a self, reg: &'a ServiceRegistration) -> &'a [IpAddr] {
        match reg.hostname {
            Hostname::Custom(_) => &reg.addresses,
            Hostname::Default => &self.addresses,
        }
    }

    // ---- §4.3 service registration table ----

    pub fn add_service(
        &mut self,
        id: i32,
        info: ServiceInfo,
        ttl_override_secs: Option<u32>,
    ) -> RepoResult<i32> {
        let (service_type, subtypes) = validate_service_type(&info.service_type)?;
        let ttl_override_ms = ttl_override_secs
            .map(|secs| validate_ttl_override(secs, self.config.privileged))
            .transpose()?;

        let instance_name = truncate_instance_name(&info.instance_name);
        let candidate = Labels::join(&[&Labels(vec![instance_name.clone()]), &service_type]);

        for existing in self.services.values() {
            let existing_name =
                Labels::join(&[&Labels(vec![existing.instance_name.clone()]), &existing.service_type]);
            if labels_equal(&candidate, &existing_name) {
                return Ok(existing.id);
            }
        }

        if self.services.contains_key(&id) {
            return Err(RepositoryError::AlreadyActive(id));
        }

        let hostname = match &info.custom_host {
            Some(label) => {
                for existing in self.services.values() {
                    if let Hostname::Custom(existing_label) = &existing.hostname {
                        if labels_equal(
                            &Labels(vec![existing_label.clone()]),
                            &Labels(vec![label.clone()]),
                        ) {
                            let existing_set: std::collections::HashSet<_> =
                                existing.addresses.iter().collect();
                            let new_set: std::collections::HashSet<_> =
                                info.addresses.iter().collect();
                            if existing_set != new_set {
                                return Err(RepositoryError::BadParameters(format!(
                                    "custom host {} already registered with a different address set",
                                    label
                                )));
                            }
                        }
                    }
                }
                Hostname::Custom(label.clone())
            }
            None => Hostname::Default,
        };

        if self.services.len() >= MAX_SERVICES {
            return Err(RepositoryError::MaxLimit);
        }

        self.services.insert(
            id,
            ServiceRegistration {
                id,
                instance_name,
                service_type,
                subtypes,
                port: info.port,
                txt: info.txt,
                hostname,
                addresses: info.addresses,
                state: ServiceState::Probing,
                ttl_override_ms,
                sent_packet_count: 0,
                replied_request_count: 0,
            },
        );
        debug!("service {}: -> Probing", id);

        Ok(NEW_REGISTRATION)
    }

    pub fn update_service(&mut self, id: i32, new_subtypes: Vec<String>) -> RepoResult<()> {
        for sub in &new_subtypes {
            validate_subtype(sub)?;
        }
        let reg = self
            .services
            .get_mut(&id)
            .ok_or(RepositoryError::NoTransaction(id))?;
        reg.subtypes = new_subtypes;
        Ok(())
    }

    pub fn remove_service(&mut self, id: i32) -> RepoResult<()> {
        let removed = self.services.remove(&id);
        if removed.is_some() {
            debug!("service {}: -> Removed", id);
        }
        removed.map(|_| ()).ok_or(RepositoryError::NoTransaction(id))
    }

    pub fn has_active_service(&self, id: i32) -> bool {
        self.services.contains_key(&id)
    }

    pub fn is_probing(&self, id: i32) -> bool {
        matches!(self.services.get(&id), Some(reg) if reg.state == ServiceState::Probing)
    }

    pub fn services_count(&self) -> usize {
        self.services.len()
    }

    pub fn clear_services(&mut self) -> Vec<i32> {
        let ids: Vec<i32> = self.services.keys().copied().collect();
        self.services.clear();
        ids
    }

    /// True when there are no live registrations and nothing mid-exit,
    /// i.e. the owner should be allowed to tear the repository down.
    pub fn should_request_stop(&self) -> bool {
        self.services.is_empty()
    }

    // ---- name helpers ----

    fn instance_name_labels(&self, reg: &ServiceRegistration) -> Labels {
        Labels::join(&[&reg.instance_labels(), &local_suffix()])
    }

    fn type_name_labels(&self, reg: &ServiceRegistration) -> Labels {
        Labels::join(&[&reg.service_type, &local_suffix()])
    }

    fn host_name_labels(&self, reg: &ServiceRegistration) -> Labels {
        reg.host_labels(&self.config.host_label)
    }

    fn subtype_name_labels(&self, reg: &ServiceRegistration) -> Vec<Labels> {
        reg.subtype_labels()
            .into_iter()
            .map(|l| Labels::join(&[&l, &local_suffix()]))
            .collect()
    }

    fn enumeration_name() -> Labels {
        Labels::from_dotted("_services._dns-sd._udp.local")
    }

    fn effective_ttl(&self, reg: &ServiceRegistration, default: u32) -> u32 {
        reg.ttl_override_ms.unwrap_or(default)
    }

    // ---- record builders, shared by probing/announcement/exit/offload/reply ----

    pub(crate) fn srv_record(&self, reg: &ServiceRegistration) -> SrvRecord {
        SrvRecord {
            header: RecordHeader::local(
                self.instance_name_labels(reg),
                true,
                self.effective_ttl(reg, SHORT_TTL_MS),
            ),
            priority: 0,
            weight: 0,
            port: reg.port,
            target: self.host_name_labels(reg),
        }
    }

    pub(crate) fn txt_record(&self, reg: &ServiceRegistration) -> TxtRecord {
        TxtRecord {
            header: RecordHeader::local(
                self.instance_name_labels(reg),
                true,
                self.effective_ttl(reg, LONG_TTL_MS),
            ),
            entries: reg.txt.clone(),
        }
    }

    pub(crate) fn type_ptr_record(&self, reg: &ServiceRegistration) -> PtrRecord {
        PtrRecord {
            header: RecordHeader::local(
                self.type_name_labels(reg),
                false,
                self.effective_ttl(reg, LONG_TTL_MS),
            ),
            pointer: self.instance_name_labels(reg),
        }
    }

    fn subtype_ptr_records(&self, reg: &ServiceRegistration) -> Vec<PtrRecord> {
        self.subtype_name_labels(reg)
            .into_iter()
            .map(|name| PtrRecord {
                header: RecordHeader::local(name, false, self.effective_ttl(reg, LONG_TTL_MS)),
                pointer: self.instance_name_labels(reg),
            })
            .collect()
    }

    fn enumeration_ptr_record(&self, reg: &ServiceRegistration) -> PtrRecord {
        PtrRecord {
            header: RecordHeader::local(
                Self::enumeration_name(),
                false,
                self.effective_ttl(reg, LONG_TTL_MS),
            ),
            pointer: self.type_name_labels(reg),
        }
    }

    pub(crate) fn address_records(&self, reg: &ServiceRegistration) -> Vec<Record> {
        self.effective_addresses(reg)
            .iter()
            .map(|addr| match addr {
                IpAddr::V4(v4) => Record::A(ARecord {
                    header: RecordHeader::local(
                        self.host_name_labels(reg),
                        true,
                        self.effective_ttl(reg, SHORT_TTL_MS),
                    ),
                    addr: *v4,
                }),
                IpAddr::V6(v6) => Record::Aaaa(AaaaRecord {
                    header: RecordHeader::local(
                        self.host_name_labels(reg),
                        true,
                        self.effective_ttl(reg, SHORT_TTL_MS),
                    ),
                    addr: *v6,
                }),
            })
            .collect()
    }

    fn reverse_ptr_records(&self, reg: &ServiceRegistration) -> Vec<PtrRecord> {
        self.effective_addresses(reg)
            .iter()
            .map(|addr| {
                let name = match addr {
                    IpAddr::V4(v4) => reverse_dns_ipv4(v4),
                    IpAddr::V6(v6) => reverse_dns_ipv6(v6),
                };
                PtrRecord {
                    header: RecordHeader::local(
                        name,
                        false,
                        self.effective_ttl(reg, SHORT_TTL_MS),
                    ),
                    pointer: self.host_name_labels(reg),
                }
            })
            .collect()
    }

    fn instance_nsec_record(&self, reg: &ServiceRegistration) -> NsecRecord {
        let mut types = std::collections::BTreeSet::new();
        types.insert(RRType::Txt);
        types.insert(RRType::Srv);
        let name = self.instance_name_labels(reg);
        NsecRecord {
            header: RecordHeader::local(name.clone(), true, self.effective_ttl(reg, LONG_TTL_MS)),
            next_domain: name,
            types,
        }
    }

    fn host_nsec_record(&self, reg: &ServiceRegistration) -> NsecRecord {
        let mut types = std::collections::BTreeSet::new();
        for addr in self.effective_addresses(reg) {
            match addr {
                IpAddr::V4(_) => {
                    types.insert(RRType::A);
                }
                IpAddr::V6(_) => {
                    types.insert(RRType::Aaaa);
                }
            }
        }
        let name = self.host_name_labels(reg);
        NsecRecord {
            header: RecordHeader::local(name.clone(), true, self.effective_ttl(reg, SHORT_TTL_MS)),
            next_domain: name,
            types,
        }
    }

    fn reverse_nsec_records(&self, reg: &ServiceRegistration) -> Vec<NsecRecord> {
        self.effective_addresses(reg)
            .iter()
            .map(|addr| {
                let name = match addr {
                    IpAddr::V4(v4) => reverse_dns_ipv4(v4),
                    IpAddr::V6(v6) => reverse_dns_ipv6(v6),
                };
                let mut types = std::collections::BTreeSet::new();
                types.insert(RRType::Ptr);
                NsecRecord {
                    header: RecordHeader::local(
                        name.clone(),
                        true,
                        self.effective_ttl(reg, SHORT_TTL_MS),
                    ),
                    next_domain: name,
                    types,
                }
            })
            .collect()
    }

    /// The full set of records a registration contributes once active:
    /// everything `get_reply` can match against, and everything
    /// announcement/exit/offload slice subsets out of.
    fn full_record_set(&self, reg: &ServiceRegistration) -> Vec<Record> {
        let mut out = Vec::new();
        for ptr in self.reverse_ptr_records(reg) {
            out.push(Record::Ptr(ptr));
        }
        out.extend(self.address_records(reg));
        out.push(Record::Ptr(self.type_ptr_record(reg)));
        for ptr in self.subtype_ptr_records(reg) {
            out.push(Record::Ptr(ptr));
        }
        out.push(Record::Srv(self.srv_record(reg)));
        out.push(Record::Txt(self.txt_record(reg)));
        out.push(Record::Ptr(self.enumeration_ptr_record(reg)));
        for nsec in self.reverse_nsec_records(reg) {
            out.push(Record::Nsec(nsec));
        }
        out.push(Record::Nsec(self.host_nsec_record(reg)));
        out.push(Record::Nsec(self.instance_nsec_record(reg)));
        out
    }

    // ---- §4.4.1 probing ----

    pub fn set_service_probing(&mut self, id: i32) -> RepoResult<ProbingInfo> {
        let reg = self
            .services
            .get(&id)
            .ok_or(RepositoryError::NoTransaction(id))?;
        if reg.state != ServiceState::Probing {
            return Err(RepositoryError::OperationNotRunning(id));
        }

        let mut questions = vec![Question::new(
            self.instance_name_labels(reg),
            RRType::Any,
            false,
        )];
        let mut authority = vec![Record::Srv(self.srv_record(reg))];

        if self.config.include_host_in_probing {
            questions.push(Question::new(self.host_name_labels(reg), RRType::Any, false));
            authority.extend(self.address_records(reg));
        }

        Ok(ProbingInfo {
            id,
            packet: MdnsPacket {
                transaction_id: 0,
                flags: PacketFlags::QUERY,
                questions,
                answers: vec![],
                authority,
                additional: vec![],
            },
        })
    }

    // ---- §4.4.2 announcement ----

    pub fn on_probing_succeeded(&mut self, id: i32) -> RepoResult<AnnouncementInfo> {
        let reg = self
            .services
            .get_mut(&id)
            .ok_or(RepositoryError::NoTransaction(id))?;
        if reg.state != ServiceState::Probing {
            return Err(RepositoryError::OperationNotRunning(id));
        }
        reg.state = ServiceState::Announcing;
        debug!("service {}: Probing -> Announcing", id);

        let reg = self.services.get(&id).expect("just inserted above");
        let mut answers = Vec::new();
        let mut additional = Vec::new();
        for record in self.full_record_set(reg) {
            if matches!(record, Record::Nsec(_)) {
                additional.push(record);
            } else {
                answers.push(record);
            }
        }

        Ok(AnnouncementInfo {
            id,
            packet: MdnsPacket {
                transaction_id: 0,
                flags: PacketFlags::RESPONSE,
                questions: vec![],
                answers,
                authority: vec![],
                additional,
            },
        })
    }

    pub fn on_advertisement_sent(&mut self, id: i32, sent_packet_count: u32) -> RepoResult<()> {
        let reg = self
            .services
            .get_mut(&id)
            .ok_or(RepositoryError::NoTransaction(id))?;
        reg.sent_packet_count = sent_packet_count;
        trace!(
            "service {}: sent_packet_count={}",
            id,
            sent_packet_count
        );
        if reg.state == ServiceState::Announcing && sent_packet_count >= 2 {
            reg.state = ServiceState::Active;
            debug!("service {}: Announcing -> Active", id);
        }
        Ok(())
    }

    // ---- §4.4.3 exit ----

    pub fn exit_service(&mut self, id: i32) -> RepoResult<Option<MdnsPacket>> {
        let reg = self
            .services
            .get_mut(&id)
            .ok_or(RepositoryError::NoTransaction(id))?;
        if !matches!(reg.state, ServiceState::Announcing | ServiceState::Active) {
            trace!(
                "service {}: exit_service no-op, state is {:?}",
                id,
                reg.state
            );
            return Ok(None);
        }
        let from_state = reg.state;
        reg.state = ServiceState::Exiting;
        debug!("service {}: {:?} -> Exiting", id, from_state);

        let reg = self.services.get(&id).expect("just inserted above");
        let answers = self
            .full_record_set(reg)
            .into_iter()
            .filter_map(|record| match record {
                Record::Ptr(mut ptr) => {
                    ptr.header.ttl_ms = 0;
                    ptr.header.cache_flush = false;
                    Some(Record::Ptr(ptr))
                }
                _ => None,
            })
            .collect();

        Ok(Some(MdnsPacket {
            transaction_id: 0,
            flags: PacketFlags::RESPONSE,
            questions: vec![],
            answers,
            authority: vec![],
            additional: vec![],
        }))
    }

    // ---- §4.4.4 query -> reply ----

    pub fn get_reply(&self, packet: &MdnsPacket, src: SocketAddr, now_ms: u64) -> Option<Reply> {
        if packet.questions.is_empty() {
            return None;
        }

        let mut answers: Vec<Record> = Vec::new();
        let mut matched_unicast_bits: Vec<bool> = Vec::new();

        for question in &packet.questions {
            let mut matched_this_question = false;
            for reg in self.services.values() {
                if reg.state == ServiceState::Probing {
                    continue;
                }
                for record in self.full_record_set(reg) {
                    if !record.matches_qtype(question.qtype) {
                        continue;
                    }
                    let is_match = if record.rtype() == RRType::Ptr {
                        type_equals_or_is_subtype(record.name(), &question.name)
                            || labels_equal(record.name(), &question.name)
                    } else {
                        labels_equal(record.name(), &question.name)
                    };
                    if !is_match {
                        continue;
                    }
                    matched_this_question = true;
                    push_unique(&mut answers, record);
                }
            }
            if matched_this_question {
                matched_unicast_bits.push(question.unicast);
            }
        }

        if answers.is_empty() {
            return None;
        }

        let mut known_answers = Vec::new();
        if self.config.known_answer_suppression {
            answers.retain(|ans| {
                let matched_ka = packet.answers.iter().find(|ka| {
                    ka.rtype() == ans.rtype()
                        && labels_equal(ka.name(), ans.name())
                        && ka.rdata_eq(ans)
                        && ka.header().remaining_ttl_ms(now_ms) >= ans.header().ttl_ms / 2
                });
                if let Some(ka) = matched_ka {
                    known_answers.push(ka.clone());
                    false
                } else {
                    true
                }
            });
        }

        if answers.is_empty() {
            return None;
        }

        let mut additional = Vec::new();
        for ans in &answers {
            self.append_additional_for(ans, &mut additional);
        }
        additional.retain(|rec| !answers.iter().any(|a| record_identity_eq(a, rec)));
        dedup_records(&mut additional);

        let destination = if !self.config.unicast_reply {
            multicast_destination(src)
        } else if matched_unicast_bits.iter().all(|&u| u) {
            Destination::Unicast(src)
        } else {
            multicast_destination(src)
        };

        debug!(
            "get_reply: {} answers, {} additional, destination={:?}",
            answers.len(),
            additional.len(),
            destination
        );

        Some(Reply {
            destination,
            answers,
            additional_answers: additional,
            known_answers,
        })
    }

    fn append_additional_for(&self, answer: &Record, out: &mut Vec<Record>) {
        match answer {
            Record::Ptr(ptr) => {
                if let Some(reg) = self.find_registration_by_instance(&ptr.pointer) {
                    out.push(Record::Srv(self.srv_record(reg)));
                    out.push(Record::Txt(self.txt_record(reg)));
                    out.extend(self.address_records(reg));
                    out.push(Record::Nsec(self.instance_nsec_record(reg)));
                    out.push(Record::Nsec(self.host_nsec_record(reg)));
                } else if let Some(reg) = self.find_registration_by_host(&ptr.pointer) {
                    out.push(Record::Nsec(self.host_nsec_record(reg)));
                }
            }
            Record::Srv(srv) => {
                if let Some(reg) = self.find_registration_by_host(&srv.target) {
                    out.extend(self.address_records(reg));
                    out.push(Record::Nsec(self.host_nsec_record(reg)));
                }
            }
            Record::A(_) | Record::Aaaa(_) => {
                if let Some(reg) = self.find_registration_by_host(answer.name()) {
                    out.push(Record::Nsec(self.host_nsec_record(reg)));
                }
            }
            _ => {}
        }
    }

    fn find_registration_by_instance(&self, name: &Labels) -> Option<&ServiceRegistration> {
        self.services
            .values()
            .find(|reg| labels_equal(&self.instance_name_labels(reg), name))
    }

    fn find_registration_by_host(&self, name: &Labels) -> Option<&ServiceRegistration> {
        self.services
            .values()
            .find(|reg| labels_equal(&self.host_name_labels(reg), name))
    }

    // ---- §4.4.5 conflict detection ----

    pub fn get_conflicting_services(&self, packet: &MdnsPacket) -> HashMap<i32, ConflictKind> {
        let mut conflicts = HashMap::new();

        let mut owned_host_addresses: HashMap<String, (i32, std::collections::HashSet<IpAddr>)> =
            HashMap::new();
        for reg in self.services.values() {
            if matches!(reg.hostname, Hostname::Custom(_)) {
                let key = fold_name_key(&self.host_name_labels(reg));
                owned_host_addresses
                    .entry(key)
                    .or_insert_with(|| (reg.id, reg.addresses.iter().copied().collect()));
            }
        }
        let mut incoming_by_host: HashMap<String, std::collections::HashSet<IpAddr>> =
            HashMap::new();

        for inc in &packet.answers {
            match inc {
                Record::Srv(_) | Record::Txt(_) => {
                    for reg in self.services.values() {
                        if !labels_equal(&self.instance_name_labels(reg), inc.name()) {
                            continue;
                        }
                        let ours = match inc {
                            Record::Srv(_) => Record::Srv(self.srv_record(reg)),
                            Record::Txt(_) => Record::Txt(self.txt_record(reg)),
                            _ => unreachable!(),
                        };
                        if !inc.rdata_eq(&ours) || inc.header().ttl_ms != ours.header().ttl_ms {
                            warn!("service {}: conflict detected (Service)", reg.id);
                            conflicts.entry(reg.id).or_insert(ConflictKind::Service);
                        }
                    }
                }
                Record::A(_) | Record::Aaaa(_) => {
                    let key = fold_name_key(inc.name());
                    if owned_host_addresses.contains_key(&key) {
                        let addr = match inc {
                            Record::A(a) => IpAddr::V4(a.addr),
                            Record::Aaaa(a) => IpAddr::V6(a.addr),
                            _ => unreachable!(),
                        };
                        incoming_by_host.entry(key).or_default().insert(addr);
                    }
                }
                _ => {}
            }
        }

        for (key, incoming) in incoming_by_host {
            if let Some((id, owned)) = owned_host_addresses.get(&key) {
                if !incoming.is_subset(owned) {
                    warn!("service {}: conflict detected (Host)", id);
                    conflicts.insert(*id, ConflictKind::Host);
                }
            }
        }

        conflicts
    }
}

fn fold_name_key(name: &Labels) -> String {
    name.to_string().to_ascii_lowercase()
}

fn record_identity_eq(a: &Record, b: &Record) -> bool {
    a.rtype() == b.rtype() && labels_equal(a.name(), b.name()) && a.rdata_eq(b)
}

fn push_unique(out: &mut Vec<Record>, record: Record) {
    if !out.iter().any(|existing| record_identity_eq(existing, &record)) {
        out.push(record);
    }
}

fn dedup_records(records: &mut Vec<Record>) {
    let mut deduped: Vec<Record> = Vec::with_capacity(records.len());
    for record in records.drain(..) {
        if !deduped.iter().any(|existing| record_identity_eq(existing, &record)) {
            deduped.push(record);
        }
    }
    *records = deduped;
}

fn multicast_destination(src: SocketAddr) -> Destination {
    match src {
        SocketAddr::V4(_) => Destination::MulticastV4,
        SocketAddr::V6(_) => Destination::MulticastV6,
    }
}
