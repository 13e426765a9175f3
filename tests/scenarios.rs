//! End-to-end scenarios exercised entirely through the public API: register
//! a service, drive it through probing and announcement, and check the
//! packets/replies a caller would actually see.

use std::net::SocketAddr;

use mdns_repository::config::RepositoryConfig;
use mdns_repository::names::Labels;
use mdns_repository::packet::{MdnsPacket, PacketFlags, Question};
use mdns_repository::record::{
    AaaaRecord, PtrRecord, RRType, Record, RecordHeader, TxtEntry, SHORT_TTL_MS,
};
use mdns_repository::repository::{ConflictKind, Destination, MdnsRecordRepository, NEW_REGISTRATION};
use mdns_repository::service::ServiceInfo;

const HOST_HEX: &str = "000102030405060708090A0B0C0D0E0F";

fn config() -> RepositoryConfig {
    RepositoryConfig {
        host_label: HOST_HEX.into(),
        include_host_in_probing: false,
        known_answer_suppression: true,
        unicast_reply: true,
        privileged: false,
    }
}

fn repo_with_default_addresses() -> MdnsRecordRepository {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut repo = MdnsRecordRepository::new(config());
    repo.update_addresses(vec![
        "192.0.2.111".parse().unwrap(),
        "2001:db8::111".parse().unwrap(),
        "2001:db8::222".parse().unwrap(),
    ]);
    repo
}

fn basic_service() -> ServiceInfo {
    ServiceInfo {
        instance_name: "MyTestService".into(),
        service_type: "_testservice._tcp".into(),
        port: 12345,
        txt: vec![TxtEntry {
            key: "path".into(),
            value: Some(b"/".to_vec()),
        }],
        custom_host: None,
        addresses: vec![],
    }
}

fn browser_query(name: &str, qtype: RRType) -> MdnsPacket {
    MdnsPacket {
        transaction_id: 0,
        flags: PacketFlags::QUERY,
        questions: vec![Question::new(Labels::from_dotted(name), qtype, false)],
        answers: vec![],
        authority: vec![],
        additional: vec![],
    }
}

/// S1: register a service, probe it, announce it, then browse for it and
/// confirm the reply resolves down to SRV/TXT/addresses for the host name
/// `Android_<hex>.local`.
#[test]
fn s1_advertise_then_browse() {
    let mut repo = repo_with_default_addresses();
    assert_eq!(
        repo.add_service(1, basic_service(), None).unwrap(),
        NEW_REGISTRATION
    );

    let probing = repo.set_service_probing(1).unwrap();
    assert!(!probing.packet.flags.is_response());
    assert_eq!(probing.packet.questions.len(), 1);

    let announcement = repo.on_probing_succeeded(1).unwrap();
    assert!(announcement.packet.flags.is_response());
    repo.on_advertisement_sent(1, 2).unwrap();

    let query = browser_query("_testservice._tcp.local", RRType::Ptr);
    let src: SocketAddr = "192.0.2.123:5353".parse().unwrap();
    let reply = repo.get_reply(&query, src, 0).expect("expected a reply");

    assert_eq!(reply.answers.len(), 1);
    let srv_target = reply
        .additional_answers
        .iter()
        .find_map(|r| match r {
            Record::Srv(srv) => Some(srv.target.clone()),
            _ => None,
        })
        .expect("SRV record in additional answers");
    assert_eq!(
        srv_target,
        Labels::from_dotted(&format!("Android_{}.local", HOST_HEX))
    );

    let address_count = reply
        .additional_answers
        .iter()
        .filter(|r| matches!(r, Record::A(_) | Record::Aaaa(_)))
        .count();
    assert_eq!(address_count, 3);
}

/// S2: a subtype-qualified browse resolves to the instance PTR even though
/// the question name never literally matches the base service type.
#[test]
fn s2_subtype_browse_resolves_to_instance() {
    let mut repo = repo_with_default_addresses();
    let mut info = basic_service();
    info.service_type = "_testservice._tcp,_printer".into();
    repo.add_service(1, info, None).unwrap();
    repo.on_probing_succeeded(1).unwrap();

    let query = browser_query("_printer._sub._testservice._tcp.local", RRType::Ptr);
    let src: SocketAddr = "192.0.2.123:5353".parse().unwrap();
    let reply = repo.get_reply(&query, src, 0).expect("expected a reply");

    assert_eq!(reply.answers.len(), 1);
    match &reply.answers[0] {
        Record::Ptr(ptr) => assert_eq!(
            ptr.pointer,
            Labels::from_dotted("MyTestService._testservice._tcp.local")
        ),
        other => panic!("expected PTR answer, got {:?}", other),
    }
}

/// S3: a known-answer whose remaining TTL is still at least half the
/// authoritative TTL suppresses the reply entirely.
#[test]
fn s3_known_answer_suppression() {
    let mut repo = repo_with_default_addresses();
    repo.add_service(1, basic_service(), None).unwrap();
    repo.on_probing_succeeded(1).unwrap();

    let known_answer = Record::Ptr(PtrRecord {
        header: RecordHeader::local(
            Labels::from_dotted("_testservice._tcp.local"),
            false,
            4_499_000,
        ),
        pointer: Labels::from_dotted("MyTestService._testservice._tcp.local"),
    });
    let mut query = browser_query("_testservice._tcp.local", RRType::Ptr);
    query.answers.push(known_answer);

    let src: SocketAddr = "192.0.2.123:5353".parse().unwrap();
    assert!(repo.get_reply(&query, src, 0).is_none());
}

/// S4: a custom host sees a conflict only when the incoming address set is
/// not a subset of the addresses it actually owns.
#[test]
fn s4_host_conflict_on_superset() {
    let mut repo = repo_with_default_addresses();
    let mut info = basic_service();
    info.custom_host = Some("TestHost".into());
    info.addresses = vec!["2001:db8::1".parse().unwrap(), "2001:db8::2".parse().unwrap()];
    repo.add_service(1, info, None).unwrap();

    let conflicting = MdnsPacket {
        transaction_id: 0,
        flags: PacketFlags::RESPONSE,
        questions: vec![],
        answers: vec![
            Record::Aaaa(AaaaRecord {
                header: RecordHeader::local(Labels::from_dotted("TestHost.local"), true, SHORT_TTL_MS),
                addr: "2001:db8::1".parse().unwrap(),
            }),
            Record::Aaaa(AaaaRecord {
                header: RecordHeader::local(Labels::from_dotted("TestHost.local"), true, SHORT_TTL_MS),
                addr: "2001:db8::99".parse().unwrap(),
            }),
        ],
        authority: vec![],
        additional: vec![],
    };
    let conflicts = repo.get_conflicting_services(&conflicting);
    assert_eq!(conflicts.get(&1), Some(&ConflictKind::Host));
}

/// S5: exiting an active service produces a PTR-only, zero-TTL goodbye
/// packet, and the registration no longer answers browse queries.
#[test]
fn s5_exit_stops_answering_queries() {
    let mut repo = repo_with_default_addresses();
    repo.add_service(1, basic_service(), None).unwrap();
    repo.on_probing_succeeded(1).unwrap();
    repo.on_advertisement_sent(1, 2).unwrap();

    let goodbye = repo.exit_service(1).unwrap().expect("exiting packet");
    assert!(goodbye
        .answers
        .iter()
        .all(|r| r.rtype() == RRType::Ptr && r.header().ttl_ms == 0));

    repo.remove_service(1).unwrap();

    let query = browser_query("_testservice._tcp.local", RRType::Ptr);
    let src: SocketAddr = "192.0.2.123:5353".parse().unwrap();
    assert!(repo.get_reply(&query, src, 0).is_none());
}

/// S6: registering the same instance name and type again, differing only
/// by ASCII case, returns the existing id rather than creating a second
/// registration or erroring.
#[test]
fn s6_case_insensitive_duplicate_is_idempotent() {
    let mut repo = repo_with_default_addresses();
    let first = repo.add_service(1, basic_service(), None).unwrap();
    assert_eq!(first, NEW_REGISTRATION);

    let mut dup = basic_service();
    dup.instance_name = "MYTESTSERVICE".into();
    dup.service_type = "_TESTSERVICE._TCP".into();
    let second = repo.add_service(2, dup, None).unwrap();
    assert_eq!(second, 1);
    assert_eq!(repo.services_count(), 1);
}

/// Unicast ("QU") browse query gets a unicast reply back to the querier.
#[test]
fn unicast_query_gets_unicast_reply() {
    let mut repo = repo_with_default_addresses();
    repo.add_service(1, basic_service(), None).unwrap();
    repo.on_probing_succeeded(1).unwrap();

    let query = MdnsPacket {
        transaction_id: 0,
        flags: PacketFlags::QUERY,
        questions: vec![Question::new(
            Labels::from_dotted("_testservice._tcp.local"),
            RRType::Ptr,
            true,
        )],
        answers: vec![],
        authority: vec![],
        additional: vec![],
    };
    let src: SocketAddr = "192.0.2.123:5353".parse().unwrap();
    let reply = repo.get_reply(&query, src, 0).unwrap();
    assert_eq!(reply.destination, Destination::Unicast(src));
}

/// The offload snapshot for a single registration carries no subtypes, no
/// enumeration PTR and no NSEC records, just the core instance records.
#[test]
fn offload_snapshot_is_minimal() {
    let mut repo = repo_with_default_addresses();
    let mut info = basic_service();
    info.service_type = "_testservice._tcp,_printer".into();
    repo.add_service(7, info, None).unwrap();

    let packet = repo.get_offload_packet(7).unwrap();
    assert!(packet.flags.is_response());
    assert!(packet.answers.iter().all(|r| r.rtype() != RRType::Nsec));
    assert_eq!(
        packet
            .answers
            .iter()
            .filter(|r| r.rtype() == RRType::Srv)
            .count(),
        1
    );
}
