//! Offload snapshot: a canonical single-registration response packet for
//! hardware/firmware offload engines that keep answering after the host
//! goes to sleep.
use crate::error::{RepoResult, RepositoryError};
use crate::packet::{MdnsPacket, PacketFlags};
use crate::record::Record;
use crate::repository::MdnsRecordRepository;

impl MdnsRecordRepository {
    /// Builds the offload packet for a single registration: type-PTR, SRV,
    /// TXT, then each address record for the host, in that order. No
    /// subtypes, no service-type enumeration PTR, no NSEC.
    pub fn get_offload_packet(&self, id: i32) -> RepoResult<MdnsPacket> {
        let reg = self
            .services()
            .get(&id)
            .ok_or(RepositoryError::NoTransaction(id))?;

        let mut answers = vec![
            Record::Ptr(self.type_ptr_record(reg)),
            Record::Srv(self.srv_record(reg)),
            Record::Txt(self.txt_record(reg)),
        ];
        answers.extend(self.address_records(reg));

        Ok(MdnsPacket {
            transaction_id: 0,
            flags: PacketFlags::RESPONSE,
            questions: vec![],
            answers,
            authority: vec![],
            additional: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RepositoryConfig;
    use crate::record::{RRType, TxtEntry};
    use crate::repository::MdnsRecordRepository;
    use crate::service::ServiceInfo;

    fn repo() -> MdnsRecordRepository {
        let mut repo = MdnsRecordRepository::new(RepositoryConfig::new(false));
        repo.update_addresses(vec!["192.0.2.111".parse().unwrap()]);
        repo.add_service(
            42,
            ServiceInfo {
                instance_name: "MyTestService".into(),
                service_type: "_testservice._tcp,_subtype".into(),
                port: 12345,
                txt: vec![TxtEntry {
                    key: "path".into(),
                    value: Some(b"/".to_vec()),
                }],
                custom_host: None,
                addresses: vec![],
            },
            None,
        )
        .unwrap();
        repo
    }

    #[test]
    fn offload_packet_order_and_shape() {
        let repo = repo();
        let packet = repo.get_offload_packet(42).unwrap();
        assert_eq!(packet.answers.len(), 4);
        assert_eq!(packet.answers[0].rtype(), RRType::Ptr);
        assert_eq!(packet.answers[1].rtype(), RRType::Srv);
        assert_eq!(packet.answers[2].rtype(), RRType::Txt);
        assert_eq!(packet.answers[3].rtype(), RRType::A);
        assert!(packet.flags.is_response());
        assert!(packet.questions.is_empty());
        assert!(packet.additional.is_empty());
    }

    #[test]
    fn offload_packet_unknown_id_fails() {
        let repo = repo();
        assert!(repo.get_offload_packet(999).is_err());
    }
}
