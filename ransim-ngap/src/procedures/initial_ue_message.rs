//! Initial UE Message Procedure
//!
//! Implements the Initial UE Message procedure as defined in 3GPP TS 38.413 Section 8.6.1.
//! The gNB uses it to forward the first uplink NAS message of a UE to the AMF,
//! creating the UE-associated logical NG connection.

use crate::codec::{
    decode_ran_ue_ngap_id, encode_ran_ue_ngap_id, NgapError, NgapIeSet, NgapMessageBody,
    NgapMessageBuilder, NgapResult,
};
use crate::enums::{NgapMessageType, RrcEstablishmentCause};
use crate::iei;
use crate::ies::UserLocationInfoNr;

/// Initial UE Message (gNB to AMF)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialUeMessage {
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: Vec<u8>,
    pub user_location_info: UserLocationInfoNr,
    pub rrc_establishment_cause: RrcEstablishmentCause,
}

impl NgapMessageBody for InitialUeMessage {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::InitialUeMessage;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::RAN_UE_NGAP_ID, encode_ran_ue_ngap_id(self.ran_ue_ngap_id))?
            .ie(iei::NAS_PDU, self.nas_pdu.clone())?
            .ie(iei::USER_LOCATION_INFORMATION, self.user_location_info.encode())?
            .ie(iei::RRC_ESTABLISHMENT_CAUSE, vec![self.rrc_establishment_cause.into()])?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        let cause = ies.require_u8(iei::RRC_ESTABLISHMENT_CAUSE, "RRCEstablishmentCause")?;
        Ok(Self {
            ran_ue_ngap_id: decode_ran_ue_ngap_id(ies.require(iei::RAN_UE_NGAP_ID, "RAN-UE-NGAP-ID")?)?,
            nas_pdu: ies.require(iei::NAS_PDU, "NAS-PDU")?.to_vec(),
            user_location_info: UserLocationInfoNr::decode(
                ies.require(iei::USER_LOCATION_INFORMATION, "UserLocationInformation")?,
            )?,
            rrc_establishment_cause: RrcEstablishmentCause::try_from(cause).map_err(|_| {
                NgapError::InvalidIeValue(format!("Unknown RRCEstablishmentCause value: {cause}"))
            })?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ransim_common::Plmn;

    fn create_test_message() -> InitialUeMessage {
        InitialUeMessage {
            ran_ue_ngap_id: 1,
            nas_pdu: vec![0x00, 0x41, 0x09, 0x01, 0x01],
            user_location_info: UserLocationInfoNr::new(Plmn::new(208, 93, false), 0x10, 1),
            rrc_establishment_cause: RrcEstablishmentCause::MoSignalling,
        }
    }

    #[test]
    fn test_initial_ue_message_round_trip() {
        let msg = create_test_message();
        let bytes = msg.encode().unwrap();
        assert_eq!(bytes[0], 0x04);
        assert_eq!(&bytes[1..9], &[0x00, 0x55, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(InitialUeMessage::decode(&bytes).unwrap(), msg);
    }

    #[test]
    fn test_initial_ue_message_missing_nas_pdu() {
        let msg = create_test_message();
        let mut builder = NgapMessageBuilder::new(NgapMessageType::InitialUeMessage);
        builder
            .ie(iei::RAN_UE_NGAP_ID, encode_ran_ue_ngap_id(1))
            .unwrap()
            .ie(iei::USER_LOCATION_INFORMATION, msg.user_location_info.encode())
            .unwrap()
            .ie(iei::RRC_ESTABLISHMENT_CAUSE, vec![3])
            .unwrap();
        assert_eq!(
            InitialUeMessage::decode(&builder.build()),
            Err(NgapError::MissingMandatoryIe("NAS-PDU"))
        );
    }

    #[test]
    fn test_initial_ue_message_bad_cause() {
        let mut msg = create_test_message().encode().unwrap();
        let last = msg.len() - 1;
        msg[last] = 0x7F;
        assert!(matches!(InitialUeMessage::decode(&msg), Err(NgapError::InvalidIeValue(_))));
    }
}
