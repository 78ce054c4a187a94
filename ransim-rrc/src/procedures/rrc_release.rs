//! RRC Release Procedure
//!
//! Releases the RRC connection; the UE moves to RRC_IDLE without answering.

use crate::codec::{RrcError, RrcIeSet, RrcIeWriter, RrcMessageBody, RrcResult};
use crate::enums::{ReleaseCause, RrcMessageType};
use crate::iei;

/// RRCRelease: `cause(1) || IEs`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RrcRelease {
    pub cause: ReleaseCause,
    pub redirected_carrier_info: Option<Vec<u8>>,
}

impl RrcRelease {
    pub fn new(cause: ReleaseCause) -> Self {
        Self {
            cause,
            redirected_carrier_info: None,
        }
    }
}

impl RrcMessageBody for RrcRelease {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::Release;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let mut w = RrcIeWriter::new();
        w.put_fixed(&[self.cause.into()]);
        w.put_opt(iei::REDIRECTED_CARRIER_INFO, self.redirected_carrier_info.as_deref())?;
        Ok(w.finish())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let Some((&cause, rest)) = payload.split_first() else {
            return Err(RrcError::MissingMandatoryField("releaseCause"));
        };
        let cause = ReleaseCause::try_from(cause)
            .map_err(|_| RrcError::InvalidFieldValue(format!("Unknown release cause: {cause}")))?;
        let ies = RrcIeSet::parse(rest)?;
        Ok(Self {
            cause,
            redirected_carrier_info: ies.get_vec(iei::REDIRECTED_CARRIER_INFO),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rrc_release() {
        let bytes = RrcRelease::new(ReleaseCause::Normal).encode(0).unwrap();
        assert_eq!(bytes, vec![0x01, 0x06, 0x01]);
    }

    #[test]
    fn test_rrc_release_with_redirection() {
        let release = RrcRelease {
            cause: ReleaseCause::Congestion,
            redirected_carrier_info: Some(vec![0x00, 0x27, 0x10]),
        };
        let bytes = release.encode(2).unwrap();
        assert_eq!(RrcRelease::decode(&bytes).unwrap(), (2, release));
    }

    #[test]
    fn test_parse_rrc_release_errors() {
        assert!(RrcRelease::decode(&[0x01, 0x06]).is_err());
        assert!(RrcRelease::decode(&[0x01, 0x06, 0x07]).is_err());
    }
}
