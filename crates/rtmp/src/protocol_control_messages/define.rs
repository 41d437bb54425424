#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ProtocolControlMessageSetChunkSize {
    pub chunk_size: u32,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ProtocolControlMessageWindowAcknowledgementSize {
    pub acknowledgement_window_size: u32,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum ProtocolControlMessageSetPeerBandwidthLimitType {
    Hard = 0,
    Soft = 1,
    Dynamic = 2,
}

impl ProtocolControlMessageSetPeerBandwidthLimitType {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Hard),
            1 => Some(Self::Soft),
            2 => Some(Self::Dynamic),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ProtocolControlMessageSetPeerBandwidth {
    pub acknowledgement_window_size: u32,
    pub limit_type: ProtocolControlMessageSetPeerBandwidthLimitType,
}
