use rtmp_amf0::Amf0Value;

/// Transaction id this publisher uses for the `connect` command.
pub const CONNECT_TRANSACTION_ID: f64 = 1.0;
/// Transaction id this publisher uses for `createStream`.
pub const CREATE_STREAM_TRANSACTION_ID: f64 = 10.0;
/// Transaction id used for `publish`, `deleteStream`, and expected on
/// `onStatus` replies.
pub const ZERO_TRANSACTION_ID: f64 = 0.0;

/// A command message read off the wire, parsed just far enough to dispatch
/// on command name and transaction id; the publishing controller interprets
/// the rest.
#[derive(Debug, Clone)]
pub struct ParsedCommand<'a> {
    pub command_name: std::borrow::Cow<'a, str>,
    pub transaction_id: f64,
    pub command_object: Amf0Value<'a>,
    pub others: Vec<Amf0Value<'a>>,
}

impl<'a> ParsedCommand<'a> {
    /// Returns the first element of `others`, if any — where this
    /// publisher's server replies carry the `information`/`streamId`
    /// argument that follows the command object.
    pub fn first_other(&self) -> Option<&Amf0Value<'a>> {
        self.others.first()
    }
}
