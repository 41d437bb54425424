use rtmp_amf0::{Amf0Decoder, Amf0Marker, Amf0Value};

use super::define::ParsedCommand;
use super::error::CommandError;

/// Parses a COMMAND_AMF0 message payload into command name, transaction id,
/// command object, and any further arguments.
///
/// Some servers decode the command object by trying `Object` and falling
/// back to `Null` on failure; this implementation instead peeks the marker
/// byte first and decodes the matching kind directly, since both shapes
/// are legal here and a peek avoids relying on decode failure for control
/// flow.
pub fn read_command(payload: &[u8]) -> Result<ParsedCommand<'_>, CommandError> {
    let mut decoder = Amf0Decoder::new(payload);

    let Amf0Value::String(command_name) = decoder.decode_with_type(Amf0Marker::String)? else {
        unreachable!("decode_with_type(String) only returns Amf0Value::String")
    };
    let Amf0Value::Number(transaction_id) = decoder.decode_with_type(Amf0Marker::Number)? else {
        unreachable!("decode_with_type(Number) only returns Amf0Value::Number")
    };

    let command_object = match decoder.peek_marker()? {
        Amf0Marker::Null => decoder.decode_with_type(Amf0Marker::Null)?,
        _ => decoder.decode_with_type(Amf0Marker::Object)?,
    };

    let others = decoder.decode_all()?;

    Ok(ParsedCommand {
        command_name,
        transaction_id,
        command_object,
        others,
    })
}
