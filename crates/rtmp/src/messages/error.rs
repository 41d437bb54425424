use thiserror::Error;

use crate::command_messages::CommandError;
use crate::protocol_control_messages::ProtocolControlMessageError;
use crate::user_control_messages::UserControlMessageError;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    ProtocolControl(#[from] ProtocolControlMessageError),
    #[error(transparent)]
    UserControl(#[from] UserControlMessageError),
    #[error(transparent)]
    Command(#[from] CommandError),
}
