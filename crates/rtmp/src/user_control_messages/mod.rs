mod define;
mod error;
mod reader;
mod writer;

pub use define::{EventType, UserControlMessage};
pub use error::UserControlMessageError;
pub use reader::read_user_control_message;
pub use writer::write_ping_response;
