mod define;
mod error;
mod parser;

pub use define::{MessageData, MessageTypeId};
pub use error::MessageError;
