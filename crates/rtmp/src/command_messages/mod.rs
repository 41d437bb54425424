mod define;
mod error;
mod reader;
mod writer;

pub use define::{ParsedCommand, CONNECT_TRANSACTION_ID, CREATE_STREAM_TRANSACTION_ID, ZERO_TRANSACTION_ID};
pub use error::CommandError;
pub use reader::read_command;
pub use writer::{write_connect, write_create_stream, write_data_frame, write_delete_stream, write_publish, write_text_data};
