//! The publishing session: the deframer/reader task, the session state
//! machine, the events it raises, and the actor that owns both the state
//! machine and the outbound transport.

mod controller;
mod events;
mod reader;
mod state;

pub use controller::PublishingController;
pub use events::ReaderEvent;
pub use state::SessionState;
