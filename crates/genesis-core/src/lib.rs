//! genesis-core: Conversation state for the Genesis chat client
//!
//! One [`ConversationStore`] holds the transcript and the latest backend run.
//! The [`MessageDispatcher`] is the only thing that talks to `/chat` and
//! writes the run; the [`ConnectivityProbe`] watches `/health` on the side.
//! Everything a view displays is derived from the store through the pure
//! mappers in [`views`].

pub mod dispatcher;
pub mod message;
pub mod probe;
pub mod store;
pub mod views;

pub use dispatcher::{MessageDispatcher, RejectReason, SendOutcome};
pub use message::{Message, MessagePatch, Role};
pub use probe::{ConnectivityFlag, ConnectivityProbe, Reachability};
pub use store::{ConversationSnapshot, ConversationStore};
pub use views::{DerivedViews, ViewPolicies};
