//! Slack slash-command integration
//!
//! ```text
//! raw text ──> command::parse ──> SlashCommand ──> interpreter ──> ResponseDescriptor ──> blocks
//! ```
//!
//! Signature checking and user resolution happen in the HTTP layer
//! (`api::auth`, `api::handlers::slack`) before anything here runs.

pub mod blocks;
pub mod command;
pub mod interpreter;

pub use command::CommandKind;
pub use interpreter::interpret_slash_command;
