//! Writing-assistant operations for the Penwise CMS.
//!
//! - [`prompts`] — task prompt builders (pure functions)
//! - [`interpret`] — reply decoders with deterministic fallbacks
//! - [`assistant::WritingAssistant`] — the facade the web layer calls

pub mod assistant;
pub mod interpret;
pub mod prompts;

pub use assistant::WritingAssistant;
pub use interpret::Interpreter;
