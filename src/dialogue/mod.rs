//! Conversational intake: events, stages, menu commands, and the engine
//! that ties them together.

pub mod command;
pub mod engine;
pub mod event;
pub mod locks;
pub mod stage;
pub mod texts;

pub use command::MenuCommand;
pub use engine::DialogueEngine;
pub use event::{InboundEvent, OutboundMessage, PhotoVariant};
pub use locks::ChatLocks;
pub use stage::{ConversationStage, StageStore};
