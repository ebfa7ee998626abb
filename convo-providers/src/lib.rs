//! Reply generators for convo
//!
//! A generator turns a prompt plus the recent conversation context into an
//! assistant reply. The session store never calls a generator itself; the
//! chat service does, between two store calls.

pub mod base;
pub mod echo;
pub mod openai;

pub use base::{
    build_messages, GenerateError, GenerateResult, Message, ReplyGenerator, FALLBACK_REPLY,
};
pub use echo::EchoGenerator;
pub use openai::OpenAiCompatGenerator;

use convo_core::config::{GeneratorConfig, GeneratorKind};
use std::sync::Arc;

/// Build the generator selected by `config.provider`
pub fn from_config(config: &GeneratorConfig) -> GenerateResult<Arc<dyn ReplyGenerator>> {
    match config.provider {
        GeneratorKind::Openai => Ok(Arc::new(OpenAiCompatGenerator::new(config)?)),
        GeneratorKind::Echo => Ok(Arc::new(EchoGenerator)),
    }
}
