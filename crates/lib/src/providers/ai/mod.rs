pub mod embedding;
pub mod openai;

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

pub use embedding::{Embedder, OpenAiEmbedder};
pub use openai::OpenAiChatProvider;

/// A trait for interacting with a chat-completion provider.
///
/// Implementations are configured with their model and sampling temperature at
/// construction time, so a call carries only the two prompt blocks.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result is the raw text of the model's reply.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ProviderError>;
}

dyn_clone::clone_trait_object!(AiProvider);
