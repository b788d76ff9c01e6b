pub mod backends;
pub mod context;
pub mod router;
pub mod service;

pub use backends::{GeminiBackend, GenerationParams, HuggingFaceBackend, TextBackend};
pub use context::assemble;
pub use router::CompletionRouter;
pub use service::ChatService;
