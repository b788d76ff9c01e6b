pub mod transcript_store;

pub use transcript_store::{SqliteTranscriptStore, TranscriptStore};
