//! HTTP collaborators
//!
//! The transcription, notes and chat services are external black boxes
//! behind a fixed request/response contract. These clients fail closed on
//! any non-success response, leaving session state as last-known-good.

mod clients;
mod types;

pub use clients::{ChatClient, NotesClient, RemoteClients, TranscriptionClient};
pub use types::{
    ChatRequest, ChatResponse, ChatTurn, ErrorPayload, NotesRequest, NotesResponse,
    TranscriptionResponse, WireSegment,
};
