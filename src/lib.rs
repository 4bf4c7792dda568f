// MindMitra - Emotion-aware companion chat service
// Library exports

// Core pipeline
pub mod context;
pub mod crisis;
pub mod emotion;
pub mod generator;
pub mod pipeline;

// Backends
pub mod providers; // LLM generation and classification calls
pub mod storage; // Conversation history and mood logs

// Service surface
pub mod analytics;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod server;
