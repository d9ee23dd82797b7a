//! VoiceNote - record, transcribe, and review voice notes against a host record
//!
//! This crate provides the session core for a voice note feature: capture
//! audio from a device, transcribe it through a remote backend, let the user
//! review and edit the transcript, and persist either the transcript plus
//! audio or the audio alone.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the session entity, and domain errors
//! - **Application**: The session use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (HTTP backend, desktop
//!   notifications, XDG config store)

pub mod application;
pub mod domain;
pub mod infrastructure;
