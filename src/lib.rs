//! scenesmith: agent-generated Manim scenes rendered to video
//!
//! A problem statement flows through three generation stages (decompose, script, author
//! code). The authored code is extracted, written under a fresh identifier, rendered by an
//! external Manim process, and resolved back to exactly the video that run produced.
//! Format and render failures are fed back into generation for a bounded number of attempts.

pub mod agent;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod session;
pub mod timer;
