//! Artifact domain: extraction, naming, persistence, output layout, and resolution.
//!
//! A source artifact and its video share one identifier from the moment the source is
//! written; resolution proves the pairing instead of guessing it from directory state.

pub mod extract;
pub mod layout;
pub mod namer;
pub mod registry;
pub mod resolver;
pub mod writer;

pub use extract::extract_source;
pub use layout::{OutputContract, OutputLayout, QualityTier};
pub use namer::{Identifier, IdentifierGenerator, Namer, RandomNamer};
pub use registry::{RunEntry, RunId, RunRegistry};
pub use resolver::{pick_latest, ArtifactResolver, ResolvedVideo, ScanCandidate, VideoArtifact};
pub use writer::{SourceArtifact, SourceWriter};
