use serde::{Deserialize, Serialize};

/// Reference to a clip's acquired audio. Created once by the audio
/// processor and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioArtifact {
    pub clip_id: String,
    pub object_key: String,
    pub byte_size: u64,
    pub format: String,
}
