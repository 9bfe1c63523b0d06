//! ContentItem CRUD, legacy-clip migration, and scoring/selection: the
//! central record store the orchestrator reads and advances.
//!
//! - `service` - put/get/list/update/counts_by_status over `ContentItem`
//! - `migration` - converts legacy clip records into `ContentItem`s
//! - `scorer` - weighted scoring and top-N selection
//! - `sanitize` - field sanitization shared by `service`
//! - `error` - error taxonomy

pub mod error;
pub mod migration;
pub mod sanitize;
pub mod scorer;
pub mod service;

pub use error::{ContentError, ContentResult};
pub use migration::{MigrationErrorCode, MigrationFailure, MigrationReport, Migrator};
pub use scorer::{ScoreInput, ScoreWeights, ScoredCandidate, Scorer};
pub use service::{ContentItemService, ContentListPage, ContentListQuery};
