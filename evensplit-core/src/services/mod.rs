//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod group;
pub mod logging;
pub mod migration;

pub use group::{GroupService, MAX_DESCRIPTION_LEN, MAX_GROUP_NAME_LEN, MAX_USER_NAME_LEN};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
