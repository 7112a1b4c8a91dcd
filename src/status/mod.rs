pub mod apply;
pub mod backup;

pub use apply::ApplyStatus;
pub use backup::BackupStatus;
