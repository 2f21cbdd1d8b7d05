pub mod access_grant;
pub mod preset_task;
pub mod privacy;
pub mod resource;
pub mod tag;
pub mod task;
pub mod user;

pub use access_grant::AccessGrant;
pub use preset_task::PresetTask;
pub use privacy::{PrivacyColumnsError, PrivacyLevel, PrivacyState};
pub use resource::{Resource, ResourceKind, ResourceRow};
pub use tag::Tag;
pub use task::Task;
pub use user::{merge_settings, User, UserResponse, UserSettings};
