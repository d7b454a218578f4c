use crate::{FieldGroup, PhotoKind, PhotoUploads, Result, UserId};

/// Read access to users' profile data.
///
/// Implementations report missing data as empty groups or `false` rather than
/// failing; the progress computation treats absence as "not completed".
pub trait ProfileDataSource: Send + Sync {
    /// All field groups in their natural order, with field values loaded for `user_id`.
    fn field_groups(&self, user_id: UserId) -> Vec<FieldGroup>;

    /// Site-wide photo upload switches.
    fn photo_uploads(&self) -> PhotoUploads;

    fn has_photo(&self, user_id: UserId, kind: PhotoKind) -> bool;

    /// Base URL of the user's member page, e.g. `https://example.com/members/alice/`.
    fn profile_url(&self, user_id: UserId) -> String;

    fn profile_slug(&self) -> String {
        "profile".to_string()
    }
}

/// Narrow key-value store used for cached progress.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Last writer wins.
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete every key starting with `prefix`, returning how many were removed.
    fn delete_by_prefix(&self, prefix: &str) -> Result<usize>;
}
