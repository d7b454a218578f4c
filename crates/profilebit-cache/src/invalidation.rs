use crate::progress_cache::ProgressCache;
use profilebit_core::{FieldId, GroupId, PhotoKind, Result, UserId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which cached entries an event makes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidationScope {
    /// Only the given user's progress depends on the change
    User(UserId),
    /// Structural change affecting every user's progress
    All,
}

/// Domain events that change profile completion state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationEvent {
    AvatarUploaded { user_id: UserId },
    AvatarDeleted { user_id: UserId },
    CoverImageUploaded { user_id: UserId },
    CoverImageDeleted { user_id: UserId },
    /// A user saved their profile from the front end
    ProfileUpdated { user_id: UserId },
    /// Field added or edited by an administrator
    FieldSaved { field_id: FieldId },
    FieldDeleted { field_id: FieldId },
    GroupDeleted { group_id: GroupId },
    /// Site-level photo upload switch toggled
    PhotoUploadSettingChanged { kind: PhotoKind },
    FieldsReordered,
}

impl InvalidationEvent {
    /// Personal photo changes touch one user; everything else may change
    /// which fields count, or how, for every user.
    pub fn scope(&self) -> InvalidationScope {
        match self {
            InvalidationEvent::AvatarUploaded { user_id }
            | InvalidationEvent::AvatarDeleted { user_id }
            | InvalidationEvent::CoverImageUploaded { user_id }
            | InvalidationEvent::CoverImageDeleted { user_id } => InvalidationScope::User(*user_id),
            InvalidationEvent::ProfileUpdated { .. }
            | InvalidationEvent::FieldSaved { .. }
            | InvalidationEvent::FieldDeleted { .. }
            | InvalidationEvent::GroupDeleted { .. }
            | InvalidationEvent::PhotoUploadSettingChanged { .. }
            | InvalidationEvent::FieldsReordered => InvalidationScope::All,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InvalidationEvent::AvatarUploaded { .. } => "avatar-uploaded",
            InvalidationEvent::AvatarDeleted { .. } => "avatar-deleted",
            InvalidationEvent::CoverImageUploaded { .. } => "cover-image-uploaded",
            InvalidationEvent::CoverImageDeleted { .. } => "cover-image-deleted",
            InvalidationEvent::ProfileUpdated { .. } => "profile-updated",
            InvalidationEvent::FieldSaved { .. } => "field-saved",
            InvalidationEvent::FieldDeleted { .. } => "field-deleted",
            InvalidationEvent::GroupDeleted { .. } => "group-deleted",
            InvalidationEvent::PhotoUploadSettingChanged { .. } => "photo-upload-setting-changed",
            InvalidationEvent::FieldsReordered => "fields-reordered",
        }
    }
}

impl fmt::Display for InvalidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationEvent::AvatarUploaded { user_id }
            | InvalidationEvent::AvatarDeleted { user_id }
            | InvalidationEvent::CoverImageUploaded { user_id }
            | InvalidationEvent::CoverImageDeleted { user_id }
            | InvalidationEvent::ProfileUpdated { user_id } => {
                write!(f, "{} (user {})", self.name(), user_id)
            }
            InvalidationEvent::FieldSaved { field_id }
            | InvalidationEvent::FieldDeleted { field_id } => {
                write!(f, "{} (field {})", self.name(), field_id)
            }
            InvalidationEvent::GroupDeleted { group_id } => {
                write!(f, "{} (group {})", self.name(), group_id)
            }
            InvalidationEvent::PhotoUploadSettingChanged { kind } => {
                write!(f, "{} ({})", self.name(), kind)
            }
            InvalidationEvent::FieldsReordered => f.write_str(self.name()),
        }
    }
}

/// Trait for handling invalidation events
pub trait InvalidationListener: Send + Sync {
    fn on_invalidation(&self, event: &InvalidationEvent) -> Result<()>;
}

/// Explicit publish/subscribe point for profile mutations.
///
/// Mutation code paths hold a bus and publish events; listeners are injected
/// at construction time. A failing listener is logged and does not stop the
/// remaining listeners or the publisher.
#[derive(Default)]
pub struct InvalidationBus {
    listeners: Vec<Box<dyn InvalidationListener>>,
    published: AtomicU64,
    failures: AtomicU64,
}

impl InvalidationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus wired to drop stale entries from `cache` and log every event.
    pub fn for_cache(cache: Arc<ProgressCache>) -> Self {
        let mut bus = Self::new();
        bus.add_listener(Box::new(LoggingInvalidationListener));
        bus.add_listener(Box::new(CacheInvalidationListener::new(cache)));
        bus
    }

    pub fn add_listener(&mut self, listener: Box<dyn InvalidationListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn publish(&self, event: InvalidationEvent) {
        self.published.fetch_add(1, Ordering::Relaxed);
        for listener in &self.listeners {
            if let Err(e) = listener.on_invalidation(&event) {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Invalidation listener failed for {}: {:?}", event, e);
            }
        }
    }

    pub fn stats(&self) -> InvalidationStats {
        InvalidationStats {
            published: self.published.load(Ordering::Relaxed),
            listener_failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Statistics about published events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationStats {
    pub published: u64,
    pub listener_failures: u64,
}

/// Simple logging invalidation listener
pub struct LoggingInvalidationListener;

impl InvalidationListener for LoggingInvalidationListener {
    fn on_invalidation(&self, event: &InvalidationEvent) -> Result<()> {
        match event.scope() {
            InvalidationScope::User(user_id) => {
                debug!("Cache invalidation: {} for user {}", event, user_id)
            }
            InvalidationScope::All => info!("Cache invalidation: {} for all users", event),
        }
        Ok(())
    }
}

/// Cache-aware listener that removes the entries an event makes stale
pub struct CacheInvalidationListener {
    cache: Arc<ProgressCache>,
}

impl CacheInvalidationListener {
    pub fn new(cache: Arc<ProgressCache>) -> Self {
        Self { cache }
    }
}

impl InvalidationListener for CacheInvalidationListener {
    fn on_invalidation(&self, event: &InvalidationEvent) -> Result<()> {
        self.cache.invalidate(event.scope()).map(|_| ())
    }
}
