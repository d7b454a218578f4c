use crate::controls::{build_controls, ControlSection};
use crate::render::render_markup;
use crate::settings::WidgetSettings;
use profilebit_cache::ProgressCache;
use profilebit_core::{
    CacheConfig, FormattedProgress, ProfileDataSource, ProfileLinks, Result, UserId,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// The "Profile Completion" page-builder widget.
///
/// Holds one widget instance's settings and a handle to the shared progress
/// cache. Rendering is synchronous and safe to call from many threads.
pub struct ProfileCompletionWidget {
    cache: Arc<ProgressCache>,
    settings: WidgetSettings,
    always_invalidate_on_render: bool,
}

impl ProfileCompletionWidget {
    pub const NAME: &'static str = "bbp-profile-completion";
    pub const TITLE: &'static str = "Profile Completion";
    pub const ICON: &'static str = "eicon-check-circle";
    pub const CATEGORY: &'static str = "buddyboss-elements";

    pub fn new(cache: Arc<ProgressCache>, settings: WidgetSettings) -> Self {
        Self {
            cache,
            settings,
            always_invalidate_on_render: true,
        }
    }

    pub fn from_config(
        cache: Arc<ProgressCache>,
        settings: WidgetSettings,
        config: &CacheConfig,
    ) -> Self {
        Self::new(cache, settings).with_always_invalidate_on_render(config.always_invalidate_on_render)
    }

    /// When set, the viewer's cached entry is dropped before every render so
    /// the widget never shows stale numbers.
    pub fn with_always_invalidate_on_render(mut self, enabled: bool) -> Self {
        self.always_invalidate_on_render = enabled;
        self
    }

    pub fn always_invalidates_on_render(&self) -> bool {
        self.always_invalidate_on_render
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<ProgressCache> {
        &self.cache
    }

    /// Configuration form for the groups `source` knows about.
    pub fn controls(&self, source: &dyn ProfileDataSource) -> Vec<ControlSection> {
        // Groups are site-wide; the form is built outside any user context.
        build_controls(&source.field_groups(0), source.photo_uploads())
    }

    /// Formatted progress for `viewer` under this widget's selection.
    pub fn progress(
        &self,
        source: &dyn ProfileDataSource,
        viewer: Option<UserId>,
    ) -> Option<FormattedProgress> {
        let user_id = viewer?;
        let selection = self.settings.selection(&source.field_groups(user_id));
        self.cache
            .get_formatted_progress(source, &selection, Some(user_id))
    }

    /// HTML for `viewer`. Empty when there is no viewer or nothing selected.
    #[instrument(skip(self, source), fields(widget = Self::NAME))]
    pub fn render(&self, source: &dyn ProfileDataSource, viewer: Option<UserId>) -> Result<String> {
        let Some(user_id) = viewer else {
            debug!("No viewer, rendering nothing");
            return Ok(String::new());
        };

        if self.always_invalidate_on_render {
            if let Err(e) = self.cache.invalidate_for_user(user_id) {
                warn!(user_id, "Failed to drop cached progress before render: {}", e);
            }
        }

        let Some(progress) = self.progress(source, Some(user_id)) else {
            debug!(user_id, "Nothing selected, rendering nothing");
            return Ok(String::new());
        };

        render_markup(
            &self.settings,
            &progress,
            &ProfileLinks::for_user(source, user_id),
        )
    }
}
