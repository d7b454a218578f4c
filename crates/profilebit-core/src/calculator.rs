use crate::{
    FieldGroup, GroupProgress, PhotoKind, PhotoProgress, ProfileDataSource, ProgressSnapshot,
    Selection, UserId,
};
use tracing::debug;

/// Count completed vs. total items for `viewer` across the selected groups and photos.
///
/// Returns `None` when there is nothing to render: the viewer is not logged in
/// or the selection is empty. Selected group ids that the data source does not
/// know are ignored, as are photo kinds disabled at site level.
pub fn compute_progress(
    source: &dyn ProfileDataSource,
    selection: &Selection,
    viewer: Option<UserId>,
) -> Option<ProgressSnapshot> {
    let user_id = viewer?;
    if selection.is_empty() {
        debug!(user_id, "Empty selection, skipping progress computation");
        return None;
    }

    let mut snapshot = ProgressSnapshot::default();

    let uploads = source.photo_uploads();
    for kind in PhotoKind::ALL {
        if !uploads.is_enabled(kind) || !selection.includes_photo(kind) {
            continue;
        }
        let uploaded = source.has_photo(user_id, kind);
        snapshot.total_fields += 1;
        if uploaded {
            snapshot.completed_fields += 1;
        }
        snapshot.photos.push(PhotoProgress { kind, uploaded });
    }

    for group in source.field_groups(user_id) {
        if group.fields.is_empty() || !selection.includes_group(group.id) {
            continue;
        }
        let progress = group_progress(&group);
        snapshot.total_fields += progress.total;
        snapshot.completed_fields += progress.completed;
        snapshot.groups.push(progress);
    }

    debug!(
        user_id,
        total = snapshot.total_fields,
        completed = snapshot.completed_fields,
        "Computed profile progress"
    );
    Some(snapshot)
}

fn group_progress(group: &FieldGroup) -> GroupProgress {
    let counted = group
        .fields
        .iter()
        .filter(|field| !group.is_repeater_enabled || field.is_first_clone());

    let (mut total, mut completed) = (0, 0);
    for field in counted {
        total += 1;
        if field.is_completed() {
            completed += 1;
        }
    }

    GroupProgress {
        group_id: group.id,
        name: group.name.clone(),
        total,
        completed,
    }
}
