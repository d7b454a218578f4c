use profilebit_cache::{MemoryStore, ProgressCache};
use profilebit_core::source::{FieldDefinition, GroupDefinition, UserProfile};
use profilebit_core::{PhotoKind, SectionKind, StaticProfileSource};
use profilebit_widget::{ProfileCompletionWidget, WidgetSettings, BLANK_MARKUP};
use std::sync::Arc;

fn field(id: u64, name: &str) -> FieldDefinition {
    FieldDefinition {
        id,
        name: name.to_string(),
        clone_number: None,
    }
}

fn group(id: u64, name: &str, fields: Vec<FieldDefinition>) -> GroupDefinition {
    GroupDefinition {
        id,
        name: name.to_string(),
        is_repeater_enabled: false,
        fields,
    }
}

/// Group A with two fields (one filled), group B with one filled field, and
/// an uploaded profile photo.
fn source() -> StaticProfileSource {
    let mut source = StaticProfileSource {
        site_url: "https://example.com".to_string(),
        ..Default::default()
    }
    .with_group(group(1, "A", vec![field(10, "Name"), field(11, "Bio")]))
    .with_group(group(2, "B", vec![field(20, "Company")]))
    .with_user(UserProfile {
        id: 7,
        username: Some("alice".to_string()),
        has_avatar: true,
        ..Default::default()
    });
    source.set_value(7, 10, "Alice");
    source.set_value(7, 20, "Acme");
    source
}

fn widget(settings: WidgetSettings) -> ProfileCompletionWidget {
    let cache = Arc::new(ProgressCache::new(Arc::new(MemoryStore::new()), "pc_"));
    ProfileCompletionWidget::new(cache, settings)
}

fn without_cover() -> WidgetSettings {
    WidgetSettings {
        show_cover_photo: false,
        ..Default::default()
    }
}

#[test]
fn test_two_groups_and_profile_photo() {
    let widget = widget(without_cover());
    let progress = widget.progress(&source(), Some(7)).unwrap();

    assert_eq!(progress.percentage, 75);
    assert_eq!(progress.sections.len(), 3);
    assert!(!progress.sections[0].is_complete);
    assert_eq!(
        (progress.sections[0].completed, progress.sections[0].total),
        (1, 2)
    );
    assert!(progress.sections[1].is_complete);
    assert_eq!(
        progress.sections[2].kind,
        SectionKind::Photo(PhotoKind::ProfilePhoto)
    );
    assert!(progress.sections[2].is_complete);

    let html = widget.render(&source(), Some(7)).unwrap();
    assert!(html.contains(r#"data-percentage="75""#));
    assert!(html.contains(r#"href="https://example.com/members/alice/profile/edit/group/1/""#));
    assert!(html.contains(r#"href="https://example.com/members/alice/profile/change-avatar/""#));
}

#[test]
fn test_sections_follow_source_group_order() {
    let mut source = StaticProfileSource::new()
        .with_group(group(2, "G2", vec![field(20, "Company")]))
        .with_group(group(1, "G1", vec![field(10, "Name")]));
    source.set_value(7, 10, "Alice");

    let widget = widget(WidgetSettings::default());
    let progress = widget.progress(&source, Some(7)).unwrap();
    let kinds: Vec<_> = progress.sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SectionKind::Group(2),
            SectionKind::Group(1),
            SectionKind::Photo(PhotoKind::ProfilePhoto),
            SectionKind::Photo(PhotoKind::CoverPhoto),
        ]
    );
    let numbers: Vec<_> = progress.sections.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn test_anonymous_viewer_and_empty_selection_render_nothing() {
    let source = source();
    assert_eq!(widget(WidgetSettings::default()).render(&source, None).unwrap(), "");

    let mut settings = WidgetSettings {
        show_profile_photo: false,
        show_cover_photo: false,
        ..Default::default()
    };
    settings.set_group_visible(1, false);
    settings.set_group_visible(2, false);
    assert_eq!(widget(settings).render(&source, Some(7)).unwrap(), "");
}

#[test]
fn test_complete_profile_hides_when_configured() {
    let mut source = source();
    source.set_value(7, 11, "Hello");

    let settings = WidgetSettings {
        hide_when_complete: true,
        ..without_cover()
    };
    assert_eq!(widget(settings).render(&source, Some(7)).unwrap(), BLANK_MARKUP);

    let html = widget(without_cover()).render(&source, Some(7)).unwrap();
    assert!(html.contains(">Edit Profile<i"));
}

#[test]
fn test_render_drops_stale_entry_by_default() {
    let mut source = source();
    let widget = widget(without_cover());
    assert!(widget.always_invalidates_on_render());
    assert!(widget.render(&source, Some(7)).unwrap().contains(r#"data-percentage="75""#));

    source.set_value(7, 11, "Hello");
    assert!(widget.render(&source, Some(7)).unwrap().contains(r#"data-percentage="100""#));
}

#[test]
fn test_render_serves_cached_entry_when_policy_is_off() {
    let mut source = source();
    let widget = widget(without_cover()).with_always_invalidate_on_render(false);
    assert!(widget.render(&source, Some(7)).unwrap().contains(r#"data-percentage="75""#));

    source.set_value(7, 11, "Hello");
    assert!(widget.render(&source, Some(7)).unwrap().contains(r#"data-percentage="75""#));

    widget.cache().invalidate_for_user(7).unwrap();
    assert!(widget.render(&source, Some(7)).unwrap().contains(r#"data-percentage="100""#));
}

#[test]
fn test_controls_list_every_group() {
    let widget = widget(WidgetSettings::default());
    let sections = widget.controls(&source());
    let layout = &sections[0];
    assert_eq!(layout.id, "section_content_layout");
    assert!(layout.control("profile_field_1").is_some());
    assert!(layout.control("profile_field_2").is_some());
    assert!(layout.control("cover_photo").is_some());
}
