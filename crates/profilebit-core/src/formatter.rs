use crate::{
    FormattedProgress, GroupId, PhotoKind, ProfileDataSource, ProgressSnapshot, Section,
    SectionKind, UserId,
};
use tracing::warn;

/// Where a user's profile pages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLinks {
    pub base_url: String,
    pub profile_slug: String,
}

impl ProfileLinks {
    pub fn new(base_url: impl Into<String>, profile_slug: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            profile_slug: profile_slug.into(),
        }
    }

    pub fn for_user(source: &dyn ProfileDataSource, user_id: UserId) -> Self {
        Self::new(source.profile_url(user_id), source.profile_slug())
    }

    fn page(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.profile_slug.trim_matches('/'),
            path.trim_matches('/')
        )
    }

    pub fn edit_group(&self, group_id: GroupId) -> String {
        self.page(&format!("edit/group/{}", group_id))
    }

    pub fn photo(&self, kind: PhotoKind) -> String {
        self.page(kind.link_suffix())
    }

    pub fn edit_profile(&self) -> String {
        self.page("edit")
    }
}

/// `round(completed * 100 / total)`, rounding halves up; 0 when there is nothing to count.
pub fn completion_percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let total = u64::from(total);
    ((completed * 200 + total) / (total * 2)) as u8
}

/// Turn raw counts into numbered, linked sections: groups first, then profile
/// photo, then cover photo.
pub fn format_progress(snapshot: &ProgressSnapshot, links: &ProfileLinks) -> FormattedProgress {
    if snapshot.total_fields == 0 {
        warn!("Selection has no countable fields, reporting 0% completion");
    }
    let percentage = completion_percentage(snapshot.completed_fields, snapshot.total_fields);

    let mut sections = Vec::with_capacity(snapshot.groups.len() + snapshot.photos.len());
    for group in &snapshot.groups {
        sections.push(Section {
            number: sections.len() as u32 + 1,
            label: group.name.clone(),
            link: links.edit_group(group.group_id),
            is_complete: group.total == group.completed,
            completed: group.completed,
            total: group.total,
            kind: SectionKind::Group(group.group_id),
        });
    }

    for kind in PhotoKind::ALL {
        let Some(photo) = snapshot.photo(kind) else {
            continue;
        };
        sections.push(Section {
            number: sections.len() as u32 + 1,
            label: kind.label().to_string(),
            link: links.photo(kind),
            is_complete: photo.uploaded,
            completed: u32::from(photo.uploaded),
            total: 1,
            kind: SectionKind::Photo(kind),
        });
    }

    FormattedProgress {
        percentage,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GroupProgress, PhotoProgress};

    fn links() -> ProfileLinks {
        ProfileLinks::new("https://example.com/members/alice/", "profile")
    }

    fn group(id: u64, name: &str, total: u32, completed: u32) -> GroupProgress {
        GroupProgress {
            group_id: id,
            name: name.to_string(),
            total,
            completed,
        }
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(completion_percentage(3, 4), 75);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(0, 5), 0);
        assert_eq!(completion_percentage(5, 5), 100);
    }

    #[test]
    fn test_percentage_bounds_for_all_small_totals() {
        for total in 1..=60u32 {
            for completed in 0..=total {
                let pct = completion_percentage(completed, total);
                let expected = (completed as f64 * 100.0 / total as f64).round() as u8;
                assert!(pct <= 100);
                assert_eq!(pct, expected, "{}/{}", completed, total);
            }
        }
    }

    #[test]
    fn test_zero_total_reports_zero_percent() {
        let formatted = format_progress(&ProgressSnapshot::default(), &links());
        assert_eq!(formatted.percentage, 0);
        assert!(formatted.sections.is_empty());
    }

    #[test]
    fn test_section_order_and_numbering() {
        let snapshot = ProgressSnapshot {
            total_fields: 4,
            completed_fields: 2,
            groups: vec![group(2, "G2", 1, 1), group(1, "G1", 1, 0)],
            photos: vec![
                PhotoProgress {
                    kind: PhotoKind::CoverPhoto,
                    uploaded: false,
                },
                PhotoProgress {
                    kind: PhotoKind::ProfilePhoto,
                    uploaded: true,
                },
            ],
        };

        let formatted = format_progress(&snapshot, &links());
        let kinds: Vec<_> = formatted.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Group(2),
                SectionKind::Group(1),
                SectionKind::Photo(PhotoKind::ProfilePhoto),
                SectionKind::Photo(PhotoKind::CoverPhoto),
            ]
        );
        let numbers: Vec<_> = formatted.sections.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(formatted.percentage, 50);
    }

    #[test]
    fn test_section_links() {
        let snapshot = ProgressSnapshot {
            total_fields: 3,
            completed_fields: 1,
            groups: vec![group(4, "Work", 1, 0)],
            photos: vec![
                PhotoProgress {
                    kind: PhotoKind::ProfilePhoto,
                    uploaded: true,
                },
                PhotoProgress {
                    kind: PhotoKind::CoverPhoto,
                    uploaded: false,
                },
            ],
        };

        let formatted = format_progress(&snapshot, &links());
        assert_eq!(
            formatted.sections[0].link,
            "https://example.com/members/alice/profile/edit/group/4/"
        );
        assert_eq!(
            formatted.sections[1].link,
            "https://example.com/members/alice/profile/change-avatar/"
        );
        assert_eq!(
            formatted.sections[2].link,
            "https://example.com/members/alice/profile/change-cover-image/"
        );
        assert!(formatted.sections[1].is_complete);
        assert_eq!((formatted.sections[2].completed, formatted.sections[2].total), (0, 1));
        assert_eq!(
            links().edit_profile(),
            "https://example.com/members/alice/profile/edit/"
        );
    }
}
