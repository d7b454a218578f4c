use crate::{
    Field, FieldGroup, FieldId, FieldValue, GroupId, PhotoKind, PhotoUploads, ProfileBitError,
    ProfileDataSource, Result, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Field definition without any user data attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub clone_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub is_repeater_enabled: bool,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub has_avatar: bool,
    #[serde(default)]
    pub has_cover_image: bool,
    #[serde(default)]
    pub values: BTreeMap<FieldId, FieldValue>,
}

/// In-memory profile data, loadable from a JSON fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticProfileSource {
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_profile_slug")]
    pub profile_slug: String,
    #[serde(default)]
    pub photo_uploads: PhotoUploads,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_profile_slug() -> String {
    "profile".to_string()
}

impl Default for StaticProfileSource {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            profile_slug: default_profile_slug(),
            photo_uploads: PhotoUploads::default(),
            groups: Vec::new(),
            users: Vec::new(),
        }
    }
}

impl StaticProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProfileBitError::Fixture(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let source: Self = serde_json::from_str(content)
            .map_err(|e| ProfileBitError::Fixture(format!("Invalid fixture: {}", e)))?;
        source.validate()?;
        Ok(source)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.id) {
                return Err(ProfileBitError::Fixture(format!(
                    "Duplicate group id: {}",
                    group.id
                )));
            }
        }
        Ok(())
    }

    pub fn with_group(mut self, group: GroupDefinition) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_photo_uploads(mut self, photo_uploads: PhotoUploads) -> Self {
        self.photo_uploads = photo_uploads;
        self
    }

    pub fn user(&self, user_id: UserId) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn user_mut(&mut self, user_id: UserId) -> Option<&mut UserProfile> {
        self.users.iter_mut().find(|u| u.id == user_id)
    }

    /// Set a field value, creating the user record on first write.
    pub fn set_value(&mut self, user_id: UserId, field_id: FieldId, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.user_mut(user_id) {
            Some(user) => {
                user.values.insert(field_id, value);
            }
            None => {
                let mut user = UserProfile {
                    id: user_id,
                    ..Default::default()
                };
                user.values.insert(field_id, value);
                self.users.push(user);
            }
        }
    }
}

impl ProfileDataSource for StaticProfileSource {
    fn field_groups(&self, user_id: UserId) -> Vec<FieldGroup> {
        let user = self.user(user_id);
        self.groups
            .iter()
            .map(|group| FieldGroup {
                id: group.id,
                name: group.name.clone(),
                is_repeater_enabled: group.is_repeater_enabled,
                fields: group
                    .fields
                    .iter()
                    .map(|field| Field {
                        id: field.id,
                        group_id: group.id,
                        name: field.name.clone(),
                        value: user.and_then(|u| u.values.get(&field.id).cloned()),
                        clone_number: field.clone_number,
                    })
                    .collect(),
            })
            .collect()
    }

    fn photo_uploads(&self) -> PhotoUploads {
        self.photo_uploads
    }

    fn has_photo(&self, user_id: UserId, kind: PhotoKind) -> bool {
        self.user(user_id).is_some_and(|u| match kind {
            PhotoKind::ProfilePhoto => u.has_avatar,
            PhotoKind::CoverPhoto => u.has_cover_image,
        })
    }

    fn profile_url(&self, user_id: UserId) -> String {
        let member = self
            .user(user_id)
            .and_then(|u| u.username.clone())
            .unwrap_or_else(|| user_id.to_string());
        format!("{}/members/{}/", self.site_url.trim_end_matches('/'), member)
    }

    fn profile_slug(&self) -> String {
        self.profile_slug.clone()
    }
}
