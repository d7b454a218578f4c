use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = u64;
pub type GroupId = u64;
pub type FieldId = u64;

/// Photo assets that count toward profile completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    ProfilePhoto,
    CoverPhoto,
}

impl PhotoKind {
    /// Evaluation and display order: profile photo first, cover photo second.
    pub const ALL: [PhotoKind; 2] = [PhotoKind::ProfilePhoto, PhotoKind::CoverPhoto];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::ProfilePhoto => "profile_photo",
            PhotoKind::CoverPhoto => "cover_photo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhotoKind::ProfilePhoto => "Profile Photo",
            PhotoKind::CoverPhoto => "Cover Photo",
        }
    }

    /// Path segment under the profile slug where the asset is managed.
    pub fn link_suffix(&self) -> &'static str {
        match self {
            PhotoKind::ProfilePhoto => "change-avatar",
            PhotoKind::CoverPhoto => "change-cover-image",
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "profile_photo" | "avatar" => Ok(PhotoKind::ProfilePhoto),
            "cover_photo" | "cover" => Ok(PhotoKind::CoverPhoto),
            other => Err(format!("Unknown photo kind: {}", other)),
        }
    }
}

/// Stored value of a profile field.
///
/// Text values may hold a serialized scalar or list as written by the profile
/// backend; [`FieldValue::is_empty`] decodes that form before deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(raw) => match SerializedValue::decode(raw) {
                Some(decoded) => decoded.is_empty(),
                None => is_empty_text(raw),
            },
            FieldValue::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

fn is_empty_text(text: &str) -> bool {
    text.is_empty() || text == "0"
}

/// Scalar or array written in the profile backend's serialized form.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SerializedValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
    /// Only the element count matters for emptiness.
    Array(usize),
}

impl<'a> SerializedValue<'a> {
    /// Decode `raw` when it is well formed; plain text yields `None`.
    fn decode(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        if raw == "N;" {
            return Some(SerializedValue::Null);
        }

        let (tag, rest) = raw.split_once(':')?;
        match tag {
            "b" => match rest.strip_suffix(';')? {
                "0" => Some(SerializedValue::Bool(false)),
                "1" => Some(SerializedValue::Bool(true)),
                _ => None,
            },
            "i" => rest.strip_suffix(';')?.parse().ok().map(SerializedValue::Int),
            "d" => rest.strip_suffix(';')?.parse().ok().map(SerializedValue::Float),
            "s" => {
                let (len, body) = rest.split_once(':')?;
                let len: usize = len.parse().ok()?;
                let text = body.strip_prefix('"')?.strip_suffix("\";")?;
                (text.len() == len).then_some(SerializedValue::Str(text))
            }
            "a" => {
                let (count, body) = rest.split_once(':')?;
                if !(body.starts_with('{') && body.ends_with('}')) {
                    return None;
                }
                count.parse().ok().map(SerializedValue::Array)
            }
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        match *self {
            SerializedValue::Null => true,
            SerializedValue::Bool(b) => !b,
            SerializedValue::Int(n) => n == 0,
            SerializedValue::Float(f) => f == 0.0,
            SerializedValue::Str(text) => is_empty_text(text),
            SerializedValue::Array(len) => len == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub group_id: GroupId,
    #[serde(default)]
    pub name: String,
    /// Value for the user the group was loaded for.
    #[serde(default)]
    pub value: Option<FieldValue>,
    /// Which repetition of a repeater group this field belongs to.
    #[serde(default)]
    pub clone_number: Option<u32>,
}

impl Field {
    pub fn is_completed(&self) -> bool {
        self.value.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Fields from the first clone (or with no clone number) count toward completion.
    pub fn is_first_clone(&self) -> bool {
        self.clone_number.map_or(true, |n| n <= 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub is_repeater_enabled: bool,
}

/// Site-level switches for photo uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUploads {
    #[serde(default = "enabled")]
    pub avatar_enabled: bool,
    #[serde(default = "enabled")]
    pub cover_enabled: bool,
}

fn enabled() -> bool {
    true
}

impl Default for PhotoUploads {
    fn default() -> Self {
        Self {
            avatar_enabled: true,
            cover_enabled: true,
        }
    }
}

impl PhotoUploads {
    pub fn is_enabled(&self, kind: PhotoKind) -> bool {
        match kind {
            PhotoKind::ProfilePhoto => self.avatar_enabled,
            PhotoKind::CoverPhoto => self.cover_enabled,
        }
    }

    pub fn enabled_kinds(&self) -> Vec<PhotoKind> {
        PhotoKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

/// What the widget was configured to count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
    #[serde(default)]
    pub photo_kinds: Vec<PhotoKind>,
}

impl Selection {
    pub fn new(group_ids: Vec<GroupId>, photo_kinds: Vec<PhotoKind>) -> Self {
        Self {
            group_ids,
            photo_kinds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group_ids.is_empty() && self.photo_kinds.is_empty()
    }

    pub fn includes_group(&self, id: GroupId) -> bool {
        self.group_ids.contains(&id)
    }

    pub fn includes_photo(&self, kind: PhotoKind) -> bool {
        self.photo_kinds.contains(&kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProgress {
    pub group_id: GroupId,
    pub name: String,
    pub total: u32,
    pub completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoProgress {
    pub kind: PhotoKind,
    pub uploaded: bool,
}

/// Raw completion counts for one user and one selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total_fields: u32,
    pub completed_fields: u32,
    /// Selected groups in data-source order.
    pub groups: Vec<GroupProgress>,
    /// Selected, site-enabled photo kinds in [`PhotoKind::ALL`] order.
    pub photos: Vec<PhotoProgress>,
}

impl ProgressSnapshot {
    pub fn photo(&self, kind: PhotoKind) -> Option<&PhotoProgress> {
        self.photos.iter().find(|p| p.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum SectionKind {
    Group(GroupId),
    Photo(PhotoKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub number: u32,
    pub label: String,
    pub link: String,
    pub is_complete: bool,
    pub completed: u32,
    pub total: u32,
    pub kind: SectionKind,
}

impl Section {
    /// Has countable items but none of them are done yet.
    pub fn is_not_started(&self) -> bool {
        self.completed == 0 && self.total > 0
    }
}

/// Presentation-ready progress, the value stored in the result cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedProgress {
    pub percentage: u8,
    pub sections: Vec<Section>,
}

impl FormattedProgress {
    pub fn is_complete(&self) -> bool {
        self.percentage == 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_kind_round_trips_through_str() {
        for kind in PhotoKind::ALL {
            assert_eq!(kind.as_str().parse::<PhotoKind>().unwrap(), kind);
        }
        assert_eq!("avatar".parse::<PhotoKind>().unwrap(), PhotoKind::ProfilePhoto);
        assert!("banner".parse::<PhotoKind>().is_err());
    }

    #[test]
    fn test_field_value_emptiness() {
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::from("0").is_empty());
        assert!(FieldValue::from("a:0:{}").is_empty());
        assert!(FieldValue::List(vec![]).is_empty());

        assert!(!FieldValue::from("Alice").is_empty());
        assert!(!FieldValue::from("a:1:{i:0;s:3:\"Foo\";}").is_empty());
        assert!(!FieldValue::List(vec!["Rust".to_string()]).is_empty());
    }

    #[test]
    fn test_serialized_scalars_use_decoded_value() {
        for empty in ["N;", "b:0;", "i:0;", "d:0;", "d:0.0;", "s:0:\"\";", "s:1:\"0\";"] {
            assert!(FieldValue::from(empty).is_empty(), "{} should be empty", empty);
        }
        for filled in ["b:1;", "i:42;", "d:0.5;", "s:5:\"Alice\";", "s:3:\"a;b\";"] {
            assert!(!FieldValue::from(filled).is_empty(), "{} should be filled", filled);
        }

        // Malformed input is plain text.
        assert!(!FieldValue::from("s:9:\"short\";").is_empty());
        assert!(!FieldValue::from("b:2;").is_empty());
    }

    #[test]
    fn test_field_completion_and_clone_rules() {
        let mut field = Field {
            id: 1,
            group_id: 1,
            name: "Name".to_string(),
            value: None,
            clone_number: None,
        };
        assert!(!field.is_completed());
        assert!(field.is_first_clone());

        field.value = Some("Alice".into());
        field.clone_number = Some(2);
        assert!(field.is_completed());
        assert!(!field.is_first_clone());
    }

    #[test]
    fn test_selection_emptiness() {
        assert!(Selection::default().is_empty());
        assert!(!Selection::new(vec![], vec![PhotoKind::CoverPhoto]).is_empty());
    }

    #[test]
    fn test_field_value_deserializes_untagged() {
        let text: FieldValue = serde_json::from_str("\"hello\"").unwrap();
        let list: FieldValue = serde_json::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(text, FieldValue::Text("hello".to_string()));
        assert_eq!(list, FieldValue::List(vec!["a".to_string(), "b".to_string()]));
    }
}
