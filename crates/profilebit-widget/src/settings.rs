use profilebit_core::{FieldGroup, GroupId, PhotoKind, ProfileBitError, Result, Selection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix of the per-group visibility keys in host-provided settings.
pub const GROUP_SETTING_PREFIX: &str = "profile_field_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Circle,
    Linear,
}

impl Skin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Skin::Circle => "circle",
            Skin::Linear => "linear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    #[default]
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
    None,
}

impl BorderStyle {
    pub const ALL: [BorderStyle; 5] = [
        BorderStyle::Solid,
        BorderStyle::Dashed,
        BorderStyle::Dotted,
        BorderStyle::Double,
        BorderStyle::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Double => "double",
            BorderStyle::None => "none",
        }
    }
}

/// Visual parameters the host turns into CSS. Carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    pub box_width_pct: u8,
    pub box_background: String,
    pub box_border_width_px: u8,
    pub border_color: Option<String>,
    pub progress_border_width_px: u8,
    pub details_background: String,
    pub heading_color: Option<String>,
    pub completion_color: String,
    pub incomplete_color: String,
    pub ring_border_color: String,
    pub button_color: Option<String>,
    pub button_background: Option<String>,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            box_width_pct: 100,
            box_background: "#fff".to_string(),
            box_border_width_px: 1,
            border_color: None,
            progress_border_width_px: 6,
            details_background: "#fff".to_string(),
            heading_color: None,
            completion_color: "#1CD991".to_string(),
            incomplete_color: "#EF3E46".to_string(),
            ring_border_color: "#DEDFE2".to_string(),
            button_color: None,
            button_background: None,
        }
    }
}

/// Every option the widget recognises, with the defaults a fresh widget gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    pub skin: Skin,
    pub alignment: Alignment,
    /// Groups without an entry are shown.
    pub group_visibility: BTreeMap<GroupId, bool>,
    pub show_profile_photo: bool,
    pub show_cover_photo: bool,
    /// Render an empty placeholder once progress reaches 100%.
    pub hide_when_complete: bool,
    /// Circle skin only.
    pub show_profile_button: bool,
    /// Linear skin only.
    pub heading_text: String,
    pub completion_text: String,
    pub completion_button_text: String,
    pub edit_button_text: String,
    /// Circle skin only.
    pub show_heading: bool,
    pub show_completion_icon: bool,
    pub show_completion_status: bool,
    pub box_border_style: BorderStyle,
    pub style: StyleSettings,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            skin: Skin::Circle,
            alignment: Alignment::Right,
            group_visibility: BTreeMap::new(),
            show_profile_photo: true,
            show_cover_photo: true,
            hide_when_complete: false,
            show_profile_button: true,
            heading_text: "Complete your profile".to_string(),
            completion_text: "Complete".to_string(),
            completion_button_text: "Complete Profile".to_string(),
            edit_button_text: "Edit Profile".to_string(),
            show_heading: true,
            show_completion_icon: true,
            show_completion_status: true,
            box_border_style: BorderStyle::Solid,
            style: StyleSettings::default(),
        }
    }
}

impl WidgetSettings {
    pub fn is_group_visible(&self, group_id: GroupId) -> bool {
        self.group_visibility.get(&group_id).copied().unwrap_or(true)
    }

    pub fn set_group_visible(&mut self, group_id: GroupId, visible: bool) {
        self.group_visibility.insert(group_id, visible);
    }

    pub fn is_photo_visible(&self, kind: PhotoKind) -> bool {
        match kind {
            PhotoKind::ProfilePhoto => self.show_profile_photo,
            PhotoKind::CoverPhoto => self.show_cover_photo,
        }
    }

    /// Groups and photo kinds switched on, given the groups that exist.
    pub fn selection(&self, groups: &[FieldGroup]) -> Selection {
        let group_ids = groups
            .iter()
            .map(|g| g.id)
            .filter(|id| self.is_group_visible(*id))
            .collect();
        let photo_kinds = PhotoKind::ALL
            .into_iter()
            .filter(|kind| self.is_photo_visible(*kind))
            .collect();
        Selection::new(group_ids, photo_kinds)
    }

    pub fn button_enabled(&self) -> bool {
        self.skin == Skin::Circle && self.show_profile_button
    }

    pub fn details_heading_enabled(&self) -> bool {
        self.skin == Skin::Circle && self.show_heading
    }

    /// Heading above the linear bar; the circle skin leaves it blank.
    pub fn linear_heading(&self) -> Option<&str> {
        (self.skin == Skin::Linear).then_some(self.heading_text.as_str())
    }

    /// Build typed settings from the flat key/value map a page builder stores.
    ///
    /// Switchers are `"yes"` when on and `""` when off. Unknown keys are
    /// ignored and missing keys keep their defaults.
    pub fn from_host_values(values: &BTreeMap<String, Value>) -> Result<Self> {
        let mut settings = Self::default();

        for (key, value) in values {
            if let Some(id) = key.strip_prefix(GROUP_SETTING_PREFIX) {
                let group_id: GroupId = id.parse().map_err(|_| {
                    ProfileBitError::Config(format!("Invalid group setting key: {}", key))
                })?;
                settings.set_group_visible(group_id, switch_value(value));
                continue;
            }

            match key.as_str() {
                "skin_style" => settings.skin = enum_value(key, value)?,
                "alignment" => settings.alignment = enum_value(key, value)?,
                "box_border_style" => settings.box_border_style = enum_value(key, value)?,
                "profile_photo" => settings.show_profile_photo = switch_value(value),
                "cover_photo" => settings.show_cover_photo = switch_value(value),
                "switch_hide_widget" => settings.hide_when_complete = switch_value(value),
                "switch_profile_btn" => settings.show_profile_button = switch_value(value),
                "switch_heading" => settings.show_heading = switch_value(value),
                "switch_completion_icon" => settings.show_completion_icon = switch_value(value),
                "switch_completion_status" => {
                    settings.show_completion_status = switch_value(value)
                }
                "heading_text" => settings.heading_text = text_value(value),
                "completion_text" => settings.completion_text = text_value(value),
                "completion_button_text" => settings.completion_button_text = text_value(value),
                "edit_button_text" => settings.edit_button_text = text_value(value),
                _ => {}
            }
        }

        Ok(settings)
    }
}

fn switch_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "yes",
        _ => false,
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn enum_value<T: serde::de::DeserializeOwned>(key: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| ProfileBitError::Config(format!("Invalid value for {}: {}", key, e)))
}
