//! Declarative description of the widget's configuration form.
//!
//! A host form engine renders these sections; the values it stores come back
//! through [`WidgetSettings::from_host_values`](crate::WidgetSettings::from_host_values).

use crate::settings::{BorderStyle, StyleSettings, WidgetSettings, GROUP_SETTING_PREFIX};
use profilebit_core::{FieldGroup, PhotoUploads};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTab {
    Content,
    Style,
}

/// Show a control only when another control holds one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub control: String,
    pub values: Vec<String>,
}

impl Condition {
    pub fn equals(control: &str, value: &str) -> Self {
        Self {
            control: control.to_string(),
            values: vec![value.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    Select { options: Vec<(String, String)> },
    Choose { options: Vec<(String, String)> },
    Switcher { label_on: String, label_off: String },
    Text { placeholder: String },
    Slider { min: u32, max: u32, step: u32, unit: String },
    Color,
}

impl ControlKind {
    fn show_hide() -> Self {
        ControlKind::Switcher {
            label_on: "Show".to_string(),
            label_off: "Hide".to_string(),
        }
    }

    fn yes_no() -> Self {
        ControlKind::Switcher {
            label_on: "Yes".to_string(),
            label_off: "No".to_string(),
        }
    }

    fn text(placeholder: &str) -> Self {
        ControlKind::Text {
            placeholder: placeholder.to_string(),
        }
    }

    fn slider(min: u32, max: u32, unit: &str) -> Self {
        ControlKind::Slider {
            min,
            max,
            step: 1,
            unit: unit.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ControlKind,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Control {
    fn new(id: impl Into<String>, label: impl Into<String>, kind: ControlKind, default: Value) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            default,
            description: None,
            conditions: Vec::new(),
        }
    }

    fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSection {
    pub id: String,
    pub label: String,
    pub tab: ControlTab,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    pub controls: Vec<Control>,
}

impl ControlSection {
    pub fn control(&self, id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }
}

fn switch_default(on: bool) -> Value {
    json!(if on { "yes" } else { "" })
}

fn options<T: Copy>(items: &[T], key: impl Fn(T) -> &'static str) -> Vec<(String, String)> {
    items
        .iter()
        .map(|item| {
            let key = key(*item);
            let mut label = key.to_string();
            if let Some(first) = label.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            (key.to_string(), label)
        })
        .collect()
}

/// The form for a site with `groups` and the given photo upload switches.
///
/// One visibility switch is emitted per profile group, and one per photo
/// kind that is enabled at site level.
pub fn build_controls(groups: &[FieldGroup], uploads: PhotoUploads) -> Vec<ControlSection> {
    let defaults = WidgetSettings::default();
    let style = StyleSettings::default();
    let circle = || Condition::equals("skin_style", "circle");
    let linear = || Condition::equals("skin_style", "linear");

    let mut layout = vec![
        Control::new(
            "skin_style",
            "Skin",
            ControlKind::Select {
                options: vec![
                    ("circle".to_string(), "Circle".to_string()),
                    ("linear".to_string(), "Linear".to_string()),
                ],
            },
            json!(defaults.skin.as_str()),
        ),
        Control::new(
            "alignment",
            "Alignment",
            ControlKind::Choose {
                options: vec![
                    ("left".to_string(), "Left".to_string()),
                    ("center".to_string(), "Center".to_string()),
                    ("right".to_string(), "Right".to_string()),
                ],
            },
            json!(defaults.alignment.as_str()),
        ),
    ];

    for group in groups {
        layout.push(Control::new(
            format!("{}{}", GROUP_SETTING_PREFIX, group.id),
            group.name.clone(),
            ControlKind::show_hide(),
            switch_default(true),
        ));
    }

    for kind in uploads.enabled_kinds() {
        layout.push(Control::new(
            kind.as_str(),
            kind.label(),
            ControlKind::show_hide(),
            switch_default(defaults.is_photo_visible(kind)),
        ));
    }

    layout.extend([
        Control::new(
            "switch_hide_widget",
            "Hide Widget",
            ControlKind::yes_no(),
            switch_default(defaults.hide_when_complete),
        )
        .described("Hide widget once progress hits 100%"),
        Control::new(
            "switch_profile_btn",
            "Profile Complete Button",
            ControlKind::yes_no(),
            switch_default(defaults.show_profile_button),
        )
        .when(circle()),
        Control::new(
            "heading_text",
            "Heading Text",
            ControlKind::text("Enter heading text"),
            json!(defaults.heading_text),
        )
        .when(linear()),
        Control::new(
            "completion_text",
            "Completion Text",
            ControlKind::text("Enter completion text"),
            json!(defaults.completion_text),
        ),
        Control::new(
            "completion_button_text",
            "Complete Profile Button Text",
            ControlKind::text("Enter button text"),
            json!(defaults.completion_button_text),
        )
        .described("Button text if progress is less than 100%")
        .when(circle())
        .when(Condition::equals("switch_profile_btn", "yes")),
        Control::new(
            "edit_button_text",
            "Edit Profile Button Text",
            ControlKind::text("Enter button text"),
            json!(defaults.edit_button_text),
        )
        .described("Button text once progress hits 100%")
        .when(circle())
        .when(Condition::equals("switch_profile_btn", "yes")),
    ]);

    vec![
        ControlSection {
            id: "section_content_layout".to_string(),
            label: "Layout".to_string(),
            tab: ControlTab::Content,
            conditions: Vec::new(),
            controls: layout,
        },
        ControlSection {
            id: "section_style_box".to_string(),
            label: "Box".to_string(),
            tab: ControlTab::Style,
            conditions: vec![linear()],
            controls: vec![
                Control::new(
                    "box_width",
                    "Width",
                    ControlKind::slider(20, 100, "%"),
                    json!(style.box_width_pct),
                ),
                Control::new(
                    "box_bgr_color",
                    "Background Color",
                    ControlKind::Color,
                    json!(style.box_background),
                ),
                Control::new(
                    "box_border_style",
                    "Border Type",
                    ControlKind::Select {
                        options: options(&BorderStyle::ALL, |b| b.as_str()),
                    },
                    json!(defaults.box_border_style.as_str()),
                ),
                Control::new(
                    "box_border_width",
                    "Border Width",
                    ControlKind::slider(1, 10, "px"),
                    json!(style.box_border_width_px),
                ),
            ],
        },
        ControlSection {
            id: "section_style_colors".to_string(),
            label: "Colors".to_string(),
            tab: ControlTab::Style,
            conditions: Vec::new(),
            controls: vec![
                Control::new(
                    "details_color",
                    "Details Completion Background Color",
                    ControlKind::Color,
                    json!(style.details_background),
                ),
                Control::new(
                    "completion_color",
                    "Completion Color",
                    ControlKind::Color,
                    json!(style.completion_color),
                ),
                Control::new(
                    "incomplete_color",
                    "Incomplete Color",
                    ControlKind::Color,
                    json!(style.incomplete_color),
                ),
                Control::new(
                    "ring_border_color",
                    "Progress Border Color",
                    ControlKind::Color,
                    json!(style.ring_border_color),
                ),
            ],
        },
        ControlSection {
            id: "section_style_details".to_string(),
            label: "Details Dropdown".to_string(),
            tab: ControlTab::Style,
            conditions: Vec::new(),
            controls: vec![
                Control::new(
                    "switch_heading",
                    "Show Header",
                    ControlKind::yes_no(),
                    switch_default(defaults.show_heading),
                )
                .when(circle()),
                Control::new(
                    "switch_completion_icon",
                    "Show Completion Icon",
                    ControlKind::yes_no(),
                    switch_default(defaults.show_completion_icon),
                ),
                Control::new(
                    "switch_completion_status",
                    "Show Completion Status",
                    ControlKind::yes_no(),
                    switch_default(defaults.show_completion_status),
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn groups() -> Vec<FieldGroup> {
        vec![
            FieldGroup {
                id: 1,
                name: "Base".to_string(),
                fields: vec![],
                is_repeater_enabled: false,
            },
            FieldGroup {
                id: 5,
                name: "Work".to_string(),
                fields: vec![],
                is_repeater_enabled: true,
            },
        ]
    }

    #[test]
    fn test_one_switch_per_group_and_enabled_photo() {
        let sections = build_controls(
            &groups(),
            PhotoUploads {
                avatar_enabled: true,
                cover_enabled: false,
            },
        );
        let layout = &sections[0];

        assert_eq!(layout.control("profile_field_1").unwrap().label, "Base");
        assert_eq!(layout.control("profile_field_5").unwrap().label, "Work");
        assert!(layout.control("profile_photo").is_some());
        assert!(layout.control("cover_photo").is_none());
    }

    #[test]
    fn test_button_texts_depend_on_circle_skin_and_button_switch() {
        let sections = build_controls(&groups(), PhotoUploads::default());
        let control = sections[0].control("edit_button_text").unwrap();
        assert_eq!(
            control.conditions,
            vec![
                Condition::equals("skin_style", "circle"),
                Condition::equals("switch_profile_btn", "yes"),
            ]
        );
    }

    #[test]
    fn test_defaults_round_trip_into_settings() {
        let sections = build_controls(&groups(), PhotoUploads::default());
        let values: BTreeMap<String, Value> = sections
            .iter()
            .flat_map(|s| s.controls.iter())
            .map(|c| (c.id.clone(), c.default.clone()))
            .collect();

        let settings = WidgetSettings::from_host_values(&values).unwrap();
        let defaults = WidgetSettings {
            group_visibility: [(1, true), (5, true)].into_iter().collect(),
            ..WidgetSettings::default()
        };
        assert_eq!(settings, defaults);
    }

    #[test]
    fn test_schema_serializes_with_flattened_kind() {
        let sections = build_controls(&[], PhotoUploads::default());
        let json = serde_json::to_value(&sections).unwrap();
        let skin = &json[0]["controls"][0];
        assert_eq!(skin["id"], "skin_style");
        assert_eq!(skin["type"], "select");
        assert_eq!(skin["default"], "circle");
        assert_eq!(json[1]["tab"], "style");
        assert_eq!(json[1]["controls"][2]["options"][4][0], "none");
    }
}
