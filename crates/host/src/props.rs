//! Typed host props
//!
//! Host nodes carry a closed set of recognized props instead of an open
//! dictionary. Every key a query family or the event resolver looks at has
//! its own field here; anything else in the renderer output is dropped on
//! load. Event handlers are the one open-ended part and live on
//! [`HostNode`](crate::types::HostNode) itself.

use serde::{Deserialize, Serialize};

/// `pointerEvents` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerEvents {
    #[default]
    Auto,
    None,
    BoxNone,
    BoxOnly,
}

/// Android `importantForAccessibility` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportantForAccessibility {
    #[default]
    Auto,
    Yes,
    No,
    NoHideDescendants,
}

/// `display` style values. Only `none` matters for accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Flex,
    None,
    #[serde(other)]
    Other,
}

/// Tri-state checked value (`true`, `false` or `"mixed"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CheckedRepr", into = "CheckedRepr")]
pub enum CheckedState {
    Checked,
    Unchecked,
    Mixed,
}

impl From<bool> for CheckedState {
    fn from(value: bool) -> Self {
        if value {
            CheckedState::Checked
        } else {
            CheckedState::Unchecked
        }
    }
}

impl std::fmt::Display for CheckedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckedState::Checked => write!(f, "true"),
            CheckedState::Unchecked => write!(f, "false"),
            CheckedState::Mixed => write!(f, "mixed"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CheckedRepr {
    Flag(bool),
    Word(String),
}

impl TryFrom<CheckedRepr> for CheckedState {
    type Error = String;

    fn try_from(repr: CheckedRepr) -> Result<Self, Self::Error> {
        match repr {
            CheckedRepr::Flag(flag) => Ok(flag.into()),
            CheckedRepr::Word(word) if word == "mixed" => Ok(CheckedState::Mixed),
            CheckedRepr::Word(word) => Err(format!("invalid checked state: {word}")),
        }
    }
}

impl From<CheckedState> for CheckedRepr {
    fn from(state: CheckedState) -> Self {
        match state {
            CheckedState::Checked => CheckedRepr::Flag(true),
            CheckedState::Unchecked => CheckedRepr::Flag(false),
            CheckedState::Mixed => CheckedRepr::Word("mixed".to_string()),
        }
    }
}

/// `accessibilityState` prop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<CheckedState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
}

/// `accessibilityValue` prop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `value` is a string on text inputs and a boolean on switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Toggle(bool),
    Text(String),
}

/// Flattened style. Only the keys the engine reads are kept.
///
/// Deserializes from a single style object or from a (possibly nested)
/// array of them; later entries win, `null` entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StyleInput")]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_events: Option<PointerEvents>,
}

impl Style {
    fn merge(&mut self, other: StyleEntry) {
        if other.display.is_some() {
            self.display = other.display;
        }
        if other.opacity.is_some() {
            self.opacity = other.opacity;
        }
        if other.pointer_events.is_some() {
            self.pointer_events = other.pointer_events;
        }
    }

    fn flatten_into(&mut self, input: StyleInput) {
        match input {
            StyleInput::List(items) => {
                for item in items.into_iter().flatten() {
                    self.flatten_into(item);
                }
            }
            StyleInput::Entry(entry) => self.merge(entry),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleEntry {
    display: Option<Display>,
    opacity: Option<f64>,
    pointer_events: Option<PointerEvents>,
}

// List must come first: a derived struct also accepts sequences.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StyleInput {
    List(Vec<Option<StyleInput>>),
    Entry(StyleEntry),
}

impl From<StyleInput> for Style {
    fn from(input: StyleInput) -> Self {
        let mut style = Style::default();
        style.flatten_into(input);
        style
    }
}

/// Recognized host props.
///
/// ARIA props take precedence over their legacy `accessibility*`
/// counterparts wherever both exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Props {
    #[serde(rename = "testID", skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(rename = "nativeID", skip_serializing_if = "Option::is_none")]
    pub native_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessible: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_role: Option<String>,

    #[serde(rename = "aria-label", skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_label: Option<String>,
    #[serde(rename = "aria-labelledby", skip_serializing_if = "Option::is_none")]
    pub aria_labelledby: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_labelled_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_hint: Option<String>,

    #[serde(rename = "aria-hidden", skip_serializing_if = "Option::is_none")]
    pub aria_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_elements_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important_for_accessibility: Option<ImportantForAccessibility>,
    #[serde(rename = "aria-modal", skip_serializing_if = "Option::is_none")]
    pub aria_modal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_view_is_modal: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_state: Option<AccessibilityState>,
    #[serde(rename = "aria-disabled", skip_serializing_if = "Option::is_none")]
    pub aria_disabled: Option<bool>,
    #[serde(rename = "aria-selected", skip_serializing_if = "Option::is_none")]
    pub aria_selected: Option<bool>,
    #[serde(rename = "aria-checked", skip_serializing_if = "Option::is_none")]
    pub aria_checked: Option<CheckedState>,
    #[serde(rename = "aria-busy", skip_serializing_if = "Option::is_none")]
    pub aria_busy: Option<bool>,
    #[serde(rename = "aria-expanded", skip_serializing_if = "Option::is_none")]
    pub aria_expanded: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_value: Option<AccessibilityValue>,
    #[serde(rename = "aria-valuemin", skip_serializing_if = "Option::is_none")]
    pub aria_valuemin: Option<f64>,
    #[serde(rename = "aria-valuemax", skip_serializing_if = "Option::is_none")]
    pub aria_valuemax: Option<f64>,
    #[serde(rename = "aria-valuenow", skip_serializing_if = "Option::is_none")]
    pub aria_valuenow: Option<f64>,
    #[serde(rename = "aria-valuetext", skip_serializing_if = "Option::is_none")]
    pub aria_valuetext: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<InputValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_events: Option<PointerEvents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// `role` wins over `accessibilityRole`
    pub fn explicit_role(&self) -> Option<&str> {
        self.role
            .as_deref()
            .or(self.accessibility_role.as_deref())
            .filter(|role| !role.is_empty())
    }

    /// `aria-label` wins over `accessibilityLabel`
    pub fn explicit_label(&self) -> Option<&str> {
        self.aria_label
            .as_deref()
            .or(self.accessibility_label.as_deref())
            .filter(|label| !label.is_empty())
    }

    pub fn labelled_by(&self) -> Option<&str> {
        self.aria_labelledby
            .as_deref()
            .or(self.accessibility_labelled_by.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn is_modal(&self) -> bool {
        self.aria_modal
            .or(self.accessibility_view_is_modal)
            .unwrap_or(false)
    }

    /// `pointerEvents` prop, falling back to the flattened style
    pub fn pointer_events(&self) -> PointerEvents {
        self.pointer_events
            .or_else(|| self.style.as_ref().and_then(|s| s.pointer_events))
            .unwrap_or_default()
    }

    pub fn is_display_none(&self) -> bool {
        matches!(
            self.style.as_ref().and_then(|s| s.display),
            Some(Display::None)
        )
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.value {
            Some(InputValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn toggle_value(&self) -> Option<bool> {
        match self.value {
            Some(InputValue::Toggle(flag)) => Some(flag),
            _ => None,
        }
    }
}
