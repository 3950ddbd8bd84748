use std::fmt;

use crate::accessibility::{AccessibilityStateMatcher, AccessibilityValueMatcher};
use crate::matches::TextMatch;

/// One query family plus its matcher
#[derive(Debug, Clone)]
pub enum Query {
    TestId(TextMatch),
    Text(TextMatch),
    Role(RoleQuery),
    LabelText(TextMatch),
    HintText(TextMatch),
    PlaceholderText(TextMatch),
    DisplayValue(TextMatch),
    State(AccessibilityStateMatcher),
    Value(AccessibilityValueMatcher),
}

impl Query {
    /// Family name used in logs
    pub fn family(&self) -> &'static str {
        match self {
            Query::TestId(_) => "TestId",
            Query::Text(_) => "Text",
            Query::Role(_) => "Role",
            Query::LabelText(_) => "LabelText",
            Query::HintText(_) => "HintText",
            Query::PlaceholderText(_) => "PlaceholderText",
            Query::DisplayValue(_) => "DisplayValue",
            Query::State(_) => "State",
            Query::Value(_) => "Value",
        }
    }
}

/// Human readable matcher, as it appears in error messages
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::TestId(m) => write!(f, "testID: {m}"),
            Query::Text(m) => write!(f, "text: {m}"),
            Query::Role(role) => write!(f, "{role}"),
            Query::LabelText(m) => write!(f, "accessibility label: {m}"),
            Query::HintText(m) => write!(f, "accessibility hint: {m}"),
            Query::PlaceholderText(m) => write!(f, "placeholder: {m}"),
            Query::DisplayValue(m) => write!(f, "display value: {m}"),
            Query::State(state) => write!(f, "{state}"),
            Query::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Role plus optional accessible-name, state and value filters
#[derive(Debug, Clone)]
pub struct RoleQuery {
    pub role: TextMatch,
    pub name: Option<TextMatch>,
    pub state: AccessibilityStateMatcher,
    pub value: AccessibilityValueMatcher,
}

impl RoleQuery {
    pub fn new(role: impl Into<TextMatch>) -> Self {
        Self {
            role: role.into(),
            name: None,
            state: AccessibilityStateMatcher::default(),
            value: AccessibilityValueMatcher::default(),
        }
    }

    pub fn name(mut self, name: impl Into<TextMatch>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn state(mut self, state: AccessibilityStateMatcher) -> Self {
        self.state = state;
        self
    }

    pub fn value(mut self, value: AccessibilityValueMatcher) -> Self {
        self.value = value;
        self
    }
}

impl From<&str> for RoleQuery {
    fn from(role: &str) -> Self {
        RoleQuery::new(role)
    }
}

impl From<TextMatch> for RoleQuery {
    fn from(role: TextMatch) -> Self {
        RoleQuery::new(role)
    }
}

impl fmt::Display for RoleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role: {}", self.role)?;
        if let Some(name) = &self.name {
            write!(f, ", name: {name}")?;
        }
        if !self.state.is_empty() {
            write!(f, ", {}", self.state)?;
        }
        if !self.value.is_empty() {
            write!(f, ", {}", self.value)?;
        }
        Ok(())
    }
}
