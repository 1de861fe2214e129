//! HTML forms as the portal presents them
//!
//! A [`Form`] is extracted from a parsed page and keeps everything needed to
//! submit it again: the resolved action URL, the method and every named
//! control with its current value. Controls are always addressed by name or
//! by the visible label of an option, never by position.

use crate::types::ExportError;
use reqwest::Url;
use scraper::{ElementRef, Selector};
use std::collections::HashMap;

/// HTTP method a form is submitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Kind of a form control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Hidden,
    Password,
    TextArea,
    Select,
    Radio,
    Checkbox,
    Submit,
}

/// One choice of a `<select>`, a radio group, a checkbox or a submit button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOption {
    pub value: String,
    pub label: String,
}

/// A named form control
///
/// `value` is `None` when the control contributes nothing on submission
/// (unchecked checkbox, radio group without selection, submit button).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub name: String,
    pub kind: ControlKind,
    pub value: Option<String>,
    pub label: String,
    pub options: Vec<FormOption>,
}

impl Control {
    fn new(name: &str, kind: ControlKind, value: Option<String>, label: String) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value,
            label,
            options: Vec::new(),
        }
    }
}

/// A submittable HTML form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    action: Url,
    method: Method,
    controls: Vec<Control>,
}

impl Form {
    /// Extract a form element
    ///
    /// `labels` maps element ids to the text of their `<label for=...>`.
    pub(crate) fn from_element(
        element: ElementRef<'_>,
        page_url: &Url,
        labels: &HashMap<String, String>,
    ) -> Result<Self, ExportError> {
        let action = match element.value().attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => page_url.join(action).map_err(|e| {
                ExportError::portal_format(format!("invalid form action '{}': {}", action, e))
            })?,
            _ => page_url.clone(),
        };
        let method = match element.value().attr("method") {
            Some(m) if m.eq_ignore_ascii_case("post") => Method::Post,
            _ => Method::Get,
        };

        let mut form = Form {
            action,
            method,
            controls: Vec::new(),
        };

        let fields = selector("input, select, textarea")?;
        let options = selector("option")?;
        for field in element.select(&fields) {
            let attrs = field.value();
            let Some(name) = attrs.attr("name") else {
                continue;
            };
            let label = attrs
                .attr("id")
                .and_then(|id| labels.get(id))
                .cloned()
                .unwrap_or_default();
            let value = attrs.attr("value").unwrap_or("").to_string();

            match field.value().name() {
                "select" => {
                    let mut control = Control::new(name, ControlKind::Select, None, label);
                    for option in field.select(&options) {
                        let text = element_text(&option);
                        let value = option.value().attr("value").map(str::to_string);
                        let value = value.unwrap_or_else(|| text.clone());
                        if option.value().attr("selected").is_some() || control.value.is_none() {
                            control.value = Some(value.clone());
                        }
                        control.options.push(FormOption { value, label: text });
                    }
                    form.controls.push(control);
                }
                "textarea" => {
                    let text = field.text().collect::<String>();
                    form.controls
                        .push(Control::new(name, ControlKind::TextArea, Some(text), label));
                }
                _ => {
                    let kind = attrs.attr("type").unwrap_or("text").to_ascii_lowercase();
                    let checked = attrs.attr("checked").is_some();
                    match kind.as_str() {
                        "radio" => form.push_radio(name, value, label, checked),
                        "checkbox" => {
                            let mut control = Control::new(
                                name,
                                ControlKind::Checkbox,
                                checked.then(|| value.clone()),
                                label.clone(),
                            );
                            control.options.push(FormOption { value, label });
                            form.controls.push(control);
                        }
                        "submit" | "image" | "button" => {
                            let mut control =
                                Control::new(name, ControlKind::Submit, None, label.clone());
                            control.options.push(FormOption { value, label });
                            form.controls.push(control);
                        }
                        "reset" | "file" => {}
                        "hidden" => form
                            .controls
                            .push(Control::new(name, ControlKind::Hidden, Some(value), label)),
                        "password" => form
                            .controls
                            .push(Control::new(name, ControlKind::Password, Some(value), label)),
                        _ => form
                            .controls
                            .push(Control::new(name, ControlKind::Text, Some(value), label)),
                    }
                }
            }
        }

        Ok(form)
    }

    fn push_radio(&mut self, name: &str, value: String, label: String, checked: bool) {
        let index = match self
            .controls
            .iter()
            .position(|c| c.kind == ControlKind::Radio && c.name == name)
        {
            Some(index) => index,
            None => {
                self.controls
                    .push(Control::new(name, ControlKind::Radio, None, String::new()));
                self.controls.len() - 1
            }
        };
        let group = &mut self.controls[index];
        if checked {
            group.value = Some(value.clone());
        }
        group.options.push(FormOption { value, label });
    }

    pub fn action(&self) -> &Url {
        &self.action
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.control(name).is_some()
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.name == name)
    }

    fn control_mut(&mut self, name: &str) -> Result<&mut Control, ExportError> {
        self.controls
            .iter_mut()
            .find(|c| c.name == name && c.kind != ControlKind::Submit)
            .ok_or_else(|| ExportError::portal_format(format!("form has no field '{}'", name)))
    }

    /// First password input, if any
    pub fn password_field(&self) -> Option<&Control> {
        self.controls
            .iter()
            .find(|c| c.kind == ControlKind::Password)
    }

    /// Set the value of a field
    ///
    /// Hidden and read-only fields may be overwritten. For selects, radio
    /// groups and checkboxes `value` must be one of the option values.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ExportError> {
        let control = self.control_mut(name)?;
        match control.kind {
            ControlKind::Select | ControlKind::Radio | ControlKind::Checkbox => {
                if !control.options.iter().any(|o| o.value == value) {
                    return Err(ExportError::portal_format(format!(
                        "field '{}' has no option '{}'",
                        name, value
                    )));
                }
            }
            _ => {}
        }
        control.value = Some(value.to_string());
        Ok(())
    }

    /// Choose the option of a select or radio group whose label matches
    ///
    /// Returns the label of the chosen option.
    pub fn choose_option<F>(&mut self, name: &str, matches: F) -> Result<String, ExportError>
    where
        F: Fn(&str) -> bool,
    {
        let control = self.control_mut(name)?;
        let option = control
            .options
            .iter()
            .find(|o| matches(&o.label))
            .cloned()
            .ok_or_else(|| {
                ExportError::portal_format(format!("no matching option in field '{}'", name))
            })?;
        control.value = Some(option.value);
        Ok(option.label)
    }

    /// Add a hidden field, or overwrite it if the form already has one
    pub fn add_hidden(&mut self, name: &str, value: &str) {
        match self.controls.iter_mut().find(|c| c.name == name) {
            Some(control) => control.value = Some(value.to_string()),
            None => self.controls.push(Control::new(
                name,
                ControlKind::Hidden,
                Some(value.to_string()),
                String::new(),
            )),
        }
    }

    /// Name/value pairs sent on submission, in document order
    ///
    /// Includes the first named submit button, as a browser clicking it would.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut clicked = false;
        for control in &self.controls {
            if control.kind == ControlKind::Submit {
                if !clicked {
                    clicked = true;
                    let value = control.options.first().map(|o| o.value.clone());
                    pairs.push((control.name.clone(), value.unwrap_or_default()));
                }
                continue;
            }
            if let Some(value) = &control.value {
                pairs.push((control.name.clone(), value.clone()));
            }
        }
        pairs
    }
}

/// Compile a CSS selector
pub(crate) fn selector(css: &str) -> Result<Selector, ExportError> {
    Selector::parse(css)
        .map_err(|e| ExportError::portal_format(format!("invalid selector '{}': {}", css, e)))
}

/// Text content with collapsed whitespace
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
