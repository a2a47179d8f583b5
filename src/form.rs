// src/form.rs
//! Declarative two-column forms: a list of `{label, control kind, constraints}`
//! rendered through one `egui::Grid` path and validated before submit.
use crate::i18n::{Language, UiText};
use chrono::NaiveDate;
use eframe::egui;
use egui_extras::DatePickerButton;
use std::collections::HashMap;
use thiserror::Error;

const FIELD_WIDTH: f32 = 200.0;

/// PostgreSQL truncates identifiers past 63 bytes.
const MAX_LOGIN_LEN: usize = 63;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Password,
    Choice(Vec<String>),
    Date,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Constraints {
    pub required: bool,
    /// Limit in bytes of UTF-8.
    pub max_len: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: UiText,
    pub kind: FieldKind,
    pub constraints: Constraints,
}

impl FieldSpec {
    pub fn new(key: &'static str, label: UiText, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            constraints: Constraints::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }

    pub fn max_len(mut self, n: usize) -> Self {
        self.constraints.max_len = Some(n);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Choice(usize),
    Date(NaiveDate),
}

impl FieldKind {
    fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Text | FieldKind::Password => FieldValue::Text(String::new()),
            FieldKind::Choice(_) => FieldValue::Choice(0),
            FieldKind::Date => FieldValue::Date(chrono::Local::now().date_naive()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("field `{key}` is required")]
    Required { key: &'static str, label: UiText },
    #[error("field `{key}` is longer than {max} bytes")]
    TooLong {
        key: &'static str,
        label: UiText,
        max: usize,
    },
}

impl FormError {
    pub fn localized(&self, lang: Language) -> String {
        match self {
            FormError::Required { label, .. } => format!(
                "{} «{}».",
                lang.text(UiText::FieldRequired),
                lang.text(*label)
            ),
            FormError::TooLong { label, max, .. } => format!(
                "{} «{}» (max {max}).",
                lang.text(UiText::FieldTooLong),
                lang.text(*label)
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Form {
    id: &'static str,
    fields: Vec<FieldSpec>,
    values: HashMap<&'static str, FieldValue>,
}

impl Form {
    pub fn new(id: &'static str, fields: Vec<FieldSpec>) -> Self {
        let values = fields
            .iter()
            .map(|f| (f.key, f.kind.default_value()))
            .collect();
        Self { id, fields, values }
    }

    pub fn login() -> Self {
        Self::new(
            "login_form",
            vec![
                FieldSpec::new("login", UiText::Login, FieldKind::Text)
                    .required()
                    .max_len(MAX_LOGIN_LEN),
                FieldSpec::new("password", UiText::Password, FieldKind::Password),
            ],
        )
    }

    pub fn date_range() -> Self {
        Self::new(
            "date_range_form",
            vec![
                FieldSpec::new("begin", UiText::DateFrom, FieldKind::Date),
                FieldSpec::new("end", UiText::DateTo, FieldKind::Date),
            ],
        )
    }

    pub fn send_message(bearing_labels: Vec<String>) -> Self {
        Self::new(
            "send_message_form",
            vec![
                FieldSpec::new("bearing", UiText::Replace, FieldKind::Choice(bearing_labels)),
                FieldSpec::new("deadline", UiText::Until, FieldKind::Date),
            ],
        )
    }

    pub fn text(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn choice(&self, key: &str) -> usize {
        match self.values.get(key) {
            Some(FieldValue::Choice(i)) => *i,
            _ => 0,
        }
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        match self.values.get(key) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &'static str, value: FieldValue) {
        self.values.insert(key, value);
    }

    pub fn validate(&self) -> Result<(), FormError> {
        for field in &self.fields {
            if !matches!(field.kind, FieldKind::Text | FieldKind::Password) {
                continue;
            }
            let value = self.text(field.key);
            if field.constraints.required && value.trim().is_empty() {
                return Err(FormError::Required {
                    key: field.key,
                    label: field.label,
                });
            }
            if let Some(max) = field.constraints.max_len {
                if value.len() > max {
                    return Err(FormError::TooLong {
                        key: field.key,
                        label: field.label,
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn show(&mut self, ui: &mut egui::Ui, lang: Language) {
        let id = self.id;
        let fields = &self.fields;
        let values = &mut self.values;
        egui::Grid::new(id)
            .num_columns(2)
            .spacing([10.0, 10.0])
            .show(ui, |ui| {
                for field in fields {
                    ui.label(lang.text(field.label));
                    let value = values
                        .entry(field.key)
                        .or_insert_with(|| field.kind.default_value());
                    match (&field.kind, value) {
                        (FieldKind::Text, FieldValue::Text(s)) => {
                            ui.add(egui::TextEdit::singleline(s).desired_width(FIELD_WIDTH));
                        }
                        (FieldKind::Password, FieldValue::Text(s)) => {
                            ui.add(
                                egui::TextEdit::singleline(s)
                                    .password(true)
                                    .desired_width(FIELD_WIDTH),
                            );
                        }
                        (FieldKind::Choice(options), FieldValue::Choice(idx)) => {
                            let selected = options.get(*idx).map(String::as_str).unwrap_or("");
                            egui::ComboBox::from_id_source((id, field.key))
                                .selected_text(selected)
                                .width(FIELD_WIDTH)
                                .show_ui(ui, |ui| {
                                    for (i, option) in options.iter().enumerate() {
                                        ui.selectable_value(idx, i, option.as_str());
                                    }
                                });
                        }
                        (FieldKind::Date, FieldValue::Date(d)) => {
                            let picker_id = format!("{id}_{}", field.key);
                            ui.add(DatePickerButton::new(d).id_source(&picker_id));
                        }
                        (kind, value) => *value = kind.default_value(),
                    }
                    ui.end_row();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_kind() {
        let form = Form::send_message(vec!["A".into(), "B".into()]);
        assert_eq!(form.choice("bearing"), 0);
        assert!(form.date("deadline").is_some());
        assert_eq!(Form::login().text("login"), "");
    }

    #[test]
    fn test_blank_login_is_required() {
        let mut form = Form::login();
        form.set("login", FieldValue::Text("   ".into()));
        assert_eq!(
            form.validate(),
            Err(FormError::Required {
                key: "login",
                label: UiText::Login
            })
        );
    }

    #[test]
    fn test_empty_password_is_allowed() {
        let mut form = Form::login();
        form.set("login", FieldValue::Text("operator".into()));
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_overlong_login_is_rejected() {
        let mut form = Form::login();
        form.set("login", FieldValue::Text("я".repeat(MAX_LOGIN_LEN + 1)));
        assert!(matches!(
            form.validate(),
            Err(FormError::TooLong { max: MAX_LOGIN_LEN, .. })
        ));
    }

    #[test]
    fn test_login_limit_counts_bytes() {
        let mut form = Form::login();
        // 32 Cyrillic letters take 64 bytes
        form.set("login", FieldValue::Text("я".repeat(32)));
        assert!(matches!(form.validate(), Err(FormError::TooLong { .. })));
        form.set("login", FieldValue::Text("я".repeat(31)));
        assert_eq!(form.validate(), Ok(()));
        form.set("login", FieldValue::Text("a".repeat(MAX_LOGIN_LEN)));
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_error_message_is_localized() {
        let err = FormError::Required {
            key: "login",
            label: UiText::Login,
        };
        assert_eq!(err.localized(Language::Russian), "Заполните поле «Логин».");
        assert_eq!(err.localized(Language::English), "Please fill in «Login».");
    }

    #[test]
    fn test_date_and_choice_fields_are_not_text_validated() {
        let form = Form::date_range();
        assert_eq!(form.validate(), Ok(()));
    }
}
