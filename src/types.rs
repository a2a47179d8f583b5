// src/types.rs
use crate::forecast::ForecastError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub enum GuiCommand {
    /// Probe connectivity, then open a database session with these credentials.
    Login { username: String, password: String },
    /// Probe connectivity, then dispatch through the configured backend.
    SendNotification(Notification),
}

#[derive(Clone, Debug)]
pub enum AppMessage {
    Log(String),
    /// Connectivity probe failed; the requested action was not attempted.
    Offline,
    LoginSucceeded { user: String },
    LoginFailed(String),
    NotificationSent(Backend),
    NotificationFailed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Mail,
    Telegram,
}

/// "Replace `bearing_label` before `deadline`."
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub bearing_label: String,
    pub deadline: NaiveDate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPoint {
    pub index: u32,
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bearing {
    pub label: String,
    /// Vibration limit (µm); forecast values above it are outliers.
    pub limit: f64,
}

impl Bearing {
    fn new(label: &str, limit: f64) -> Self {
        Self {
            label: label.to_owned(),
            limit,
        }
    }
}

/// Ordered bearing table; selectors are indexes into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearingCatalog(Vec<Bearing>);

impl Default for BearingCatalog {
    fn default() -> Self {
        Self(vec![
            Bearing::new("Первый подшипник", 5.0),
            Bearing::new("Второй подшипник", 2.0),
            Bearing::new("Третий подшипник", 3.0),
        ])
    }
}

impl BearingCatalog {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Bearing, ForecastError> {
        self.0.get(index).ok_or(ForecastError::UnknownBearing {
            index,
            count: self.0.len(),
        })
    }

    pub fn limit(&self, index: usize) -> Result<f64, ForecastError> {
        self.get(index).map(|b| b.limit)
    }

    pub fn label(&self, index: usize) -> Result<&str, ForecastError> {
        self.get(index).map(|b| b.label.as_str())
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|b| b.label.clone()).collect()
    }
}
