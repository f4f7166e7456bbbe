use std::fmt;

use serde::Serialize;

use crate::form::{FormValues, FIELD_COMMENT, FIELD_EMAIL, FIELD_FILE, FIELD_FIRSTNAME, FIELD_SURNAME};

pub const SAVE_PATH: &str = "/save";
pub const SAVE_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// The JSON body posted to the save endpoint: the popup's field values,
/// with the optional fields omitted when empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SavePayload {
    pub firstname: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl SavePayload {
    pub fn from_values(values: &FormValues) -> Self {
        let required = |name: &str| values.get(name).unwrap_or_default().to_string();
        let optional = |name: &str| {
            values
                .get(name)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            firstname: required(FIELD_FIRSTNAME),
            surname: required(FIELD_SURNAME),
            email: required(FIELD_EMAIL),
            comment: optional(FIELD_COMMENT),
            file: optional(FIELD_FILE),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// What came back for a dispatched save request. The legacy widget ignored
/// this entirely; here the three ways a request can end are kept apart so the
/// UI can tell "sent" from "acknowledged".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Accepted { status: u16 },
    Rejected { status: u16 },
    TransportError { message: String },
}

impl SaveOutcome {
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            SaveOutcome::Accepted { status }
        } else {
            SaveOutcome::Rejected { status }
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SaveOutcome::Accepted { .. })
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOutcome::Accepted { status } => write!(f, "saved to database (HTTP {status})"),
            SaveOutcome::Rejected { status } => write!(f, "server rejected the save (HTTP {status})"),
            SaveOutcome::TransportError { message } => write!(f, "save request failed: {message}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavePhase {
    Idle,
    Submitting,
    Confirmed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    AlreadyInFlight,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::AlreadyInFlight => write!(f, "a save request is already in flight"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Tracks the single save request the widget may have in flight.
///
/// `Idle → Submitting → Confirmed | Failed`, with a resubmit allowed from
/// either terminal phase. Confirmation is reached only through an accepted
/// outcome; an outcome that arrives while nothing is submitting is dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveTracker {
    phase: SavePhase,
    body: Option<String>,
}

impl Default for SaveTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveTracker {
    pub fn new() -> Self {
        Self {
            phase: SavePhase::Idle,
            body: None,
        }
    }

    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        self.phase == SavePhase::Submitting
    }

    /// The JSON body of the in-flight or most recently finished request.
    pub fn submitted_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn begin(&mut self, body: String) -> Result<(), SubmitError> {
        if self.in_flight() {
            return Err(SubmitError::AlreadyInFlight);
        }
        self.phase = SavePhase::Submitting;
        self.body = Some(body);
        Ok(())
    }

    /// Applies an outcome to the in-flight request. Returns false when the
    /// outcome does not belong to a tracked request.
    pub fn finish(&mut self, outcome: &SaveOutcome) -> bool {
        if !self.in_flight() {
            return false;
        }
        self.phase = if outcome.is_accepted() {
            SavePhase::Confirmed
        } else {
            SavePhase::Failed
        };
        true
    }
}
