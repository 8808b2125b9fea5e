use color_eyre::{Report, Result};
use log::{error, info, warn};
use strum::Display;

use crate::{image_model::GeneratedImage, location::LocationData};

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to discover location.";

#[derive(Debug, Clone, Copy, Default, Display, PartialEq, Eq, Hash)]
pub enum GenerationStatus {
    #[default]
    Idle,
    GeneratingText,
    GeneratingImage,
    Complete,
    Error,
}

impl GenerationStatus {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::GeneratingText | Self::GeneratingImage)
    }

    pub fn progress_label(self) -> Option<&'static str> {
        match self {
            Self::GeneratingText => Some("Consulting the Archives..."),
            Self::GeneratingImage => Some("Manifesting Visuals..."),
            _ => None,
        }
    }
}

/// Handed out when a cycle starts. Results must be reported with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTicket {
    pub id: u64,
    pub theme: Option<String>,
}

impl CycleTicket {
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }
}

/// Everything the front end shows: the status, the theme being typed and the
/// results of the current generation cycle.
///
/// Transitions consume the session and return the next one. The image is only
/// ever set while a location is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    status: GenerationStatus,
    theme: String,
    location: Option<LocationData>,
    image: Option<GeneratedImage>,
    error: Option<String>,
    cycle: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn location(&self) -> Option<&LocationData> {
        self.location.as_ref()
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        self.image.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn set_theme(mut self, theme: impl Into<String>) -> Self {
        if self.status.is_busy() {
            warn!("Ignoring theme edit while cycle {} is running", self.cycle);
        } else {
            self.theme = theme.into();
        }
        self
    }

    /// Starts a new cycle. A cycle that is still running is superseded: its
    /// results will carry a stale id and be dropped.
    pub fn submit(mut self) -> (Self, CycleTicket) {
        if self.status.is_busy() {
            warn!("Superseding cycle {} before it finished", self.cycle);
        }

        self.cycle += 1;
        self.status = GenerationStatus::GeneratingText;
        self.location = None;
        self.image = None;
        self.error = None;

        let ticket = CycleTicket {
            id: self.cycle,
            theme: Some(self.theme.clone()).filter(|t| !t.is_empty()),
        };
        info!("Cycle {} started, theme: {:?}", ticket.id, ticket.theme);
        (self, ticket)
    }

    pub fn text_finished(mut self, cycle: u64, result: Result<LocationData>) -> Self {
        if !self.accepts(cycle, GenerationStatus::GeneratingText) {
            return self;
        }

        match result {
            Ok(location) => {
                self.location = Some(location);
                self.status = GenerationStatus::GeneratingImage;
                self
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn image_finished(mut self, cycle: u64, result: Result<Option<GeneratedImage>>) -> Self {
        if !self.accepts(cycle, GenerationStatus::GeneratingImage) {
            return self;
        }

        match result {
            Ok(image) => {
                self.image = image;
                self.status = GenerationStatus::Complete;
                info!(
                    "Cycle {} complete, image: {}",
                    self.cycle,
                    self.image.is_some()
                );
                self
            }
            Err(e) => self.fail(&e),
        }
    }

    /// "Try again": leaves the error screen but keeps what was typed.
    pub fn retry(mut self) -> Self {
        if self.status == GenerationStatus::Error {
            self.status = GenerationStatus::Idle;
            self.error = None;
        }
        self
    }

    /// "New search": back to an empty idle session.
    pub fn reset(mut self) -> Self {
        if self.status.is_busy() {
            warn!("Ignoring reset while cycle {} is running", self.cycle);
            return self;
        }

        self.status = GenerationStatus::Idle;
        self.theme.clear();
        self.location = None;
        self.image = None;
        self.error = None;
        self
    }

    fn accepts(&self, cycle: u64, expected: GenerationStatus) -> bool {
        if cycle != self.cycle {
            warn!(
                "Dropping result of stale cycle {cycle}, current is {}",
                self.cycle
            );
            false
        } else if self.status != expected {
            warn!(
                "Dropping result for cycle {cycle}: expected {expected}, status is {}",
                self.status
            );
            false
        } else {
            true
        }
    }

    fn fail(mut self, report: &Report) -> Self {
        error!("Cycle {} failed during {}: {report:?}", self.cycle, self.status);
        self.error = Some(failure_message(report));
        self.status = GenerationStatus::Error;
        self
    }
}

/// The message shown to the user for a failed cycle.
pub fn failure_message(report: &Report) -> String {
    let message = report.to_string();
    if message.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.into()
    } else {
        message
    }
}
