//! Document-export trigger.
//!
//! The PDF itself is generated server-side; this module only requests the
//! opaque byte stream and gates the download action so a view layer gets at
//! most one export in flight per report view. The action is re-enabled once
//! the outcome resolves, success or error, so a failed attempt can be
//! retried.

use thiserror::Error;

use crate::transport::{ExportTransport, TransportError};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("An export is already in progress")]
    InFlight,
}

/// Gate around the download action of one report view.
#[derive(Debug, Default)]
pub struct DownloadGate {
    in_flight: bool,
}

impl DownloadGate {
    pub fn new() -> Self {
        DownloadGate::default()
    }

    /// Whether the view should currently offer the download action.
    pub fn is_enabled(&self) -> bool {
        !self.in_flight
    }

    /// Request the export for a user and hand back the opaque byte stream.
    pub fn trigger(
        &mut self,
        transport: &dyn ExportTransport,
        user_identifier: &str,
    ) -> Result<Vec<u8>, ExportError> {
        if self.in_flight {
            return Err(ExportError::InFlight);
        }

        self.in_flight = true;
        let result = transport.request_export(user_identifier);
        self.in_flight = false;

        match result {
            Ok(bytes) => {
                tracing::info!(
                    user = %user_identifier,
                    bytes = bytes.len(),
                    "Report export retrieved"
                );
                Ok(bytes)
            }
            Err(e) => {
                tracing::warn!(user = %user_identifier, error = %e, "Report export failed");
                Err(e.into())
            }
        }
    }
}
