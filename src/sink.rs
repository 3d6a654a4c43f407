//! Export delivery
//!
//! The engine never talks to the network itself. Download, share-link
//! creation and email are delegated to an [`ExportSink`] implemented by the
//! host; the session only calls it with an artifact that serialized cleanly.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::export::ExportArtifact;

/// Body of an email delivery request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
    /// Share link of the uploaded artifact
    pub file_url: String,
}

impl EmailRequest {
    /// JSON body as sent to the backend
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string(self).map_err(|e| ExportError::Sink(e.to_string()))
    }
}

/// What the user asked to do with the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportAction {
    Download,
    Share,
    /// Share, then mail the link
    Email { to: String },
}

/// Outcome of a successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReceipt {
    Downloaded { file_name: String },
    Shared { link: String },
    Emailed { to: String, file_url: String },
}

/// Host-side delivery of export artifacts
pub trait ExportSink {
    /// Offer the artifact as a file download
    fn download(&mut self, artifact: &ExportArtifact) -> Result<(), ExportError>;

    /// Upload the artifact and return a shareable link
    fn share(&mut self, artifact: &ExportArtifact) -> Result<String, ExportError>;

    /// Send the share link to an email address
    fn email(&mut self, request: &EmailRequest) -> Result<(), ExportError>;
}

/// Hand a serialized artifact to a sink.
///
/// # Errors
///
/// `ExportError::Sink` for an obviously malformed address, or whatever the
/// sink reports.
pub fn deliver_artifact<S: ExportSink + ?Sized>(
    sink: &mut S,
    action: &ExportAction,
    artifact: &ExportArtifact,
) -> Result<DeliveryReceipt, ExportError> {
    match action {
        ExportAction::Download => {
            sink.download(artifact)?;
            Ok(DeliveryReceipt::Downloaded { file_name: artifact.file_name() })
        }
        ExportAction::Share => {
            let link = sink.share(artifact)?;
            Ok(DeliveryReceipt::Shared { link })
        }
        ExportAction::Email { to } => {
            let to = to.trim();
            if !is_plausible_email(to) {
                return Err(ExportError::Sink(format!("invalid email address `{to}`")));
            }
            let file_url = sink.share(artifact)?;
            let request = EmailRequest { email: to.to_string(), file_url };
            sink.email(&request)?;
            Ok(DeliveryReceipt::Emailed { to: request.email, file_url: request.file_url })
        }
    }
}

fn is_plausible_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !s.contains(char::is_whitespace),
        None => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Sink that records every call
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub downloads: Vec<String>,
        pub shares: usize,
        pub emails: Vec<EmailRequest>,
    }

    impl ExportSink for RecordingSink {
        fn download(&mut self, artifact: &ExportArtifact) -> Result<(), ExportError> {
            self.downloads.push(artifact.file_name());
            Ok(())
        }

        fn share(&mut self, artifact: &ExportArtifact) -> Result<String, ExportError> {
            self.shares += 1;
            Ok(format!("https://share.example.com/{}", artifact.digest))
        }

        fn email(&mut self, request: &EmailRequest) -> Result<(), ExportError> {
            self.emails.push(request.clone());
            Ok(())
        }
    }

    #[test]
    fn test_email_request_json() {
        let request = EmailRequest {
            email: "kim@example.com".into(),
            file_url: "https://share.example.com/abc".into(),
        };
        assert_eq!(
            request.to_json().unwrap(),
            r#"{"email":"kim@example.com","file_url":"https://share.example.com/abc"}"#
        );
    }

    #[test]
    fn test_email_validation() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a b@c.co"));
    }
}
