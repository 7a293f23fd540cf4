//! Request-level validation for manual record payloads.
//!
//! Create and update share the same required fields: `videoLink`, `title`,
//! `description`, and `order`. The transport layer collects the raw form
//! fields into [`RawManualInput`]; [`ManualInput::validate`] is the only way
//! to obtain a [`ManualInput`], so downstream code never sees an empty field
//! or an unparsed order.

use crate::error::CoreError;

/// Raw form fields as received from the transport layer, before validation.
///
/// `order` stays a string here because multipart form fields arrive as text;
/// parsing it is part of validation.
#[derive(Debug, Default, Clone)]
pub struct RawManualInput {
    pub video_link: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<String>,
}

/// A validated create/update payload for a manual record.
#[derive(Debug, Clone)]
pub struct ManualInput {
    pub video_link: String,
    pub title: String,
    pub description: String,
    pub order: i64,
}

impl ManualInput {
    /// Validate raw form fields into a usable payload.
    ///
    /// Fails with [`CoreError::Validation`] if any required field is missing
    /// or blank, or if `order` does not parse as an integer.
    pub fn validate(raw: RawManualInput) -> Result<Self, CoreError> {
        let video_link = required("videoLink", raw.video_link)?;
        let title = required("title", raw.title)?;
        let description = required("description", raw.description)?;
        let order_raw = required("order", raw.order)?;

        let order: i64 = order_raw.parse().map_err(|_| {
            CoreError::Validation(format!("order must be an integer, got '{order_raw}'"))
        })?;

        Ok(Self {
            video_link,
            title,
            description,
            order,
        })
    }
}

/// Reject a missing or blank required field.
fn required(name: &'static str, value: Option<String>) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!(
            "missing required field: {name}"
        ))),
    }
}
