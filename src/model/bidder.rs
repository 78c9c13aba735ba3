//! Bidder identity, bid amount and declared contact fields

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Contact fields a bidder declared on its submission.
///
/// All three are free strings. They are compared verbatim after
/// normalization; see [`ContactInfo::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// The contact fields checked for sharing between bidders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Email,
    Phone,
    Address,
}

impl ContactField {
    pub const ALL: [ContactField; 3] = [
        ContactField::Email,
        ContactField::Phone,
        ContactField::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Address => "address",
        }
    }
}

impl ContactInfo {
    /// Normalized value for a field, or None when the field is missing or
    /// blank.
    ///
    /// Normalization: surrounding whitespace is trimmed on every field,
    /// emails are lowercased, and phone numbers lose spaces, dashes, dots
    /// and parentheses. Comparison between bidders is verbatim after this.
    pub fn normalized(&self, field: ContactField) -> Option<String> {
        let raw = match field {
            ContactField::Email => self.email.as_deref(),
            ContactField::Phone => self.phone.as_deref(),
            ContactField::Address => self.address.as_deref(),
        }?;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = match field {
            ContactField::Email => trimmed.to_lowercase(),
            ContactField::Phone => trimmed
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
                .collect(),
            ContactField::Address => trimmed.to_string(),
        };

        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }
}

/// A single bidder within one tender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bidder {
    /// Unique identifier within the analysis request
    pub bidder_id: String,

    /// Human-readable company or entity name
    pub name: String,

    /// Offered bid amount; must be positive
    pub bid_amount: f64,

    /// Document handles submitted by this bidder, in submission order
    #[serde(default)]
    pub documents: Vec<String>,

    /// Declared contact fields, when provided
    #[serde(default)]
    pub contact: Option<ContactInfo>,
}
