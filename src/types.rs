use serde::{Deserialize, Serialize};

use crate::constants::markup;

/// Viewport-relative box of an element, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether a horizontal line at `line` crosses this box (top inclusive)
    pub fn straddles(&self, line: f64) -> bool {
        self.top() <= line && line < self.bottom()
    }
}

/// Sanitized contact data produced once per page load
///
/// Every field is either a validated value or absent. Collaborators get a
/// shared reference and never mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedContact {
    /// Handle without the leading `@`; empty when the raw handle was rejected
    pub social_handle: String,
    pub social_link_url: String,
    pub messaging_link_url: Option<String>,
    pub email: Option<String>,
    /// Address text as rendered on the page (after binding)
    pub address: String,
}

impl ResolvedContact {
    /// Value a copy button for `field` should offer, if any
    pub fn copyable(&self, field: &str) -> Option<&str> {
        match field {
            markup::EMAIL_FIELD => self.email.as_deref(),
            markup::ADDRESS_FIELD if !self.address.is_empty() => Some(&self.address),
            _ => None,
        }
    }
}
