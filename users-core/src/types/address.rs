//! Address type definitions

use serde::{Deserialize, Serialize};

use super::Links;

/// A postal address owned by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub country: String,
    pub city: String,
    pub postcode: String,
    /// Storage-assigned ID
    #[serde(default)]
    pub id: String,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl Address {
    pub fn add_links(&mut self, domain: &str) {
        self.links.add_address(domain, &self.id);
    }
}
