//! Entity collections addressed by delete requests

use std::fmt;

/// The collections a backend stores.
///
/// The service passes delete kinds through as opaque strings; backends parse
/// them with [`EntityKind::parse`] and reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customers,
    Addresses,
    Cards,
}

impl EntityKind {
    /// Collection name as used in delete requests and link paths.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Addresses => "addresses",
            Self::Cards => "cards",
        }
    }

    /// Parse a collection name. Matching is exact.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "customers" => Some(Self::Customers),
            "addresses" => Some(Self::Addresses),
            "cards" => Some(Self::Cards),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
