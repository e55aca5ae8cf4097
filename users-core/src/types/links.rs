//! HATEOAS link annotation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::EntityKind;

/// A single hypermedia reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

/// Relation name → reference.
///
/// Links are derived from the configured domain and the entity id on every
/// read. Backends never persist them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Href>);

impl Links {
    /// Look up a relation.
    pub fn get(&self, rel: &str) -> Option<&Href> {
        self.0.get(rel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, rel: &str, href: String) {
        self.0.insert(rel.to_string(), Href { href });
    }

    /// `self`, `customer`, `addresses` and `cards` relations of a user.
    pub fn add_customer(&mut self, domain: &str, id: &str) {
        let base = entity_url(domain, EntityKind::Customers, id);
        self.insert("addresses", format!("{base}/addresses"));
        self.insert("cards", format!("{base}/cards"));
        self.insert("customer", base.clone());
        self.insert("self", base);
    }

    /// `self` and `address` relations of an address.
    pub fn add_address(&mut self, domain: &str, id: &str) {
        let url = entity_url(domain, EntityKind::Addresses, id);
        self.insert("address", url.clone());
        self.insert("self", url);
    }

    /// `self` and `card` relations of a card.
    pub fn add_card(&mut self, domain: &str, id: &str) {
        let url = entity_url(domain, EntityKind::Cards, id);
        self.insert("card", url.clone());
        self.insert("self", url);
    }
}

fn entity_url(domain: &str, kind: EntityKind, id: &str) -> String {
    format!("http://{domain}/{}/{id}", kind.as_str())
}
