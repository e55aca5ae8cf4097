//! Payment card type definitions

use serde::{Deserialize, Serialize, Serializer};

use super::Links;

const MASK_CHAR: char = '*';
const VISIBLE_SUFFIX: usize = 4;

/// A payment card owned by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Full card number. Serialized only in masked form.
    #[serde(serialize_with = "serialize_masked")]
    pub long_num: String,
    pub expires: String,
    #[serde(skip_serializing, default)]
    pub ccv: String,
    /// Storage-assigned ID
    #[serde(default)]
    pub id: String,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl Card {
    /// Replace the card number with its masked form.
    pub fn mask(&mut self) {
        self.long_num = mask_card_number(&self.long_num);
    }

    pub fn add_links(&mut self, domain: &str) {
        self.links.add_card(domain, &self.id);
    }
}

/// Mask all but the last four characters of a card number.
///
/// Inputs shorter than four characters are masked completely.
pub fn mask_card_number(number: &str) -> String {
    let len = number.chars().count();
    if len < VISIBLE_SUFFIX {
        return MASK_CHAR.to_string().repeat(len);
    }
    let hidden = len - VISIBLE_SUFFIX;
    number
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { MASK_CHAR } else { c })
        .collect()
}

fn serialize_masked<S: Serializer>(number: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&mask_card_number(number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_sixteen_digits() {
        let mut card = Card {
            long_num: "1234567812345678".to_string(),
            ..Default::default()
        };
        card.mask();
        assert_eq!(card.long_num, "************5678");
    }

    #[test]
    fn masks_odd_lengths() {
        assert_eq!(mask_card_number("abcdefg"), "***defg");
        assert_eq!(mask_card_number("hijklmnopqrs"), "********pqrs");
        assert_eq!(mask_card_number("1234"), "1234");
    }

    #[test]
    fn short_numbers_are_fully_masked() {
        assert_eq!(mask_card_number(""), "");
        assert_eq!(mask_card_number("1"), "*");
        assert_eq!(mask_card_number("123"), "***");
    }

    #[test]
    fn masking_counts_chars_not_bytes() {
        assert_eq!(mask_card_number("ééééé1234"), "*****1234");
    }

    #[test]
    fn serialization_masks_number_and_hides_ccv() {
        let card = Card {
            long_num: "4111111111111111".to_string(),
            expires: "08/29".to_string(),
            ccv: "123".to_string(),
            id: "c1".to_string(),
            links: Links::default(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["longNum"], "************1111");
        assert_eq!(json["expires"], "08/29");
        assert!(json.get("ccv").is_none());
    }

    #[test]
    fn deserialization_keeps_full_number() {
        let card: Card =
            serde_json::from_str(r#"{"longNum":"4111111111111111","expires":"01/30","ccv":"999"}"#)
                .unwrap();
        assert_eq!(card.long_num, "4111111111111111");
        assert_eq!(card.ccv, "999");
        assert!(card.id.is_empty());
    }
}
