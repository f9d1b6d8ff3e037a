//! Multi-choice answers and their cell codec.
//!
//! A list is stored in a single table cell as a JSON array of strings:
//!
//! ```text
//! ["Myxoid liposarcoma","Dermatofibrosarcoma protuberans, fibrosarcomatous"]
//! ```
//!
//! JSON keeps element order and lets labels contain commas, which several histology labels do.
//! Decoding trims every element and drops elements that are empty after trimming. An empty
//! cell, or a cell that is not a JSON array of strings, decodes to the empty list.

use serde::{Deserialize, Serialize};

/// Ordered list of selected labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelList(Vec<String>);

impl LabelList {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            labels
                .into_iter()
                .map(|s| s.as_ref().trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// Encodes the list for a table cell.
    pub fn encode(&self) -> String {
        // Serialising a Vec<String> to JSON cannot fail.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_owned())
    }

    /// Decodes a table cell. Returns `None` when the cell is non-empty but not a JSON array of
    /// strings; callers treat that as the empty list.
    pub fn decode(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        if cell.is_empty() {
            return Some(Self::default());
        }
        serde_json::from_str::<Vec<String>>(cell)
            .ok()
            .map(LabelList::new)
    }
}

impl From<Vec<String>> for LabelList {
    fn from(labels: Vec<String>) -> Self {
        LabelList::new(labels)
    }
}

impl From<LabelList> for Vec<String> {
    fn from(list: LabelList) -> Self {
        list.0
    }
}

impl std::fmt::Display for LabelList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_commas_and_order() {
        let list = LabelList::new(["Glomus tumour, malignant", "Angiosarcoma"]);
        let cell = list.encode();
        assert_eq!(cell, r#"["Glomus tumour, malignant","Angiosarcoma"]"#);
        assert_eq!(LabelList::decode(&cell), Some(list));
    }

    #[test]
    fn decode_trims_elements() {
        let list = LabelList::decode(r#"[" cT1 ", "cN0", "  "]"#).expect("valid array");
        assert_eq!(list, LabelList::new(["cT1", "cN0"]));
    }

    #[test]
    fn decode_empty_cell_is_empty_list() {
        assert_eq!(LabelList::decode(""), Some(LabelList::default()));
        assert_eq!(LabelList::decode("[]"), Some(LabelList::default()));
    }

    #[test]
    fn decode_unparseable_is_none() {
        assert_eq!(LabelList::decode("['Liposarcoma'"), None);
        assert_eq!(LabelList::decode("42"), None);
        assert_eq!(LabelList::decode("{not json"), None);
    }

    #[test]
    fn new_drops_blank_labels() {
        let list = LabelList::new(["", " Other "]);
        assert_eq!(Vec::<String>::from(list.clone()), ["Other".to_string()]);
        assert!(list.contains("Other"));
    }
}
