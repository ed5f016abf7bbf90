use serde::{Deserialize, Serialize};

/// An operational grouping of representatives sharing one capacity pool
/// per time block. The roster is ordered and not deduplicated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub representatives: Vec<String>,
    pub color_tag: String,
}

impl Region {
    pub fn new(id: &str, name: &str, color_tag: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            representatives: Vec::new(),
            color_tag: color_tag.to_string(),
        }
    }
}
