use std::collections::BTreeMap;

/// Versioned migration table mapping retired slot ids to their current
/// catalog ids. Reconciliation consults it to carry booking state across a
/// catalog redesign instead of resetting it.
#[derive(Debug, Clone, Default)]
pub struct SlotRenameTable {
    version: u32,
    entries: BTreeMap<String, String>,
}

impl SlotRenameTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(version: u32) -> Self {
        Self {
            version,
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, old_id: &str, current_id: &str) -> Self {
        self.entries.insert(old_id.to_string(), current_id.to_string());
        self
    }

    /// Slot ids retired by the day-part catalog redesign.
    pub fn catalog_redesign_v1() -> Self {
        Self::new(1)
            .with("morning", "wd-morning")
            .with("midday", "wd-midday")
            .with("afternoon", "wd-afternoon")
            .with("evening", "wd-evening")
            .with("weekend-morning", "we-morning")
            .with("weekend-afternoon", "we-afternoon")
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_id(&self, old_id: &str) -> Option<&str> {
        self.entries.get(old_id).map(String::as_str)
    }

    /// Retired ids that now map to `current_id`, in stable order.
    pub fn former_ids<'a>(&'a self, current_id: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(_, current)| current.as_str() == current_id)
            .map(|(old, _)| old.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_directions() {
        let table = SlotRenameTable::new(7)
            .with("morning", "wd-morning")
            .with("early", "wd-morning");

        assert_eq!(table.version(), 7);
        assert_eq!(table.current_id("morning"), Some("wd-morning"));
        assert_eq!(table.current_id("wd-morning"), None);

        let former: Vec<&str> = table.former_ids("wd-morning").collect();
        assert_eq!(former, vec!["early", "morning"]);
        assert!(table.former_ids("wd-evening").next().is_none());
    }

    #[test]
    fn test_shipped_table_covers_both_day_types() {
        let table = SlotRenameTable::catalog_redesign_v1();
        assert!(!table.is_empty());
        assert_eq!(table.current_id("morning"), Some("wd-morning"));
        assert_eq!(table.current_id("weekend-morning"), Some("we-morning"));
    }
}
