use serde::Serialize;

/// Entry of the course directory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationNode {
    /// Name of the entry at its own level
    pub label: String,

    /// Names of the ancestors and of the entry, joined by ` / `
    pub full_label: String,

    /// Raw link of the entry
    pub url: String,

    /// Schedule selector
    pub se: Option<String>,

    /// Group selector
    pub gr: Option<String>,

    /// Sub-entries, in the order of the source
    pub children: Vec<NavigationNode>,
}

impl NavigationNode {
    /// True when the entry points to a schedule
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.se.is_some() && self.gr.is_some()
    }

    /// Selector pair of a leaf
    #[must_use]
    pub fn selectors(&self) -> Option<(&str, &str)> {
        if !self.children.is_empty() {
            return None;
        }

        Some((self.se.as_deref()?, self.gr.as_deref()?))
    }
}
