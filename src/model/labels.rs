//! Recently used labels and their colors.

use std::collections::HashMap;

use crate::color_utils::label_color;

/// Ordered list of recently used labels, most recent first.
///
/// Passed explicitly to the editor; there is no global instance.
#[derive(Debug, Clone, Default)]
pub struct RecentLabels {
    labels: Vec<String>,
    colors: HashMap<String, [u8; 3]>,
    /// Counter for color generation so colors stay stable when labels reorder.
    next_color: usize,
}

impl RecentLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from labels listed most recent first.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut recent = Self::new();
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        for label in labels.into_iter().rev() {
            recent.touch(&label);
        }
        recent
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn most_recent(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Mark `label` as just used: moves it to the front, assigning a color on
    /// first use. Blank labels are ignored.
    pub fn touch(&mut self, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        self.labels.retain(|l| l != label);
        self.labels.insert(0, label.to_string());
        if !self.colors.contains_key(label) {
            self.colors
                .insert(label.to_string(), label_color(self.next_color));
            self.next_color += 1;
        }
    }

    /// Color assigned to a label, if it has been used.
    pub fn color_for(&self, label: &str) -> Option<[u8; 3]> {
        self.colors.get(label).copied()
    }

    /// First label (most recent first) starting with `prefix`, ignoring case.
    pub fn find_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return None;
        }
        let prefix = prefix.to_lowercase();
        self.labels
            .iter()
            .find(|l| l.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
    }
}
