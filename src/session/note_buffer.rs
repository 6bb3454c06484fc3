//! The clinician's working text

use serde::Serialize;

/// A single mutable string of rough notes. Most recent edit wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NoteBuffer {
    text: String,
}

impl NoteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate `text` exactly as given
    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append an ingested block (transcript, document text), separated from
    /// existing text by a blank line
    pub fn append_block(&mut self, block: &str) {
        if !self.text.is_empty() && !self.text.ends_with("\n\n") {
            let sep = if self.text.ends_with('\n') { "\n" } else { "\n\n" };
            self.text.push_str(sep);
        }
        self.text.push_str(block);
    }

    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn read(&self) -> &str {
        &self.text
    }

    /// Whitespace-only text counts as blank
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl From<&str> for NoteBuffer {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_exact_concatenation() {
        let mut buf = NoteBuffer::new();
        buf.append("Patient reports ");
        buf.append("");
        buf.append("headache");
        buf.append(" for 3 days.");
        assert_eq!(buf.read(), "Patient reports headache for 3 days.");
    }

    #[test]
    fn test_append_block_separates_with_blank_line() {
        let mut buf = NoteBuffer::new();
        buf.append_block("first");
        assert_eq!(buf.read(), "first");

        buf.append_block("second");
        assert_eq!(buf.read(), "first\n\nsecond");

        buf.append("\n");
        buf.append_block("third");
        assert_eq!(buf.read(), "first\n\nsecond\n\nthird");
    }

    #[test]
    fn test_replace_and_blank() {
        let mut buf = NoteBuffer::from("old");
        buf.replace(" \n\t");
        assert!(buf.is_blank());
        assert!(!buf.is_empty());
        buf.clear();
        assert_eq!(buf.len(), 0);
    }
}
