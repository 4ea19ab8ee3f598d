/// A file produced by a transformation, ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub filename: String,
    pub media_type: &'static str,
    pub content: Vec<u8>,
}

impl OutputArtifact {
    pub fn new(filename: impl Into<String>, media_type: &'static str, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type,
            content,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}
