use serde::Serialize;

/// A file part received in a multipart request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// Multipart field name the part was sent under
    pub field: String,

    /// Client-supplied filename, as sent
    pub filename: String,

    #[serde(skip)]
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(field: impl Into<String>, filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            filename: filename.into(),
            content,
        }
    }

    /// Exact, case-sensitive `.csv` suffix match.
    pub fn is_csv(&self) -> bool {
        self.filename.ends_with(".csv")
    }

    /// Filename without any client-side directory components
    pub fn basename(&self) -> &str {
        self.filename
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(&self.filename)
    }
}

/// All file parts of one request, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct UploadSet {
    files: Vec<UploadedFile>,
}

impl UploadSet {
    pub fn new(files: Vec<UploadedFile>) -> Self {
        Self { files }
    }

    pub fn push(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// All files sent under `field`
    pub fn by_field(&self, field: &str) -> Vec<&UploadedFile> {
        self.files.iter().filter(|f| f.field == field).collect()
    }

    /// First file sent under `field`
    pub fn first(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }
}
