use serde::Serialize;

/// Where a file in the set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    /// Parsed out of the model output
    Generated,
    /// Added by the builder because the hosting target needs it
    Synthesized,
}

/// A single file ready to be committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFile {
    /// Relative path using `/` separators
    pub path: String,
    pub content: String,
    pub origin: FileOrigin,
}

/// Ordered set of files with unique paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSet {
    files: Vec<ArtifactFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file unless the path is already taken. Returns whether it was added.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>, origin: FileOrigin) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.files.push(ArtifactFile {
            path,
            content: content.into(),
            origin,
        });
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn get(&self, path: &str) -> Option<&ArtifactFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(|f| f.path.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files that came from the model rather than the builder
    pub fn generated_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.origin == FileOrigin::Generated)
            .count()
    }
}
