
use serde::{Deserialize, Serialize};

/// One delivered file as the downstream archival system expects it
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct FileDescriptor {
    /// File format label, e.g. `csv`, `json`, `fastq`
    pub format: String,
    /// Owning entity: the case id for case-wide files, the internal sample id otherwise
    pub id: String,
    /// Delivered path
    pub path: String,
    /// Path to an index file, the `~` placeholder when none exists
    pub path_index: String,
    /// Pipeline step that produced the file
    pub step: String,
    /// Downstream routing tag
    pub tag: String
}

impl FileDescriptor {
    /// Creates a descriptor with no index file
    pub fn new(format: &str, id: &str, path: String, step: &str, tag: &str) -> Self {
        Self {
            format: format.to_string(),
            id: id.to_string(),
            path,
            path_index: "~".to_string(),
            step: step.to_string(),
            tag: tag.to_string()
        }
    }
}

/// The flat, append-only list of file descriptors handed to the delivery system
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct DeliveryManifest {
    pub files: Vec<FileDescriptor>
}

impl DeliveryManifest {
    pub fn push(&mut self, descriptor: FileDescriptor) {
        self.files.push(descriptor);
    }

    /// Descriptors carrying the given routing tag, for lookups in tests and tooling
    pub fn with_tag(&self, tag: &str) -> Vec<&FileDescriptor> {
        self.files.iter().filter(|d| d.tag == tag).collect()
    }
}
