use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

use xml_compare::{ComparisonSettings, Element, document};

/// Test fixture paths
pub struct TestFixtures {
    pub fixtures_dir: PathBuf,
}

impl TestFixtures {
    pub fn new() -> Self {
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");

        Self { fixtures_dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.fixtures_dir.join(name)
    }

    pub fn compare1(&self) -> PathBuf {
        self.path("compare1.xml")
    }

    pub fn compare2(&self) -> PathBuf {
        self.path("compare2.xml")
    }

    pub fn compare3(&self) -> PathBuf {
        self.path("compare3.xml")
    }

    pub fn catalog_expected(&self) -> PathBuf {
        self.path("catalog_expected.xml")
    }

    pub fn catalog_actual(&self) -> PathBuf {
        self.path("catalog_actual.xml")
    }

    /// Parses a fixture synchronously
    pub fn load(&self, name: &str) -> Element {
        let text = std::fs::read_to_string(self.path(name))
            .unwrap_or_else(|err| panic!("Failed to read fixture {}: {}", name, err));
        document::parse_str(&text)
            .unwrap_or_else(|err| panic!("Failed to parse fixture {}: {}", name, err))
    }
}

/// Parses inline XML, panicking on malformed input
pub fn parse(text: &str) -> Element {
    document::parse_str(text).expect("test document must be well-formed")
}

/// Whitespace-insensitive settings ignoring the document timestamp
pub fn lenient_settings() -> ComparisonSettings {
    ComparisonSettings::builder()
        .whitespace_relevant(false)
        .tolerate_any_diff_at("/doc/@timestamp")
        .build()
        .expect("valid settings")
}

/// File system test utilities
pub async fn create_test_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await
}

/// Create a temporary directory holding the given named documents
pub async fn create_temp_documents(documents: &[(&str, &str)]) -> std::io::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    for (name, content) in documents {
        create_test_file(&temp_dir.path().join(name), content).await?;
    }
    Ok(temp_dir)
}
