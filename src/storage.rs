use anyhow::{Context, Result};
use facematch_vision::Descriptor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const REFERENCE_FILE: &str = "reference.bin";

/// The stored reference face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: String,
    /// What the descriptor was taken from, for display
    pub source: String,
    pub descriptor: Vec<f32>,
}

impl ReferenceRecord {
    pub fn new(source: impl Into<String>, descriptor: &Descriptor) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.into(),
            descriptor: descriptor.vector.to_vec(),
        }
    }

    pub fn descriptor(&self) -> Descriptor {
        Descriptor::from(self.descriptor.clone())
    }
}

fn reference_path(store: &Path) -> PathBuf {
    store.join(REFERENCE_FILE)
}

pub fn load_reference(store: &Path) -> Result<Option<ReferenceRecord>> {
    let file = reference_path(store);

    if !file.exists() {
        return Ok(None);
    }

    let data = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let record = postcard::from_bytes(&data)
        .with_context(|| format!("decoding reference {}", file.display()))?;
    Ok(Some(record))
}

/// Store `record`, replacing any previous reference.
pub fn save_reference(store: &Path, record: &ReferenceRecord) -> Result<()> {
    std::fs::create_dir_all(store)
        .with_context(|| format!("creating store {}", store.display()))?;
    let file = reference_path(store);
    let data = postcard::to_allocvec(record)?;
    std::fs::write(&file, data).with_context(|| format!("writing {}", file.display()))?;
    Ok(())
}

/// Returns whether a reference was removed.
pub fn clear_reference(store: &Path) -> Result<bool> {
    let file = reference_path(store);
    if !file.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&file).with_context(|| format!("removing {}", file.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PathBuf {
        std::env::temp_dir().join(format!("facematch-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_empty_store() {
        let store = store();
        assert!(load_reference(&store).unwrap().is_none());
        assert!(!clear_reference(&store).unwrap());
    }

    #[test]
    fn test_save_replaces_previous() {
        let store = store();
        let first = ReferenceRecord::new("a.json", &Descriptor::from(vec![0.1, 0.2]));
        let second = ReferenceRecord::new("b.json", &Descriptor::from(vec![0.3, 0.4, 0.5]));

        save_reference(&store, &first).unwrap();
        save_reference(&store, &second).unwrap();

        let loaded = load_reference(&store).unwrap().unwrap();
        assert_eq!(loaded, second);
        assert_eq!(loaded.descriptor(), Descriptor::from(vec![0.3, 0.4, 0.5]));

        assert!(clear_reference(&store).unwrap());
        assert!(load_reference(&store).unwrap().is_none());
        std::fs::remove_dir_all(&store).unwrap();
    }

    #[test]
    fn test_corrupt_reference() {
        let store = store();
        std::fs::create_dir_all(&store).unwrap();
        std::fs::write(store.join(REFERENCE_FILE), [0xff, 0xff, 0xff]).unwrap();
        assert!(load_reference(&store).is_err());
        std::fs::remove_dir_all(&store).unwrap();
    }
}
