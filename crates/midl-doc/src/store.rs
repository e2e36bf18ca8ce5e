//! Document store
//!
//! Accumulates entities from every parsed file of a batch, then persists one
//! XML document per entity, combining with what an earlier run left on disk.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::combine::combine;
use crate::config::DocConfig;
use crate::error::{DocError, Result};
use crate::mapper;
use crate::model::Entity;
use crate::xml::Element;

/// Identity of a persisted document: entity name within an output group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub group: PathBuf,
    pub name: String,
}

impl EntityKey {
    pub fn new(group: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group.display(), self.name)
    }
}

/// Outcome of [`DocumentSet::persist`]
#[derive(Debug, Default)]
pub struct PersistReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(EntityKey, DocError)>,
}

/// In-memory accumulator for one batch
#[derive(Debug)]
pub struct DocumentSet {
    config: DocConfig,
    entities: BTreeMap<EntityKey, Entity>,
}

impl DocumentSet {
    pub fn new(config: DocConfig) -> Self {
        Self {
            config,
            entities: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, key: &EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Add one contribution, merging with an entity already held under the
    /// same key. A contribution of a different kind is rejected and the held
    /// entity is kept.
    pub fn add(&mut self, group: &Path, entity: Entity) -> Result<()> {
        let key = EntityKey::new(group, entity.name());

        let Some(existing) = self.entities.remove(&key) else {
            debug!(%key, kind = entity.kind(), "new entity");
            self.entities.insert(key, entity);
            return Ok(());
        };

        match existing.merge(entity) {
            Ok(merged) => {
                debug!(%key, "merged entity");
                self.entities.insert(key, merged);
                Ok(())
            }
            Err((existing, incoming)) => {
                warn!(
                    %key,
                    existing = existing.kind(),
                    incoming = incoming.kind(),
                    "rejected contribution"
                );
                let err = DocError::KindMismatch {
                    key: key.clone(),
                    existing: existing.kind(),
                    incoming: incoming.kind(),
                };
                self.entities.insert(key, existing);
                Err(err)
            }
        }
    }

    /// Map a parsed file and add its entities; returns the rejected ones
    pub fn add_file(&mut self, group: &Path, file: &midl::File) -> Vec<DocError> {
        mapper::map_file(file, &self.config)
            .into_iter()
            .filter_map(|entity| self.add(group, entity).err())
            .collect()
    }

    /// Write every held entity to `{output_root}/{group}/{name}.xml`
    pub fn persist(&self) -> PersistReport {
        let mut report = PersistReport::default();

        for (key, entity) in &self.entities {
            match self.persist_one(key, entity) {
                Ok(path) => report.written.push(path),
                Err(err) => {
                    error!(%key, %err, "document not written");
                    report.failed.push((key.clone(), err));
                }
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failed.len(),
            "persisted documents"
        );
        report
    }

    fn persist_one(&self, key: &EntityKey, entity: &Entity) -> Result<PathBuf> {
        let path = self.config.document_path(&key.group, &key.name);
        let fresh = entity.to_element();

        let doc = if path.is_file() {
            let text = fs::read_to_string(&path).map_err(|e| DocError::io(&path, e))?;
            let existing = Element::parse(&text)?;
            debug!(path = %path.display(), "combining with existing document");
            combine(&existing, &fresh)?
        } else {
            fresh
        };
        let xml = doc.to_xml()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DocError::io(parent, e))?;
        }
        fs::write(&path, xml).map_err(|e| DocError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interface, Typedef};
    use tempfile::TempDir;

    fn set_in(dir: &TempDir) -> DocumentSet {
        DocumentSet::new(DocConfig::default().with_output_root(dir.path()))
    }

    #[test]
    fn test_add_merges_same_key() {
        let dir = TempDir::new().unwrap();
        let mut set = set_in(&dir);
        let a = midl::parse("interface IA { void Go(); }").unwrap();
        let b = midl::parse("interface IA { void Stop(); }").unwrap();
        assert!(set.add_file(Path::new("lib"), &a).is_empty());
        assert!(set.add_file(Path::new("lib"), &b).is_empty());

        assert_eq!(set.len(), 1);
        let Some(Entity::Interface(iface)) = set.get(&EntityKey::new("lib", "IA")) else {
            panic!("expected interface");
        };
        assert_eq!(iface.members.keys().collect::<Vec<_>>(), vec!["Go", "Stop"]);
    }

    #[test]
    fn test_groups_are_separate_keys() {
        let dir = TempDir::new().unwrap();
        let mut set = set_in(&dir);
        let file = midl::parse("interface IA { void Go(); }").unwrap();
        set.add_file(Path::new("one"), &file);
        set.add_file(Path::new("two"), &file);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_kind_mismatch_keeps_first_entity() {
        let dir = TempDir::new().unwrap();
        let mut set = set_in(&dir);
        set.add(Path::new("g"), Entity::Interface(Interface::new("Shared", "2011", None)))
            .unwrap();
        let err = set
            .add(
                Path::new("g"),
                Entity::Typedef(Typedef {
                    name: "Shared".into(),
                    version: "2011".into(),
                    constants: vec![],
                }),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DocError::KindMismatch { existing: "interface", incoming: "typedef", .. }
        ));
        assert_eq!(err.to_string(), "g/Shared is already documented as interface, cannot merge typedef");
        assert_eq!(set.get(&EntityKey::new("g", "Shared")).map(Entity::kind), Some("interface"));
    }

    #[test]
    fn test_persist_writes_group_directories() {
        let dir = TempDir::new().unwrap();
        let mut set = set_in(&dir);
        let file = midl::parse("typedef enum { cwRed, cwBlue } cwColor;").unwrap();
        set.add_file(Path::new("CWCom/Enumerators"), &file);

        let report = set.persist();
        assert!(report.failed.is_empty());
        let path = dir.path().join("CWCom/Enumerators/cwColor.xml");
        assert_eq!(report.written, vec![path.clone()]);

        let doc = Element::parse(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(doc.name, "typedef");
        assert_eq!(doc.attr("version"), Some("2011"));
    }

    #[test]
    fn test_persist_leaves_mismatched_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("g/Shared.xml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let original = "<?xml version=\"1.0\"?>\n<typedef name=\"Shared\"/>\n";
        fs::write(&path, original).unwrap();

        let mut set = set_in(&dir);
        set.add(Path::new("g"), Entity::Interface(Interface::new("Shared", "2011", None)))
            .unwrap();
        let report = set.persist();

        assert!(report.written.is_empty());
        assert!(matches!(report.failed[0].1, DocError::RootMismatch { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }
}
