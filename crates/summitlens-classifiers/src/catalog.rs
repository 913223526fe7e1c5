//! Landmark catalog
//!
//! Maps classifier output positions to human-readable landmarks. Every entry
//! carries the index it is expected to occupy, and construction rejects any
//! catalog whose indices are not exactly `0..n` in order.

use serde::{Deserialize, Serialize};
use std::path::Path;
use summitlens_core::{Error, Result};

/// A single landmark class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Position of this class in the classifier output
    pub index: usize,

    /// Landmark name reported to callers
    pub label: String,

    /// Free-text description reported to callers
    pub description: String,
}

impl CatalogEntry {
    pub fn new(index: usize, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Which built-in description set to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionStyle {
    /// One-sentence descriptions
    #[default]
    Short,
    /// Height and coordinates followed by the description
    Detailed,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    classes: Vec<CatalogEntry>,
}

/// Ordered, immutable class-index to landmark table
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCatalog {
    entries: Vec<CatalogEntry>,
}

impl ClassCatalog {
    /// Build a catalog, checking that entry `i` declares index `i`
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::catalog("catalog has no entries"));
        }
        for (position, entry) in entries.iter().enumerate() {
            if entry.index != position {
                return Err(Error::catalog(format!(
                    "entry '{}' declares index {} but sits at position {}",
                    entry.label, entry.index, position
                )));
            }
            if entry.label.trim().is_empty() {
                return Err(Error::catalog(format!("entry {} has an empty label", position)));
            }
        }
        Ok(Self { entries })
    }

    /// Build a catalog from `(label, description)` pairs, indexed by order
    pub fn from_pairs<L, D>(pairs: impl IntoIterator<Item = (L, D)>) -> Result<Self>
    where
        L: Into<String>,
        D: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (label, description))| CatalogEntry::new(index, label, description))
            .collect();
        Self::new(entries)
    }

    /// Parse a YAML catalog (`classes: [{index, label, description}, ...]`)
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(content)
            .map_err(|e| Error::catalog(format!("invalid catalog YAML: {}", e)))?;
        Self::new(file.classes)
    }

    /// Load a YAML catalog from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// The ten Sri Lankan landmarks the bundled models were trained on
    pub fn sri_lanka(style: DescriptionStyle) -> Self {
        let entries = SRI_LANKA
            .iter()
            .enumerate()
            .map(|(index, (label, short, details))| {
                let description = match style {
                    DescriptionStyle::Short => short.to_string(),
                    DescriptionStyle::Detailed => format!("{}\n\n{}", details, short),
                };
                CatalogEntry::new(index, *label, description)
            })
            .collect();
        Self { entries }
    }

    /// Fail unless the catalog has exactly one entry per classifier output
    pub fn ensure_aligned(&self, num_classes: usize) -> Result<()> {
        if self.entries.len() != num_classes {
            return Err(Error::catalog(format!(
                "catalog has {} entries but the classifier scores {} classes",
                self.entries.len(),
                num_classes
            )));
        }
        Ok(())
    }

    /// Entry at a class index
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty (never true for a constructed catalog)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in index order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

/// (label, short description, height and coordinates)
const SRI_LANKA: [(&str, &str, &str); 10] = [
    (
        "Bible Rock",
        "Bible Rock is a prominent rock formation in Sri Lanka, resembling an open book.",
        "Height - 670m\nCoordinates - 7°11′18″N 80°26′4″E",
    ),
    (
        "Ella Rock",
        "Ella Rock is a famous hiking destination in Ella, offering breathtaking views of the valley.",
        "Height - 1368m\nCoordinates - 6.8578° N, 81.0440° E",
    ),
    (
        "Hanthana",
        "Hanthana Mountain Range is located near Kandy and is popular among trekkers and nature lovers.",
        "Height - 1260m\nCoordinates - 7°15′31″N 80°37′43″E",
    ),
    (
        "Lakegala mountain",
        "Lakegala is a pyramid-shaped mountain in Sri Lanka, known for its unique shape and folklore.",
        "Height - 1310m\nCoordinates - 7°27′58″N 80°50′22″E",
    ),
    (
        "Mihinthale",
        "Mihinthale is a historical site in Sri Lanka, considered the birthplace of Buddhism in the country.",
        "Height - 300m\nCoordinates - 8.3507° N, 80.5168° E",
    ),
    (
        "Narangala Mountain",
        "Narangala is a stunning mountain in Badulla District, popular for hiking and sunrise views.",
        "Height - 1527m\nCoordinates - 6.9560° N, 81.0140° E",
    ),
    (
        "Saptha kanya",
        "Saptha Kanya, or Seven Virgins Mountain, is a famous mountain range known for its rugged terrain.",
        "Height - 1569m\nCoordinates - 6.8980° N, 80.5000° E",
    ),
    (
        "Sigiriya",
        "Sigiriya is an ancient rock fortress and UNESCO World Heritage site, known for its frescoes and history.",
        "Height - 180m\nCoordinates - 7.9570° N, 80.7603° E",
    ),
    (
        "SriPada",
        "Sri Pada (Adam’s Peak) is a sacred mountain in Sri Lanka, revered by multiple religious communities.",
        "Height - 2243m\nCoordinates - 6.8096° N, 80.4994° E",
    ),
    (
        "Yahangala",
        "Yahangala is a mountain in Sri Lanka, associated with the legends of King Ravana.",
        "Height - 1220m\nCoordinates - 6.8990° N, 80.8960° E",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_order() {
        let catalog = ClassCatalog::sri_lanka(DescriptionStyle::Short);
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.get(0).unwrap().label, "Bible Rock");
        assert_eq!(catalog.get(4).unwrap().label, "Mihinthale");
        assert_eq!(catalog.get(9).unwrap().label, "Yahangala");
        assert!(catalog.get(10).is_none());
    }

    #[test]
    fn test_builtin_catalog_revalidates() {
        for style in [DescriptionStyle::Short, DescriptionStyle::Detailed] {
            let catalog = ClassCatalog::sri_lanka(style);
            let rebuilt = ClassCatalog::new(catalog.entries().to_vec()).unwrap();
            assert_eq!(rebuilt, catalog);
        }
    }

    #[test]
    fn test_every_index_resolves() {
        let catalog = ClassCatalog::sri_lanka(DescriptionStyle::Short);
        for idx in 0..10 {
            let entry = catalog.get(idx).unwrap();
            assert_eq!(entry.index, idx);
        }
    }

    #[test]
    fn test_detailed_descriptions_carry_height() {
        let catalog = ClassCatalog::sri_lanka(DescriptionStyle::Detailed);
        let sri_pada = catalog.get(8).unwrap();
        assert!(sri_pada.description.starts_with("Height - 2243m"));
        assert!(sri_pada.description.contains("Adam’s Peak"));
    }

    #[test]
    fn test_misplaced_index_rejected() {
        let entries = vec![
            CatalogEntry::new(0, "A", "first"),
            CatalogEntry::new(2, "B", "second"),
        ];
        assert!(matches!(ClassCatalog::new(entries), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(ClassCatalog::new(vec![]).is_err());
    }

    #[test]
    fn test_alignment_check() {
        let catalog = ClassCatalog::from_pairs([("A", "a"), ("B", "b")]).unwrap();
        assert!(catalog.ensure_aligned(2).is_ok());
        assert!(matches!(catalog.ensure_aligned(10), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_yaml_catalog() {
        let yaml = r#"
classes:
  - index: 0
    label: "Pidurutalagala"
    description: "Highest mountain in Sri Lanka."
  - index: 1
    label: "Knuckles"
    description: "Mountain range in central Sri Lanka."
"#;
        let catalog = ClassCatalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().label, "Knuckles");
    }

    #[test]
    fn test_yaml_catalog_out_of_order_rejected() {
        let yaml = r#"
classes:
  - index: 1
    label: "Knuckles"
    description: "x"
  - index: 0
    label: "Pidurutalagala"
    description: "y"
"#;
        assert!(matches!(ClassCatalog::from_yaml(yaml), Err(Error::Catalog(_))));
    }
}
