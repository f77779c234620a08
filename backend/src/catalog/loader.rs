use serde::{Deserialize, Serialize};
use shared::{CanonicalCategory, CanonicalCourse, InstitutionRecord};
use std::path::Path;

use crate::predictor::normalizer;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unsupported catalog version: {0}")]
    UnsupportedVersion(u32),
    #[error("Institution '{name}' has an invalid cutoff: {cutoff}")]
    InvalidCutoff { name: String, cutoff: f64 },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: u32,
    pub institutions: Vec<InstitutionRecord>,
}

/// Read-only institution table shared by every request.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<InstitutionRecord>,
}

impl Catalog {
    pub fn new(records: Vec<InstitutionRecord>) -> Result<Self, CatalogError> {
        for record in &records {
            if !record.cutoff.is_finite() || record.cutoff <= 0.0 {
                return Err(CatalogError::InvalidCutoff {
                    name: record.name.clone(),
                    cutoff: record.cutoff,
                });
            }
        }
        Ok(Self { records })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        log::info!("Loading college catalog from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(raw)?;
        if file.version != 1 {
            return Err(CatalogError::UnsupportedVersion(file.version));
        }
        let catalog = Self::new(file.institutions)?;
        log::info!("Catalog loaded with {} institutions", catalog.len());
        Ok(catalog)
    }

    /// The directory the portal ships with when no catalog file is configured.
    pub fn builtin() -> Self {
        let rows: [(u32, &str, f64, &str, &str); 8] = [
            (1, "IIT Madras", 150.0, "Computer Science", "Chennai"),
            (2, "Anna University", 180.0, "Information Technology", "Chennai"),
            (3, "SRM Institute", 190.0, "Information Technology", "Chennai"),
            (4, "VIT Chennai", 170.0, "Computer Science", "Chennai"),
            (5, "Vellore Institute of Technology", 200.0, "Information Technology", "Vellore"),
            (6, "IIT Delhi", 100.0, "Computer Science", "Delhi"),
            (7, "IIT Bombay", 90.0, "Computer Science", "Mumbai"),
            (8, "NIT Trichy", 160.0, "Electrical Engineering", "Trichy"),
        ];

        let records = rows
            .into_iter()
            .map(|(id, name, cutoff, course, location)| InstitutionRecord {
                id,
                name: name.to_string(),
                course: course.to_string(),
                location: location.to_string(),
                category: "General".to_string(),
                cutoff,
            })
            .collect();

        Self { records }
    }

    pub fn records(&self) -> &[InstitutionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose course and category normalize to the same codes as
    /// the given filters. `None` matches everything.
    pub fn filter(
        &self,
        course: Option<CanonicalCourse>,
        category: Option<CanonicalCategory>,
    ) -> Vec<&InstitutionRecord> {
        self.records
            .iter()
            .filter(|record| course.is_none_or(|code| course_code(record) == code))
            .filter(|record| category.is_none_or(|code| category_code(record) == code))
            .collect()
    }
}

pub fn course_code(record: &InstitutionRecord) -> CanonicalCourse {
    normalizer::normalize_course(&record.course)
}

pub fn category_code(record: &InstitutionRecord) -> CanonicalCategory {
    normalizer::normalize_category(&record.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version: 1
institutions:
  - id: 10
    name: PSG Tech
    course: Mechanical Engineering
    location: Coimbatore
    category: BC
    cutoff: 2400
  - id: 11
    name: CEG
    course: Civil Engineering
    location: Chennai
    category: General
    cutoff: 900.5
"#;

    #[test]
    fn loads_yaml_catalog() {
        let catalog = Catalog::from_yaml(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[0].name, "PSG Tech");
        assert_eq!(catalog.records()[1].cutoff, 900.5);
        assert_eq!(course_code(&catalog.records()[0]), CanonicalCourse::Mech);
        assert_eq!(category_code(&catalog.records()[0]), CanonicalCategory::Bc);
        assert_eq!(course_code(&catalog.records()[1]), CanonicalCourse::Civil);
    }

    #[test]
    fn rejects_unknown_version() {
        let raw = SAMPLE.replace("version: 1", "version: 2");
        assert!(matches!(
            Catalog::from_yaml(&raw),
            Err(CatalogError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn rejects_non_positive_cutoff() {
        let raw = SAMPLE.replace("cutoff: 2400", "cutoff: 0");
        match Catalog::from_yaml(&raw) {
            Err(CatalogError::InvalidCutoff { name, .. }) => assert_eq!(name, "PSG Tech"),
            other => panic!("expected InvalidCutoff, got {:?}", other),
        }
    }

    #[test]
    fn builtin_table_is_valid() {
        let builtin = Catalog::builtin();
        assert_eq!(builtin.len(), 8);
        assert!(Catalog::new(builtin.records().to_vec()).is_ok());
        assert_eq!(course_code(&builtin.records()[7]), CanonicalCourse::Eee);
    }

    #[test]
    fn shipped_catalog_file_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/colleges.yaml");
        let shipped = Catalog::load(path).unwrap();
        assert_eq!(shipped.records(), Catalog::builtin().records());
    }

    #[test]
    fn filter_compares_canonical_codes() {
        let builtin = Catalog::builtin();

        let it: Vec<&str> = builtin
            .filter(Some(CanonicalCourse::It), None)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            it,
            vec!["Anna University", "SRM Institute", "Vellore Institute of Technology"]
        );

        let eee = builtin.filter(Some(CanonicalCourse::Eee), Some(CanonicalCategory::Oc));
        assert_eq!(eee.len(), 1);
        assert_eq!(eee[0].name, "NIT Trichy");

        assert_eq!(builtin.filter(None, Some(CanonicalCategory::Oc)).len(), 8);
        assert!(builtin.filter(None, Some(CanonicalCategory::Sc)).is_empty());
        assert_eq!(builtin.filter(None, None).len(), 8);
    }
}
