//! 섹션 카탈로그 모듈
//!
//! 정규 섹션 레이블과 해당 섹션의 시작을 알리는 헤딩 동의어 목록을 관리합니다.
//! 기본 카탈로그는 GHS 16개 섹션 구성의 SDS(안전보건자료)용입니다.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 카탈로그 파일 이름 (데이터 디렉토리 기준)
pub const CATALOG_FILE_NAME: &str = "catalog.json";

// ============================================================================
// Errors
// ============================================================================

/// 카탈로그 구성 오류
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog has no sections")]
    Empty,
    #[error("catalog contains a blank section label")]
    BlankLabel,
    #[error("section '{0}' has no synonyms")]
    NoSynonyms(String),
    #[error("section '{0}' has a blank synonym")]
    BlankSynonym(String),
    #[error("failed to compile matcher for section '{label}': {source}")]
    Pattern {
        label: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (~/.local/share/sds-splitter/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sds-splitter")
}

// ============================================================================
// SectionCatalog
// ============================================================================

/// 섹션 카탈로그
///
/// 레이블 순서는 삽입 순서를 유지하며, 같은 위치에서 여러 레이블이
/// 매칭될 때의 우선순위로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, Vec<String>>", into = "IndexMap<String, Vec<String>>")]
pub struct SectionCatalog {
    sections: IndexMap<String, Vec<String>>,
}

impl SectionCatalog {
    /// 레이블-동의어 목록으로 생성 (검증 포함)
    pub fn new<I, L, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (L, Vec<S>)>,
        L: Into<String>,
        S: Into<String>,
    {
        let sections: IndexMap<String, Vec<String>> = entries
            .into_iter()
            .map(|(label, synonyms)| {
                (
                    label.into(),
                    synonyms.into_iter().map(Into::into).collect(),
                )
            })
            .collect();

        Self::validate(&sections)?;
        Ok(Self { sections })
    }

    fn validate(sections: &IndexMap<String, Vec<String>>) -> Result<(), CatalogError> {
        if sections.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (label, synonyms) in sections {
            if label.trim().is_empty() {
                return Err(CatalogError::BlankLabel);
            }
            if synonyms.is_empty() {
                return Err(CatalogError::NoSynonyms(label.clone()));
            }
            if synonyms.iter().any(|s| s.trim().is_empty()) {
                return Err(CatalogError::BlankSynonym(label.clone()));
            }
        }

        Ok(())
    }

    /// 기본 SDS 카탈로그 (GHS 16개 섹션)
    pub fn sds_default() -> Self {
        let sections = SDS_SECTIONS
            .iter()
            .map(|(label, synonyms)| {
                (
                    label.to_string(),
                    synonyms.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();

        Self { sections }
    }

    /// JSON 문자열에서 로드
    ///
    /// 형식: `{ "레이블": ["동의어", ...], ... }` (키 순서 유지)
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let sections: IndexMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::validate(&sections)?;
        Ok(Self { sections })
    }

    /// JSON 파일에서 로드
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// 유효 카탈로그 로드
    ///
    /// 명시된 경로 → 데이터 디렉토리의 catalog.json → 내장 SDS 카탈로그 순
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        Self::load_from(path, &get_data_dir())
    }

    /// 지정한 데이터 디렉토리 기준으로 유효 카탈로그 로드
    pub fn load_from(path: Option<&Path>, data_dir: &Path) -> Result<Self, CatalogError> {
        if let Some(path) = path {
            tracing::debug!("Loading catalog from {:?}", path);
            return Self::from_json_file(path);
        }

        let default_path = data_dir.join(CATALOG_FILE_NAME);
        if default_path.is_file() {
            tracing::debug!("Loading catalog from {:?}", default_path);
            return Self::from_json_file(&default_path);
        }

        Ok(Self::sds_default())
    }

    /// JSON 문자열로 직렬화 (pretty)
    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.sections)?)
    }

    /// 레이블 목록 (카탈로그 순서)
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// 레이블별 동의어 (카탈로그 순서)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sections
            .iter()
            .map(|(label, synonyms)| (label.as_str(), synonyms.as_slice()))
    }

    /// 레이블의 동의어 조회
    pub fn synonyms(&self, label: &str) -> Option<&[String]> {
        self.sections.get(label).map(Vec::as_slice)
    }

    /// 레이블이 카탈로그에 있는지 확인
    pub fn contains(&self, label: &str) -> bool {
        self.sections.contains_key(label)
    }

    /// 섹션 수
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for SectionCatalog {
    fn default() -> Self {
        Self::sds_default()
    }
}

impl TryFrom<IndexMap<String, Vec<String>>> for SectionCatalog {
    type Error = CatalogError;

    fn try_from(sections: IndexMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::validate(&sections)?;
        Ok(Self { sections })
    }
}

impl From<SectionCatalog> for IndexMap<String, Vec<String>> {
    fn from(catalog: SectionCatalog) -> Self {
        catalog.sections
    }
}

// ============================================================================
// Built-in SDS Catalog
// ============================================================================

const SDS_SECTIONS: &[(&str, &[&str])] = &[
    (
        "1. Identification",
        &[
            "Identification",
            "Product Identifier",
            "Product Identification",
            "Section 1",
            "Product and company identification",
        ],
    ),
    (
        "2. Hazard(s) identification",
        &["Hazard Identification", "Hazards Identification", "Section 2"],
    ),
    (
        "3. Composition/information on ingredients",
        &["Composition", "Ingredients", "Information on Ingredients", "Section 3"],
    ),
    (
        "4. First-aid measures",
        &["First Aid", "First Aid Measures", "Section 4"],
    ),
    (
        "5. Fire-fighting measures",
        &["Fire Fighting", "Fire Fighting Measures", "Section 5"],
    ),
    (
        "6. Accidental release measures",
        &["Accidental Release", "Accidental Release Measures", "Section 6"],
    ),
    (
        "7. Handling and storage",
        &["Handling", "Storage", "Handling and Storage", "Section 7"],
    ),
    (
        "8. Exposure controls/personal protection",
        &[
            "Exposure Controls",
            "Personal Protection",
            "Exposure Controls/Personal Protection",
            "Section 8",
        ],
    ),
    (
        "9. Physical and chemical properties",
        &[
            "Physical Properties",
            "Chemical Properties",
            "Physical and Chemical Properties",
            "Section 9",
        ],
    ),
    (
        "10. Stability and reactivity",
        &["Stability", "Reactivity", "Stability and Reactivity", "Section 10"],
    ),
    (
        "11. Toxicological information",
        &["Toxicological Information", "Toxicology", "Section 11"],
    ),
    (
        "12. Ecological information",
        &["Ecological Information", "Ecology", "Section 12"],
    ),
    (
        "13. Disposal considerations",
        &["Disposal", "Disposal Considerations", "Section 13"],
    ),
    (
        "14. Transport information",
        &["Transport Information", "Transport", "Section 14"],
    ),
    (
        "15. Regulatory information",
        &["Regulatory Information", "Regulations", "Section 15"],
    ),
    (
        "16. Other information",
        &["Other Information", "Other", "Section 16"],
    ),
];

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sds_default_has_sixteen_sections() {
        let catalog = SectionCatalog::sds_default();
        assert_eq!(catalog.len(), 16);
        assert_eq!(catalog.labels().next(), Some("1. Identification"));
        assert_eq!(catalog.labels().last(), Some("16. Other information"));
        assert!(catalog
            .synonyms("7. Handling and storage")
            .unwrap()
            .contains(&"Storage".to_string()));
    }

    #[test]
    fn test_new_rejects_empty_synonyms() {
        let result = SectionCatalog::new(vec![
            ("1. Identification", vec!["Identification"]),
            ("2. Hazards", Vec::<&str>::new()),
        ]);
        assert!(matches!(result, Err(CatalogError::NoSynonyms(label)) if label == "2. Hazards"));
    }

    #[test]
    fn test_new_rejects_empty_catalog() {
        let result = SectionCatalog::new(Vec::<(String, Vec<String>)>::new());
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn test_new_rejects_blank_synonym_and_label() {
        let result = SectionCatalog::new(vec![("A", vec!["ok", "  "])]);
        assert!(matches!(result, Err(CatalogError::BlankSynonym(_))));

        let result = SectionCatalog::new(vec![(" ", vec!["ok"])]);
        assert!(matches!(result, Err(CatalogError::BlankLabel)));
    }

    #[test]
    fn test_from_json_preserves_order() {
        let json = r#"{ "Zeta": ["z"], "Alpha": ["a", "aa"] }"#;
        let catalog = SectionCatalog::from_json_str(json).unwrap();
        let labels: Vec<&str> = catalog.labels().collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
        assert_eq!(catalog.synonyms("Alpha").unwrap().len(), 2);
    }

    #[test]
    fn test_from_json_rejects_empty_list() {
        let json = r#"{ "Alpha": [] }"#;
        let result = SectionCatalog::from_json_str(json);
        assert!(matches!(result, Err(CatalogError::NoSynonyms(_))));

        let result = SectionCatalog::from_json_str("not json");
        assert!(matches!(result, Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let result: Result<SectionCatalog, _> = serde_json::from_str(r#"{ "A": [] }"#);
        assert!(result.is_err());

        let catalog: SectionCatalog = serde_json::from_str(r#"{ "A": ["x"] }"#).unwrap();
        assert!(catalog.contains("A"));
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        let catalog = SectionCatalog::sds_default();
        std::fs::write(&path, catalog.to_json_pretty().unwrap()).unwrap();

        let loaded = SectionCatalog::load(Some(&path)).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = SectionCatalog::from_json_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_load_from_data_dir() {
        let dir = TempDir::new().unwrap();

        let catalog = SectionCatalog::load_from(None, dir.path()).unwrap();
        assert_eq!(catalog, SectionCatalog::sds_default());

        std::fs::write(dir.path().join(CATALOG_FILE_NAME), r#"{ "X": ["nomatch"] }"#).unwrap();
        let catalog = SectionCatalog::load_from(None, dir.path()).unwrap();
        assert_eq!(catalog.labels().collect::<Vec<_>>(), vec!["X"]);

        let explicit = dir.path().join("explicit.json");
        std::fs::write(&explicit, r#"{ "Y": ["y"] }"#).unwrap();
        let catalog = SectionCatalog::load_from(Some(&explicit), dir.path()).unwrap();
        assert!(catalog.contains("Y"));
        assert!(!catalog.contains("X"));

        std::fs::write(dir.path().join(CATALOG_FILE_NAME), r#"{ "X": [] }"#).unwrap();
        assert!(matches!(
            SectionCatalog::load_from(None, dir.path()),
            Err(CatalogError::NoSynonyms(_))
        ));
    }
}
