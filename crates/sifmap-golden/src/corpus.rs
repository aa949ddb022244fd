//! Test corpus management for golden tests

use crate::{GoldenError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A test case in the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,

    /// Category/group of the test
    pub category: String,

    pub input: TestInput,

    pub expectations: TestExpectations,

    pub metadata: TestMetadata,

    /// Directory the case was loaded from
    #[serde(skip)]
    pub case_dir: PathBuf,
}

/// What to map and with which rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestInput {
    /// Rule document, relative to the case directory
    pub rules: String,

    /// Object type of the mapped element
    pub object: String,

    /// Top-level scope to select from
    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default)]
    pub zone: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default = "default_version")]
    pub version: String,

    /// Record fields; `null` is a field present without a value
    pub record: Map<String, Value>,
}

/// Expected behavior for a test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExpectations {
    /// Whether the mapping should succeed
    pub should_succeed: bool,

    /// Regex the error message must match if should_succeed is false
    pub error_pattern: Option<String>,

    /// Fields to ignore in comparison
    #[serde(default)]
    pub ignore_fields: Vec<String>,

    /// Volatile fields that may change
    #[serde(default)]
    pub volatile_fields: Vec<VolatileFieldSpec>,
}

/// Volatile field to mask before comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatileFieldSpec {
    pub path: String,
    pub pattern: String,
}

/// Metadata about a test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMetadata {
    /// Description of what this tests
    pub description: String,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether this test is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Priority level (lower = higher priority)
    #[serde(default = "default_priority")]
    pub priority: u32,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

fn default_scope() -> String {
    "Default".to_string()
}

fn default_version() -> String {
    "2.0".to_string()
}

impl TestCase {
    /// Absolute location of the case's rule document
    pub fn rules_path(&self) -> PathBuf {
        self.case_dir.join(&self.input.rules)
    }
}

/// Criteria for picking cases out of a discovered corpus
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Category name, or `*` for any
    pub category: Option<String>,
    /// A case matches when it carries any of these tags
    pub tags: Vec<String>,
    pub include_disabled: bool,
}

impl CaseFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn accepts(&self, case: &TestCase) -> bool {
        if !self.include_disabled && !case.metadata.enabled {
            return false;
        }
        if let Some(category) = &self.category {
            if category != "*" && &case.category != category {
                return false;
            }
        }
        self.tags.is_empty() || self.tags.iter().any(|tag| case.metadata.tags.contains(tag))
    }
}

/// Manages the test corpus
pub struct CorpusManager {
    corpus_dir: PathBuf,
}

impl CorpusManager {
    pub fn new(corpus_dir: impl AsRef<Path>) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
        }
    }

    /// Discover all test cases in the corpus
    pub fn discover_tests(&self) -> Result<Vec<TestCase>> {
        let mut tests = Vec::new();

        if !self.corpus_dir.exists() {
            return Ok(tests);
        }

        for entry in WalkDir::new(&self.corpus_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_file() && path.file_name() == Some(std::ffi::OsStr::new("test.json")) {
                match self.load_test_case(path) {
                    Ok(test_case) => tests.push(test_case),
                    Err(e) => {
                        eprintln!("Warning: Failed to load test case {:?}: {}", path, e);
                    }
                }
            }
        }

        tests.sort_by(|a, b| {
            a.metadata
                .priority
                .cmp(&b.metadata.priority)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(tests)
    }

    /// Load a specific test case
    pub fn load_test_case(&self, path: &Path) -> Result<TestCase> {
        let content = fs::read_to_string(path)?;
        let mut test_case: TestCase = serde_json::from_str(&content)?;

        test_case.case_dir = path
            .parent()
            .ok_or_else(|| GoldenError::Corpus(format!("{:?} has no parent directory", path)))?
            .to_path_buf();

        if !test_case.rules_path().is_file() {
            return Err(GoldenError::Corpus(format!(
                "rule document {:?} of '{}' not found",
                test_case.rules_path(),
                test_case.name
            )));
        }

        Ok(test_case)
    }

    /// Keep the cases accepted by `filter`, preserving discovery order
    pub fn select(&self, tests: Vec<TestCase>, filter: &CaseFilter) -> Vec<TestCase> {
        tests.into_iter().filter(|t| filter.accepts(t)).collect()
    }

    /// Create the corpus directory structure
    pub fn init_corpus(&self) -> Result<()> {
        let dirs = ["basic", "scopes", "valuesets", "edge-cases", "regression"];

        for dir in &dirs {
            let path = self.corpus_dir.join(dir);
            fs::create_dir_all(&path)?;
        }

        self.create_sample_test()?;

        Ok(())
    }

    fn create_sample_test(&self) -> Result<()> {
        let test_dir = self.corpus_dir.join("basic/student-name");
        fs::create_dir_all(&test_dir)?;

        fs::write(
            test_dir.join("rules.yaml"),
            "scopes:\n  - id: Default\n    objects:\n      - object: StudentPersonal\n        fields:\n          - { name: FIRSTNAME, rule: \"Name[@Type='04']/FirstName\" }\n          - { name: LASTNAME, rule: \"Name[@Type='04']/LastName\" }\n",
        )?;

        let mut record = Map::new();
        record.insert("FIRSTNAME".to_string(), Value::from("Betty"));
        record.insert("LASTNAME".to_string(), Value::from("Boop"));

        let test_case = TestCase {
            name: "student-name".to_string(),
            category: "basic".to_string(),
            input: TestInput {
                rules: "rules.yaml".to_string(),
                object: "StudentPersonal".to_string(),
                scope: default_scope(),
                zone: None,
                source: None,
                version: default_version(),
                record,
            },
            expectations: TestExpectations {
                should_succeed: true,
                error_pattern: None,
                ignore_fields: vec![],
                volatile_fields: vec![],
            },
            metadata: TestMetadata {
                description: "First and last name of a student".to_string(),
                tags: vec!["basic".to_string(), "smoke".to_string()],
                enabled: true,
                priority: 1,
            },
            case_dir: test_dir.clone(),
        };

        let content = serde_json::to_string_pretty(&test_case)?;
        fs::write(test_dir.join("test.json"), content)?;

        Ok(())
    }

    /// List all test categories
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let mut categories = Vec::new();

        if !self.corpus_dir.exists() {
            return Ok(categories);
        }

        for entry in fs::read_dir(&self.corpus_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                    if name != "snapshots" {
                        categories.push(name.to_string());
                    }
                }
            }
        }

        categories.sort();
        Ok(categories)
    }

    /// Counts of cases per category and tag
    pub fn statistics(&self) -> Result<CorpusStatistics> {
        let mut stats = CorpusStatistics::default();

        for case in self.discover_tests()? {
            stats.total += 1;
            if !case.metadata.enabled {
                stats.disabled += 1;
            }
            *stats.by_category.entry(case.category).or_default() += 1;
            for tag in case.metadata.tags {
                *stats.by_tag.entry(tag).or_default() += 1;
            }
        }

        Ok(stats)
    }
}

#[derive(Debug, Default)]
pub struct CorpusStatistics {
    pub total: usize,
    pub disabled: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_tag: BTreeMap<String, usize>,
}

impl fmt::Display for CorpusStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} case(s), {} disabled", self.total, self.disabled)?;
        for (title, counts) in [("category", &self.by_category), ("tag", &self.by_tag)] {
            if counts.is_empty() {
                continue;
            }
            let listed: Vec<String> = counts.iter().map(|(k, n)| format!("{}={}", k, n)).collect();
            writeln!(f, "by {}: {}", title, listed.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_corpus_manager_init() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());

        manager.init_corpus().unwrap();

        assert!(temp_dir.path().join("basic").exists());
        assert!(temp_dir.path().join("scopes").exists());
        assert!(temp_dir.path().join("basic/student-name/test.json").exists());
        assert!(temp_dir.path().join("basic/student-name/rules.yaml").exists());
        assert_eq!(
            manager.list_categories().unwrap(),
            vec!["basic", "edge-cases", "regression", "scopes", "valuesets"]
        );
    }

    #[test]
    fn test_discover_tests() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());

        manager.init_corpus().unwrap();

        let tests = manager.discover_tests().unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].name, "student-name");
        assert_eq!(tests[0].input.scope, "Default");
        assert!(tests[0].rules_path().ends_with("basic/student-name/rules.yaml"));

        let stats = manager.statistics().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_tag.get("smoke"), Some(&1));
        assert_eq!(
            stats.to_string(),
            "1 case(s), 0 disabled\nby category: basic=1\nby tag: basic=1 smoke=1\n"
        );
    }

    #[test]
    fn test_missing_rules_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());
        manager.init_corpus().unwrap();

        let case_dir = temp_dir.path().join("basic/student-name");
        fs::remove_file(case_dir.join("rules.yaml")).unwrap();
        assert!(manager.load_test_case(&case_dir.join("test.json")).is_err());
    }

    #[test]
    fn test_filters() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());
        manager.init_corpus().unwrap();
        let tests = manager.discover_tests().unwrap();

        let mut other = tests[0].clone();
        other.category = "scopes".to_string();
        other.metadata.enabled = false;
        let all = vec![tests[0].clone(), other];

        let everything = CaseFilter {
            include_disabled: true,
            ..CaseFilter::category("*")
        };
        assert_eq!(manager.select(all.clone(), &everything).len(), 2);
        assert_eq!(manager.select(all.clone(), &CaseFilter::category("scopes")).len(), 0);

        let smoke = CaseFilter {
            tags: vec!["smoke".to_string()],
            include_disabled: true,
            ..Default::default()
        };
        assert_eq!(manager.select(all.clone(), &smoke).len(), 2);
        assert_eq!(manager.select(all, &CaseFilter::default()).len(), 1);
    }
}
