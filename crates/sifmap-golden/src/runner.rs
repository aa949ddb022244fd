//! Golden test runner for executing snapshot tests

use crate::{
    corpus::{CaseFilter, CorpusManager, CorpusStatistics, TestCase},
    diff::DiffEngine,
    snapshot::SnapshotManager,
    GoldenConfig, GoldenError, Result,
};
use colored::*;
use regex::Regex;
use serde_json::{json, Map, Value};
use sifmap_core::{Direction, Element, Mappings, SifVersion, StringMapAdaptor};
use std::time::Instant;

/// Result of running a golden test
#[derive(Debug)]
pub struct TestResult {
    pub name: String,

    pub passed: bool,

    pub error: Option<String>,

    /// Diff output if comparison failed
    pub diff: Option<String>,

    pub duration_ms: u64,

    /// Whether the snapshot was created or rewritten
    pub updated: bool,
}

impl TestResult {
    pub fn print(&self, verbose: bool) {
        let status = if self.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("{} {} ({}ms)", status, self.name, self.duration_ms);

        if let Some(ref error) = self.error {
            println!("  {}: {}", "Error".red(), error);
        }

        if verbose || !self.passed {
            if let Some(ref diff) = self.diff {
                println!("{}", diff);
            }
        }

        if self.updated {
            println!("  {}", "Snapshot updated".yellow());
        }
    }
}

/// Outcome of executing one case before it becomes a [`TestResult`]
struct Outcome {
    passed: bool,
    diff: Option<String>,
    updated: bool,
}

pub struct GoldenTestRunner {
    config: GoldenConfig,
    corpus_manager: CorpusManager,
    snapshot_manager: SnapshotManager,
}

impl GoldenTestRunner {
    pub fn new(config: GoldenConfig) -> Self {
        let corpus_manager = CorpusManager::new(&config.corpus_dir);
        let snapshot_manager = SnapshotManager::new(&config.snapshot_dir);

        Self {
            config,
            corpus_manager,
            snapshot_manager,
        }
    }

    /// Run a single test by its `category/case` name
    pub fn run_test(&self, test_name: &str) -> Result<TestResult> {
        let test_path = self.config.corpus_dir.join(test_name).join("test.json");
        let test_case = self.corpus_manager.load_test_case(&test_path)?;

        let test_result = self.run_case(test_name, &test_case);

        if self.config.verbose {
            test_result.print(true);
        }

        if test_result.passed {
            Ok(test_result)
        } else {
            Err(GoldenError::TestFailed(format!(
                "Test '{}' failed: {}",
                test_name,
                test_result.error.as_deref().unwrap_or("Unknown error")
            )))
        }
    }

    /// Run every test whose name or category contains `pattern`
    ///
    /// `*` runs the whole corpus; a trailing `/*` is ignored, so `basic/*`
    /// runs the basic category.
    pub fn run_batch(&self, pattern: &str) -> Result<Vec<TestResult>> {
        let tests = self.corpus_manager.discover_tests()?;
        let pattern = pattern.trim_end_matches("/*");

        let filtered_tests: Vec<_> = self
            .corpus_manager
            .select(tests, &CaseFilter { include_disabled: true, ..Default::default() })
            .into_iter()
            .filter(|t| pattern == "*" || t.name.contains(pattern) || t.category.contains(pattern))
            .collect();

        if filtered_tests.is_empty() {
            return Err(GoldenError::Corpus(format!(
                "No tests found matching pattern '{}'",
                pattern
            )));
        }

        println!("Running {} tests...\n", filtered_tests.len());

        let mut results = Vec::new();
        let mut failed = 0;

        for test_case in &filtered_tests {
            let test_name = format!("{}/{}", test_case.category, test_case.name);
            let result = self.run_case(&test_name, test_case);

            if !result.passed {
                failed += 1;
            }

            result.print(self.config.verbose);
            results.push(result);
        }

        println!("\n{}", "=== Test Summary ===".bold());
        println!(
            "{}: {} passed, {} failed",
            "Results".bold(),
            (results.len() - failed).to_string().green(),
            failed.to_string().red()
        );

        if failed > 0 {
            Err(GoldenError::TestFailed(format!("{} test(s) failed", failed)))
        } else {
            Ok(results)
        }
    }

    fn run_case(&self, test_name: &str, test_case: &TestCase) -> TestResult {
        let start = Instant::now();
        let result = self.execute_test(test_name, test_case);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => TestResult {
                name: test_name.to_string(),
                passed: outcome.passed,
                error: (!outcome.passed).then(|| "Snapshot mismatch".to_string()),
                diff: outcome.diff,
                duration_ms,
                updated: outcome.updated,
            },
            Err(e) => TestResult {
                name: test_name.to_string(),
                passed: false,
                error: Some(e.to_string()),
                diff: None,
                duration_ms,
                updated: false,
            },
        }
    }

    fn execute_test(&self, snapshot_name: &str, test_case: &TestCase) -> Result<Outcome> {
        if !test_case.metadata.enabled {
            return Ok(Outcome {
                passed: true,
                diff: None,
                updated: false,
            });
        }

        if !test_case.expectations.should_succeed {
            return self.expect_failure(test_case);
        }

        let mapped = perform_mapping(test_case)?;

        if !self.snapshot_manager.exists(snapshot_name) {
            if self.config.create_missing || self.config.update_snapshots {
                self.snapshot_manager.create(
                    snapshot_name,
                    mapped,
                    Some(test_case.metadata.description.clone()),
                )?;
                return Ok(Outcome {
                    passed: true,
                    diff: None,
                    updated: true,
                });
            }
            return Err(GoldenError::SnapshotMismatch(format!(
                "Snapshot '{}' does not exist. Run with UPDATE_GOLDEN=1 to create it.",
                snapshot_name
            )));
        }

        let snapshot = self.snapshot_manager.load(snapshot_name)?;

        let mut diff_engine = DiffEngine::new(self.config.diff_options.clone());
        for volatile in &test_case.expectations.volatile_fields {
            diff_engine.add_volatile_pattern(&volatile.path, &volatile.pattern)?;
        }

        let mut ignore_fields = snapshot.ignore_fields.clone();
        ignore_fields.extend(test_case.expectations.ignore_fields.iter().cloned());

        let mut expected = snapshot.content.clone();
        let mut actual = mapped.clone();
        crate::snapshot::apply_ignores(&mut expected, &ignore_fields);
        crate::snapshot::apply_ignores(&mut actual, &ignore_fields);

        let diff_result = diff_engine.compare(&expected, &actual);

        if diff_result.matches {
            Ok(Outcome {
                passed: true,
                diff: None,
                updated: false,
            })
        } else if self.config.update_snapshots {
            self.snapshot_manager.backup(snapshot_name)?;
            self.snapshot_manager.update(snapshot_name, mapped)?;
            Ok(Outcome {
                passed: true,
                diff: Some(diff_result.diff_output),
                updated: true,
            })
        } else {
            Ok(Outcome {
                passed: false,
                diff: Some(diff_result.diff_output),
                updated: false,
            })
        }
    }

    /// A case expected to fail passes when mapping fails with a matching message
    fn expect_failure(&self, test_case: &TestCase) -> Result<Outcome> {
        let message = match perform_mapping(test_case) {
            Ok(_) => {
                return Err(GoldenError::TestFailed(
                    "mapping succeeded but was expected to fail".to_string(),
                ))
            }
            Err(GoldenError::Mapping(e)) => e.to_string(),
            Err(other) => return Err(other),
        };

        if let Some(pattern) = &test_case.expectations.error_pattern {
            let regex = Regex::new(pattern)
                .map_err(|e| GoldenError::Corpus(format!("Invalid error pattern: {}", e)))?;
            if !regex.is_match(&message) {
                return Err(GoldenError::TestFailed(format!(
                    "error '{}' does not match /{}/",
                    message, pattern
                )));
            }
        }

        Ok(Outcome {
            passed: true,
            diff: None,
            updated: false,
        })
    }

    pub fn init_corpus(&self) -> Result<()> {
        self.corpus_manager.init_corpus()
    }

    pub fn list_tests(&self) -> Result<Vec<String>> {
        let tests = self.corpus_manager.discover_tests()?;
        Ok(tests
            .into_iter()
            .map(|t| format!("{}/{}", t.category, t.name))
            .collect())
    }

    pub fn statistics(&self) -> Result<CorpusStatistics> {
        self.corpus_manager.statistics()
    }
}

/// Map the case's record outbound, serialize and reparse the XML, then map
/// it back inbound
///
/// The result is `{"xml": [lines], "record": {name: value}}`.
fn perform_mapping(test_case: &TestCase) -> Result<Value> {
    let input = &test_case.input;

    let mappings = Mappings::load_file(test_case.rules_path())?;
    let top = mappings.find(&input.scope).ok_or_else(|| {
        GoldenError::Corpus(format!("rule document has no scope '{}'", input.scope))
    })?;
    let version: SifVersion = input.version.parse()?;
    let scope = mappings.select(top, input.zone.as_deref(), input.source.as_deref(), Some(version))?;

    let record = record_adaptor(&input.record)?;
    let outbound = mappings.context(scope, &input.object, Direction::Outbound, version)?;
    let mut object = Element::new(input.object.as_str());
    outbound.map_outbound(&mut object, &record)?;
    let xml = object.to_xml()?;

    let inbound = mappings.context(scope, &input.object, Direction::Inbound, version)?;
    let mut mapped_back = StringMapAdaptor::new();
    inbound.map_inbound(&Element::from_xml(&xml)?, &mut mapped_back)?;

    let lines: Vec<Value> = xml
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Value::String(line.to_string()))
        .collect();
    let fields: Map<String, Value> = mapped_back
        .fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.map_or(Value::Null, Value::from)))
        .collect();

    Ok(json!({ "xml": lines, "record": fields }))
}

fn record_adaptor(record: &Map<String, Value>) -> Result<StringMapAdaptor> {
    let mut adaptor = StringMapAdaptor::new();
    for (name, value) in record {
        match value {
            Value::Null => {
                adaptor.insert_null(name.as_str());
            }
            Value::String(text) => {
                adaptor.insert(name.as_str(), text.as_str());
            }
            Value::Bool(_) | Value::Number(_) => {
                adaptor.insert(name.as_str(), value.to_string());
            }
            _ => {
                return Err(GoldenError::Corpus(format!(
                    "record field '{}' must be a string, number, boolean or null",
                    name
                )))
            }
        }
    }
    Ok(adaptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir, update: bool) -> GoldenConfig {
        GoldenConfig {
            corpus_dir: dir.path().to_path_buf(),
            snapshot_dir: dir.path().join("snapshots"),
            update_snapshots: update,
            create_missing: update,
            diff_options: crate::DiffOptions {
                colored: false,
                ..Default::default()
            },
            verbose: false,
        }
    }

    #[test]
    fn test_runner_creates_then_matches_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let runner = GoldenTestRunner::new(config(&temp_dir, false));
        runner.init_corpus().unwrap();

        assert_eq!(runner.list_tests().unwrap(), vec!["basic/student-name"]);
        assert!(runner.run_test("basic/student-name").is_err());

        let updating = GoldenTestRunner::new(config(&temp_dir, true));
        let created = updating.run_test("basic/student-name").unwrap();
        assert!(created.updated);

        let snapshot = SnapshotManager::new(temp_dir.path().join("snapshots"))
            .load("basic/student-name")
            .unwrap();
        assert_eq!(snapshot.content["record"]["FIRSTNAME"], "Betty");
        assert_eq!(snapshot.content["xml"][0], "<StudentPersonal>");

        let result = runner.run_test("basic/student-name").unwrap();
        assert!(result.passed);
        assert!(!result.updated);
    }

    #[test]
    fn test_changed_rules_are_reported() {
        let temp_dir = TempDir::new().unwrap();
        GoldenTestRunner::new(config(&temp_dir, true))
            .run_batch("*")
            .unwrap_err();

        let runner = GoldenTestRunner::new(config(&temp_dir, true));
        runner.init_corpus().unwrap();
        runner.run_batch("basic/*").unwrap();

        let rules = temp_dir.path().join("basic/student-name/rules.yaml");
        let changed = fs::read_to_string(&rules).unwrap().replace("LastName", "Surname");
        fs::write(&rules, changed).unwrap();

        let strict = GoldenTestRunner::new(config(&temp_dir, false));
        let err = strict.run_test("basic/student-name").unwrap_err();
        assert!(err.to_string().contains("Snapshot mismatch"));
    }

    #[test]
    fn test_expected_failure_matches_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let runner = GoldenTestRunner::new(config(&temp_dir, false));
        runner.init_corpus().unwrap();

        let test_path = temp_dir.path().join("basic/student-name/test.json");
        let mut case: Value = serde_json::from_str(&fs::read_to_string(&test_path).unwrap()).unwrap();
        case["input"]["record"]["FIRSTNAME"] = json!(["not", "text"]);
        case["expectations"]["should_succeed"] = json!(false);
        fs::write(&test_path, serde_json::to_string(&case).unwrap()).unwrap();

        // the record is rejected before mapping, which is not a mapping failure
        assert!(runner.run_test("basic/student-name").is_err());

        fs::write(
            temp_dir.path().join("basic/student-name/rules.yaml"),
            "scopes:\n  - id: Default\n    objects:\n      - object: StudentPersonal\n        fields:\n          - { name: FIRSTNAME, rule: \"Name[@Type='04'/FirstName\" }\n",
        )
        .unwrap();
        case["input"]["record"]["FIRSTNAME"] = json!("Betty");
        case["expectations"]["error_pattern"] = json!("Name\\[@Type='04'/FirstName");
        fs::write(&test_path, serde_json::to_string(&case).unwrap()).unwrap();

        assert!(runner.run_test("basic/student-name").unwrap().passed);
    }
}
