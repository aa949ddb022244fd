// Tests for output formatting
//
// Human output is checked line by line; machine formats are parsed back.

use super::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Writer that keeps everything written for inspection
#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, Capture) {
    let capture = Capture::default();
    let output = OutputWriter::with_writer(format, false, quiet, Box::new(capture.clone()));
    (output, capture)
}

fn summary() -> ValidationSummary {
    ValidationSummary {
        file: "rules.yaml".to_string(),
        scopes: vec![
            ScopeSummary {
                id: "Default".to_string(),
                depth: 0,
                zones: None,
                sources: None,
                versions: None,
                rule_sets: vec![RuleSetSummary {
                    object_type: "StudentPersonal".to_string(),
                    rules: 3,
                    fields: vec!["FIRSTNAME".to_string(), "LASTNAME".to_string()],
                }],
                value_sets: vec!["Gender".to_string()],
            },
            ScopeSummary {
                id: "MA".to_string(),
                depth: 1,
                zones: Some(vec!["MA_ZONE".to_string(), "MA_TEST".to_string()]),
                sources: None,
                versions: Some(vec!["1.5r1".to_string()]),
                rule_sets: vec![RuleSetSummary {
                    object_type: "StudentPersonal".to_string(),
                    rules: 1,
                    fields: Vec::new(),
                }],
                value_sets: Vec::new(),
            },
        ],
        catalog_entries: 1,
    }
}

#[test]
fn test_validation_summary_human() {
    let formatted = format_validation_summary_human(&summary());
    let lines: Vec<&str> = formatted.lines().collect();

    assert_eq!(
        lines[0],
        "✅ rules.yaml: 2 scope(s), 4 field rule(s), 1 catalog entry"
    );
    assert!(lines.contains(&"  Default [zones: *] [sources: *] [versions: *]"));
    assert!(lines.contains(&"    StudentPersonal: 3 rule(s)"));
    assert!(lines.contains(&"      • FIRSTNAME"));
    assert!(lines.contains(&"    value sets: Gender"));
    assert!(lines.contains(&"    MA [zones: MA_ZONE,MA_TEST] [sources: *] [versions: 1.5r1]"));
}

#[test]
fn test_validation_summary_json_omits_empty_fields() {
    let json = OutputFormat::Json.format_validation_summary(&summary()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["scopes"][0]["rule_sets"][0]["fields"][1], "LASTNAME");
    assert!(value["scopes"][0].get("zones").is_none());
    assert!(value["scopes"][1]["rule_sets"][0].get("fields").is_none());
    assert_eq!(value["scopes"][1]["versions"][0], "1.5r1");
}

#[test]
fn test_record_human_aligns_names() {
    let mut fields = BTreeMap::new();
    fields.insert("FIRSTNAME".to_string(), Some("Betty".to_string()));
    fields.insert("SEX".to_string(), None);
    let record = MappedRecord {
        object: "StudentPersonal".to_string(),
        scope: "Default".to_string(),
        version: "2.0".to_string(),
        fields,
    };

    assert_eq!(
        format_record_human(&record),
        "StudentPersonal (scope Default, SIF 2.0)\n  FIRSTNAME = Betty\n  SEX       = (null)\n"
    );

    let yaml = OutputFormat::Yaml.format_record(&record).unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(value["fields"]["FIRSTNAME"], serde_yaml::Value::from("Betty"));
    assert!(value["fields"]["SEX"].is_null());
}

#[test]
fn test_lookup_formats() {
    let lookup = LookupResult {
        valueset: "Gender".to_string(),
        direction: "outbound".to_string(),
        value: "X".to_string(),
        result: None,
    };
    assert_eq!(OutputFormat::Human.format_lookup(&lookup).unwrap(), "(null)");
    assert_eq!(
        OutputFormat::Json.format_lookup(&lookup).unwrap(),
        r#"{"valueset":"Gender","direction":"outbound","value":"X","result":null}"#
    );
}

#[test]
fn test_objects_human_is_raw_xml() {
    let objects = MappedObjects {
        object: "StudentPersonal".to_string(),
        scope: "Default".to_string(),
        version: "2.0".to_string(),
        xml: vec!["<StudentPersonal>".to_string(), "</StudentPersonal>".to_string()],
    };

    let (mut output, capture) = writer(OutputFormat::Human, true);
    output.objects(&objects).unwrap();
    assert_eq!(capture.text(), "<StudentPersonal>\n</StudentPersonal>\n");
}

#[test]
fn test_quiet_suppresses_messages_not_data() {
    let (mut output, capture) = writer(OutputFormat::Human, true);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    output.section("Scopes").unwrap();
    output
        .lookup(&LookupResult {
            valueset: "Gender".to_string(),
            direction: "outbound".to_string(),
            value: "1".to_string(),
            result: Some("M".to_string()),
        })
        .unwrap();

    assert_eq!(capture.text(), "M\n");
}

#[test]
fn test_messages_only_in_human_format() {
    let (mut output, capture) = writer(OutputFormat::Json, false);
    output.info("loading").unwrap();
    output.warning("careful").unwrap();
    assert_eq!(capture.text(), "");

    let (mut output, capture) = writer(OutputFormat::Human, false);
    output.info("loading").unwrap();
    output.warning("careful").unwrap();
    assert_eq!(capture.text(), "INFO: loading\nWARNING: careful\n");
}

#[test]
fn test_table() {
    let (mut output, capture) = writer(OutputFormat::Human, false);
    output
        .table(
            &["App", "SIF"],
            vec![
                vec!["M".to_string(), "Male".to_string()],
                vec!["F".to_string(), "Female".to_string()],
            ],
        )
        .unwrap();

    let text = capture.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "App │ SIF");
    assert_eq!(lines[1], "────┼───────");
    assert_eq!(lines[2], "M   │ Male");
    assert_eq!(lines[3], "F   │ Female");
}

#[test]
fn test_progress_hidden_for_custom_writer() {
    let (output, _) = writer(OutputFormat::Human, false);
    assert!(output.progress_bar(10, "mapping").is_hidden());
}
