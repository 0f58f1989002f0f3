use std::fs;

use serde_json::Value;

use crate::error::BenchError;
use crate::report::{SweepSummary, load, persist, results_file_name};
use crate::test::fake::unique_temp_dir;

fn summary(topology: &str, max: f64) -> SweepSummary {
    SweepSummary {
        max_bandwidth: Some(max),
        min_bandwidth: Some(0.5),
        ptr: vec![Some(1003.21), Some(2004.5), None],
        rtt_min: vec![Some(0.03), None, Some(0.05)],
        rtt_max: vec![Some(0.09), None, Some(0.2)],
        topology: topology.to_string(),
    }
}

#[test]
fn file_name_is_lowercase_with_underscores() {
    assert_eq!(results_file_name("Single Topology"), "single_topology_results.json");
    assert_eq!(results_file_name("Tree Topology"), "tree_topology_results.json");
    assert_eq!(results_file_name("My Big Lab"), "my_big_lab_results.json");
}

#[test]
fn persist_overwrites_instead_of_appending() {
    let dir = unique_temp_dir("overwrite");

    let first = summary("Linear Topology", 9.0);
    let second = summary("Linear Topology", 4.0);
    let p1 = persist(&first, &dir).expect("first write");
    let p2 = persist(&second, &dir).expect("second write");
    assert_eq!(p1, p2);

    let back = load(&p2).expect("load");
    assert_eq!(back, second);

    let entries = fs::read_dir(&dir).unwrap().count();
    assert_eq!(entries, 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn persisted_json_has_exactly_the_summary_fields() {
    let dir = unique_temp_dir("fields");
    let path = persist(&summary("Single Topology", 1.0), &dir).expect("write");

    let raw = fs::read_to_string(&path).expect("read");
    let v: Value = serde_json::from_str(&raw).expect("valid json");
    let obj = v.as_object().expect("object");
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["max_bandwidth", "min_bandwidth", "ptr", "rtt_max", "rtt_min", "topology"]
    );
    assert_eq!(obj["topology"], "Single Topology");
    assert_eq!(obj["ptr"][2], Value::Null);
    assert_eq!(obj["rtt_min"][1], Value::Null);
    assert_eq!(obj["max_bandwidth"].as_f64(), Some(1.0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn write_failure_is_a_persistence_error() {
    let dir = unique_temp_dir("missing").join("does-not-exist");
    let err = persist(&summary("Tree Topology", 1.0), &dir).unwrap_err();
    assert!(matches!(err, BenchError::Persistence { .. }), "{err}");
}
