// tests/integration/artifacts.rs

use std::collections::BTreeMap;
use std::io::Write;

use serde_json::json;
use tempfile::NamedTempFile;
use taskgraph::dag::{load_task_graph, task_graph_from_json};
use taskgraph::errors::TaskgraphError;

fn task_graph_json() -> String {
    json!({
        "docker-image": {
            "label": "docker-image",
            "attributes": {"kind": "docker-image"},
            "dependencies": {},
            "task": {"payload": {"image": "builder"}}
        },
        "build-linux": {
            "label": "build-linux",
            "attributes": {"kind": "build"},
            "dependencies": {"docker-image": "docker-image", "toolchain": "cached-toolchain"},
            "task": {"payload": {"command": "build"}}
        }
    })
    .to_string()
}

#[test]
fn keys_are_task_ids_without_a_mapping() {
    let graph = task_graph_from_json(&task_graph_json(), None).unwrap();

    assert_eq!(graph.len(), 2);
    let build = graph.get("build-linux").unwrap();
    assert_eq!(build.label, "build-linux");
    assert_eq!(build.attributes["kind"], "build");
    assert_eq!(build.definition["payload"]["command"], "build");
    assert_eq!(
        graph.graph().dependencies_of("build-linux"),
        ["docker-image".to_string()]
    );
    assert_eq!(
        graph.external_dependencies_of("build-linux"),
        vec!["cached-toolchain"]
    );
}

#[test]
fn labels_are_translated_through_the_mapping() {
    let mapping: BTreeMap<String, String> = [
        ("docker-image".to_string(), "tid-image".to_string()),
        ("build-linux".to_string(), "tid-build".to_string()),
        ("cached-toolchain".to_string(), "tid-toolchain".to_string()),
    ]
    .into_iter()
    .collect();

    let graph = task_graph_from_json(&task_graph_json(), Some(&mapping)).unwrap();

    let build = graph.get("tid-build").unwrap();
    assert_eq!(build.label, "build-linux");
    assert_eq!(build.dependencies["docker-image"], "tid-image");
    assert_eq!(build.dependencies["toolchain"], "tid-toolchain");
    assert_eq!(
        graph.graph().dependencies_of("tid-build"),
        ["tid-image".to_string()]
    );
    assert_eq!(graph.external_dependencies_of("tid-build"), vec!["tid-toolchain"]);
}

#[test]
fn missing_label_in_mapping_is_an_error() {
    let mapping: BTreeMap<String, String> =
        [("docker-image".to_string(), "tid-image".to_string())]
            .into_iter()
            .collect();

    match task_graph_from_json(&task_graph_json(), Some(&mapping)) {
        Err(TaskgraphError::InvalidGraph(msg)) => assert!(msg.contains("build-linux")),
        other => panic!("expected InvalidGraph, got {other:?}"),
    }
}

#[test]
fn explicit_task_id_overrides_the_key() {
    let contents = json!({
        "lint": {"label": "lint", "task": {}, "task_id": "tid-lint"},
        "test": {"label": "test", "task": {}, "dependencies": {"lint": "lint"}}
    })
    .to_string();

    let graph = task_graph_from_json(&contents, None).unwrap();

    assert!(graph.get("tid-lint").is_some());
    assert_eq!(graph.graph().dependencies_of("test"), ["tid-lint".to_string()]);
}

#[test]
fn files_are_loaded_from_disk() {
    let mut graph_file = NamedTempFile::new().unwrap();
    write!(graph_file, "{}", task_graph_json()).unwrap();

    let mut mapping_file = NamedTempFile::new().unwrap();
    write!(
        mapping_file,
        "{}",
        json!({"docker-image": "tid-image", "build-linux": "tid-build"})
    )
    .unwrap();

    let graph = load_task_graph(graph_file.path(), Some(mapping_file.path())).unwrap();
    let order = graph.graph().postorder().unwrap();
    assert_eq!(order, vec!["tid-image".to_string(), "tid-build".to_string()]);
}

#[test]
fn malformed_json_returns_json_error() {
    let mut graph_file = NamedTempFile::new().unwrap();
    write!(graph_file, "{{ not json").unwrap();

    assert!(matches!(
        load_task_graph(graph_file.path(), None),
        Err(TaskgraphError::JsonError(_))
    ));
}
