//! CLI end-to-end tests.
//!
//! The binary is run against temporary files; the JSON it writes is read
//! back with the library to check the result.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use qxmap_compile::{Architecture, RoutingTable};
use qxmap_ir::{Circuit, QubitId, equivalent};

fn qxmap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qxmap"))
        .args(args)
        .env_remove("QXMAP_CONFIG")
        .env_remove("QXMAP_FIXED5_VARIANT")
        .output()
        .expect("failed to run qxmap")
}

fn write_circuit(dir: &Path, circuit: &Circuit) -> String {
    let path = dir.join(format!("{}.json", circuit.name()));
    fs::write(&path, serde_json::to_string(circuit).unwrap()).unwrap();
    path.display().to_string()
}

fn read_circuit(path: &Path) -> Circuit {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn chain() -> Circuit {
    let mut circuit = Circuit::with_lines("chain", 3);
    circuit
        .h(QubitId(0))
        .unwrap()
        .cx(QubitId(0), QubitId(1))
        .unwrap()
        .cx(QubitId(1), QubitId(2))
        .unwrap();
    circuit
}

#[test]
fn test_archs_lists_builtins() {
    let out = qxmap(&["archs"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for arch in Architecture::ALL {
        assert!(stdout.contains(arch.name), "{stdout}");
    }
}

#[test]
fn test_table_writes_readable_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("qx2.cache");
    let out = qxmap(&[
        "table",
        "--arch",
        "qx2",
        "--write-cache",
        cache.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let table = RoutingTable::read_cache(&cache).unwrap();
    assert_eq!(table.graph(), &Architecture::QX2.graph());
}

#[test]
fn test_table_from_graph_file() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("pair.txt");
    fs::write(&graph, "2\n0 1\n0 0\n").unwrap();
    let out = qxmap(&["table", "--graph", graph.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(" 1 4 -"));
}

#[test]
fn test_route_with_placement() {
    let dir = tempfile::tempdir().unwrap();
    let circuit = chain();
    let input = write_circuit(dir.path(), &circuit);
    let output = dir.path().join("routed.json");

    let out = qxmap(&[
        "route",
        "--input",
        &input,
        "--output",
        output.to_str().unwrap(),
        "--arch",
        "qx4",
        "--place",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let routed = read_circuit(&output);
    assert_eq!(routed.num_lines(), 5);
    assert_eq!(routed.cnot_count(), 2);
}

#[test]
fn test_route_without_placement_is_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    let mut circuit = Circuit::with_lines("wide", 5);
    circuit.cx(QubitId(0), QubitId(4)).unwrap();
    let input = write_circuit(dir.path(), &circuit);

    let out = qxmap(&["route", "-i", &input, "--arch", "qx4", "--cleanup"]);
    assert!(out.status.success());
    let routed: Circuit = serde_json::from_slice(&out.stdout).unwrap();
    assert!(equivalent(&routed, &circuit).unwrap());
}

#[test]
fn test_fixed5_variants() {
    let dir = tempfile::tempdir().unwrap();
    let mut circuit = Circuit::with_lines("relay", 5);
    circuit.cx(QubitId(0), QubitId(3)).unwrap();
    let input = write_circuit(dir.path(), &circuit);

    let mut counts = Vec::new();
    for variant in ["swap", "template"] {
        let out = qxmap(&["fixed5", "-i", &input, "-d", "qx2", "--variant", variant]);
        assert!(out.status.success());
        let routed: Circuit = serde_json::from_slice(&out.stdout).unwrap();
        assert!(equivalent(&routed, &circuit).unwrap());
        counts.push(routed.gate_count());
    }
    assert_eq!(counts, vec![15, 10]);
}

#[test]
fn test_route_wider_than_device_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut circuit = Circuit::with_lines("six", 6);
    circuit.cx(QubitId(0), QubitId(3)).unwrap().h(QubitId(5)).unwrap();
    let input = write_circuit(dir.path(), &circuit);

    let out = qxmap(&["route", "-i", &input, "--arch", "qx4"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("routing skipped"));
    let routed: Circuit = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(routed, circuit);
}

#[test]
fn test_missing_input_fails() {
    let out = qxmap(&["route", "-i", "/nonexistent/c.json", "--arch", "qx4"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("File not found"));
}

#[test]
fn test_invalid_circuit_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    fs::write(
        &input,
        r#"{"name": "bad", "num_lines": 2, "gates": [{"kind": {"type": "toffoli"}, "targets": [7]}]}"#,
    )
    .unwrap();
    let out = qxmap(&["route", "-i", input.to_str().unwrap(), "--arch", "qx4"]);
    assert!(!out.status.success());
}

#[test]
fn test_unknown_architecture_fails() {
    let out = qxmap(&["table", "--arch", "qx9"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("qx9"));
}
