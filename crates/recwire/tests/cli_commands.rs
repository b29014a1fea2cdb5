#![cfg(feature = "cli")]

use std::process::{Command, Output};

const SCENARIO_SCHEMA: &str = "bytes,u64,i64,text,bool,bool,f64";
const SCENARIO_VALUES: &str = r#"["some bytes", 1234, -1234, "hello", true, false, 1.23456789]"#;
#[cfg(target_endian = "little")]
const SCENARIO_HEX: &str = "0a00000000000000736f6d65206279746573d2040000000000002efbffffffffffff\
                            050000000000000068656c6c6f01001bde8342cac0f33f";

fn recwire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_recwire"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("recwire should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn encode_hex(schema: &str, values: &str) -> String {
    let output = recwire(&[
        "--format", "pretty", "encode", "--schema", schema, "--values", values,
    ]);
    assert!(output.status.success(), "encode failed: {output:?}");
    stdout(&output)
}

#[test]
#[cfg(target_endian = "little")]
fn encode_scenario_matches_known_bytes() {
    assert_eq!(encode_hex(SCENARIO_SCHEMA, SCENARIO_VALUES), SCENARIO_HEX);

    let output = recwire(&[
        "--format",
        "json",
        "encode",
        "--schema",
        SCENARIO_SCHEMA,
        "--values",
        SCENARIO_VALUES,
    ]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["size"], 57);
    assert_eq!(json["hex"], SCENARIO_HEX);
}

#[test]
fn decode_reverses_encode() {
    let hex = encode_hex(SCENARIO_SCHEMA, SCENARIO_VALUES);
    let output = recwire(&[
        "--format",
        "json",
        "decode",
        "--schema",
        SCENARIO_SCHEMA,
        "--hex",
        &hex,
    ]);
    assert!(output.status.success(), "decode failed: {output:?}");

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let values: Vec<serde_json::Value> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["value"].clone())
        .collect();
    assert_eq!(values[0], serde_json::json!(b"some bytes".to_vec()));
    assert_eq!(values[1], 1234);
    assert_eq!(values[2], -1234);
    assert_eq!(values[3], "hello");
    assert_eq!(values[4], true);
    assert_eq!(values[5], false);
    assert_eq!(values[6], 1.23456789);
    assert_eq!(json["fields"][3]["type"], "text");
    assert_eq!(json["trailing_bytes"], 0);
}

#[test]
fn decode_reads_from_file() {
    let path = std::env::temp_dir().join(format!("recwire-cli-{}.bin", std::process::id()));
    // u64 7 followed by a true flag and one trailing byte.
    std::fs::write(&path, [7, 0, 0, 0, 0, 0, 0, 0, 1, 0xaa]).unwrap();

    let output = recwire(&[
        "--format",
        "pretty",
        "decode",
        "--schema",
        "u64,bool",
        "--file",
        path.to_str().unwrap(),
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success(), "decode failed: {output:?}");
    assert_eq!(stdout(&output), "field0=7 field1=true");
}

#[test]
fn truncated_input_exits_with_data_invalid() {
    let output = recwire(&["decode", "--schema", "u64,text", "--hex", "0700000000000000050000"]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("truncated input while decoding field field1"));
}

#[test]
fn malformed_text_exits_with_data_invalid() {
    let output = recwire(&["decode", "--schema", "text", "--hex", "0200000000000000ffff"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn unknown_type_exits_with_usage() {
    let output = recwire(&["encode", "--schema", "u64,Point3D", "--values", "[1, 2]"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn value_type_mismatch_exits_with_data_invalid() {
    let output = recwire(&["encode", "--schema", "bool", "--values", "[\"yes\"]"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn max_len_rejects_long_text() {
    let output = recwire(&[
        "encode",
        "--schema",
        "text",
        "--max-len",
        "2",
        "--values",
        "[\"abc\"]",
    ]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn raw_encode_writes_bytes() {
    let output = recwire(&[
        "--format", "raw", "encode", "--schema", "bool,bool", "--values", "[true, false]",
    ]);
    assert!(output.status.success());
    assert_eq!(output.stdout, vec![1, 0]);
}

#[test]
fn version_prints_package_version() {
    let output = recwire(&["version"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), format!("recwire {}", env!("CARGO_PKG_VERSION")));

    let extended = recwire(&["version", "--extended"]);
    assert!(stdout(&extended).contains("builtin_types: bytes,"));
}

#[cfg(unix)]
mod listen {
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::path::{Path, PathBuf};
    use std::process::Stdio;
    use std::thread;
    use std::time::{Duration, Instant};

    use recwire::codec::{encode_to_bytes, CodecRegistry, Schema, TypeTag, Value};

    use super::*;

    fn unique_socket_path(tag: &str) -> PathBuf {
        PathBuf::from(format!(
            "/tmp/recwire-{tag}-{}-{}.sock",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ))
    }

    fn connect_with_retry(path: &Path, timeout: Duration) -> UnixStream {
        let start = Instant::now();
        loop {
            if let Ok(stream) = UnixStream::connect(path) {
                return stream;
            }
            if start.elapsed() >= timeout {
                panic!("connect timeout");
            }
            thread::sleep(Duration::from_millis(25));
        }
    }

    #[test]
    fn listen_decodes_records_split_across_writes() {
        let path = unique_socket_path("listen");
        let child = Command::new(env!("CARGO_BIN_EXE_recwire"))
            .args(["--log-level", "error", "--format", "json", "listen"])
            .arg(&path)
            .args(["--schema", "u64,text", "--count", "2", "--chunk-size", "3"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("listen should start");

        let registry = CodecRegistry::new();
        let schema = Schema::from_tags("pair", [TypeTag::UInt, TypeTag::Text]);
        let mut wire = Vec::new();
        for (n, text) in [(1u64, "first"), (2, "second")] {
            let values = [Value::UInt(n), Value::from(text)];
            wire.extend_from_slice(&encode_to_bytes(&registry, &schema, &values).unwrap());
        }

        let mut stream = connect_with_retry(&path, Duration::from_secs(3));
        for piece in wire.chunks(5) {
            stream.write_all(piece).unwrap();
            stream.flush().unwrap();
        }
        drop(stream);

        let output = child.wait_with_output().expect("listen should exit");
        assert!(output.status.success(), "listen failed: {output:?}");

        let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["index"], 0);
        assert_eq!(lines[0]["fields"][1]["value"], "first");
        assert_eq!(lines[1]["index"], 1);
        assert_eq!(lines[1]["fields"][0]["value"], 2);
        assert!(!path.exists(), "socket file should be removed on exit");
    }
}
