use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use recwire_codec::{Schema, Value};
use serde::Serialize;

use crate::values::{display_value, value_to_json};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput {
    size: usize,
    hex: String,
}

#[derive(Serialize)]
struct FieldOutput<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    tag: String,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    fields: Vec<FieldOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trailing_bytes: Option<usize>,
}

pub fn print_encoded(wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                size: wire.len(),
                hex: hex::encode(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SIZE", "HEX"])
                .add_row(vec![wire.len().to_string(), hex::encode(wire)]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

/// Print one decoded record. `index` is set for records read from a stream,
/// `trailing` for in-memory input with bytes left after the record.
pub fn print_record(
    schema: &Schema,
    values: &[Value],
    index: Option<usize>,
    trailing: Option<usize>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = RecordOutput {
                index,
                fields: schema
                    .fields()
                    .iter()
                    .zip(values)
                    .map(|(field, value)| FieldOutput {
                        name: &field.name,
                        tag: field.tag.to_string(),
                        value: value_to_json(value),
                    })
                    .collect(),
                trailing_bytes: trailing,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "TYPE", "VALUE"]);
            for (field, value) in schema.fields().iter().zip(values) {
                table.add_row(vec![
                    field.name.to_string(),
                    field.tag.to_string(),
                    display_value(value),
                ]);
            }
            if let Some(index) = index {
                println!("record {index}");
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let parts: Vec<String> = schema
                .fields()
                .iter()
                .zip(values)
                .map(|(field, value)| format!("{}={}", field.name, display_value(value)))
                .collect();
            match index {
                Some(index) => println!("#{index} {}", parts.join(" ")),
                None => println!("{}", parts.join(" ")),
            }
        }
        OutputFormat::Raw => {
            for value in values {
                println!("{}", display_value(value));
            }
        }
    }

    if let Some(trailing) = trailing.filter(|&n| n > 0) {
        tracing::warn!(trailing, "bytes left after record");
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
