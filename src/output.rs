use crate::record::NormalizedRecord;
use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Sink for `--dump`: every normalized record, before aggregation.
pub enum Writer {
    Stdout(Box<dyn Write>),
    JsonFile(BufWriter<File>, bool), // bool tracks if we've written the opening bracket
    JsonlFile(BufWriter<File>),
    CsvFile(BufWriter<File>, bool), // bool tracks if we've written headers
}

impl Writer {
    pub fn write_batch(&mut self, records: &[NormalizedRecord]) -> Result<()> {
        match self {
            Writer::Stdout(writer) => {
                for r in records {
                    writeln!(
                        writer,
                        "{}|{}|{}={} ({})",
                        r.timestamp, r.device, r.cleaned, r.value, r.rule
                    )?;
                }
            }
            Writer::JsonFile(writer, is_first) => {
                for r in records {
                    if *is_first {
                        write!(writer, "[")?;
                        *is_first = false;
                    } else {
                        write!(writer, ",")?;
                    }
                    let serialized = serde_json::to_string_pretty(r)?;
                    write!(writer, "\n{}", serialized)?;
                }
            }
            Writer::JsonlFile(writer) => {
                for r in records {
                    let serialized = serde_json::to_string(r)?;
                    writeln!(writer, "{}", serialized)?;
                }
            }
            Writer::CsvFile(writer, headers_written) => {
                if !*headers_written {
                    writeln!(writer, "timestamp,device,value,cleaned,rule")?;
                    *headers_written = true;
                }

                for r in records {
                    writeln!(
                        writer,
                        "{},{},{},{},{}",
                        escape_csv_field(&r.timestamp),
                        escape_csv_field(&r.device),
                        r.value,
                        escape_csv_field(&r.cleaned),
                        escape_csv_field(&r.rule)
                    )?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        match self {
            Writer::JsonFile(ref mut writer, is_first) => {
                if is_first {
                    write!(writer, "[")?;
                }
                writeln!(writer, "\n]")?;
                writer.flush()?;
            }
            Writer::JsonlFile(ref mut writer) | Writer::CsvFile(ref mut writer, _) => {
                writer.flush()?;
            }
            Writer::Stdout(ref mut writer) => {
                writer.flush()?;
            }
        }
        Ok(())
    }
}

pub fn create_writer(target: &str) -> Result<Writer> {
    match target {
        "stdout" => Ok(Writer::Stdout(Box::new(io::stdout()))),
        path if path.ends_with(".json") => {
            Ok(Writer::JsonFile(create_file(path)?, true))
        }
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            Ok(Writer::JsonlFile(create_file(path)?))
        }
        path if path.ends_with(".csv") => Ok(Writer::CsvFile(create_file(path)?, false)),
        _ => Err(anyhow!(
            "Unknown dump target: {}. Use 'stdout' or a .json, .jsonl or .csv path",
            target
        )),
    }
}

fn create_file(path: &str) -> Result<BufWriter<File>> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
