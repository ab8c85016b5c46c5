//! Writes the aggregated table and its summaries to TXT, CSV, TSV or JSON.
//!
//! Files are named `<stem>_<YYYYMMDD_HHMMSS>_<sheet>.<ext>`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::aggregate::{AggregatedTable, Row, TableKind};
use crate::enrich::{Payload, TopicCategory};
use crate::error::AnalysisError;
use crate::report::{CrossTab, entity_type_counts, label_pmi, sentiment_by_group, topic_distribution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

/// Neutralizes spreadsheet formulas: text starting with `=`, `+`, `-` or `@`
/// gets a leading `'`.
pub fn csv_safe_cell(s: &str) -> String {
    if s.starts_with(&['=', '+', '-', '@'][..]) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Int(usize),
    Float(f64),
    Empty,
}

impl Cell {
    fn plain(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Empty => String::new(),
        }
    }

    fn json(&self) -> Json {
        match self {
            Cell::Text(s) => Json::String(s.clone()),
            Cell::Int(n) => Json::from(*n),
            // NaN and infinities have no JSON form
            Cell::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Cell::Empty => Json::Null,
        }
    }
}

struct Sheet {
    name: &'static str,
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &'static str, header: &[&str]) -> Self {
        Self {
            name,
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// One row of the table as a flat JSON object, with the same keys as the
/// rows sheet columns.
#[derive(Serialize)]
struct RowRecord<'a> {
    essay: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<TopicCategory>,
    label: &'a str,
    #[serde(flatten)]
    value: RowValue<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RowValue<'a> {
    Entity {
        entity: &'a str,
        #[serde(rename = "type")]
        kind: &'a str,
    },
    Sentiment {
        sentiment: f64,
    },
    Topic {
        category: TopicCategory,
    },
}

impl<'a> From<&'a Row> for RowRecord<'a> {
    fn from(row: &'a Row) -> Self {
        let value = match &row.payload {
            Payload::Entity(e) => RowValue::Entity {
                entity: &e.text,
                kind: &e.kind,
            },
            Payload::Sentiment(s) => RowValue::Sentiment { sentiment: *s },
            Payload::Topic(t) => RowValue::Topic { category: *t },
        };
        RowRecord {
            essay: &row.essay,
            topic: row.topic,
            label: &row.label,
            value,
        }
    }
}

fn write_rows_json(table: &AggregatedTable, path: &Path) -> Result<(), AnalysisError> {
    let export_err = |message: String| AnalysisError::Export {
        path: path.to_path_buf(),
        message,
    };
    let records: Vec<RowRecord> = table.rows.iter().map(RowRecord::from).collect();
    let file = File::create(path).map_err(|e| export_err(e.to_string()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &records).map_err(|e| export_err(e.to_string()))?;
    out.flush().map_err(|e| export_err(e.to_string()))
}

fn rows_sheet(table: &AggregatedTable) -> Sheet {
    let mut header = vec!["essay"];
    if table.with_topic {
        header.push("topic");
    }
    header.push("label");
    match table.kind {
        TableKind::Entities => header.extend(["entity", "type"]),
        TableKind::Sentiment => header.push("sentiment"),
        TableKind::Topics => header.push("category"),
    }

    let mut sheet = Sheet::new("rows", &header);
    for row in &table.rows {
        let mut cells = vec![Cell::Text(row.essay.clone())];
        if table.with_topic {
            cells.push(match row.topic {
                Some(t) => Cell::Text(t.to_string()),
                None => Cell::Empty,
            });
        }
        cells.push(Cell::Text(row.label.clone()));
        match &row.payload {
            Payload::Entity(e) => {
                cells.push(Cell::Text(e.text.clone()));
                cells.push(Cell::Text(e.kind.clone()));
            }
            Payload::Sentiment(s) => cells.push(Cell::Float(*s)),
            Payload::Topic(t) => cells.push(Cell::Text(t.to_string())),
        }
        sheet.rows.push(cells);
    }
    sheet
}

fn summary_sheets(table: &AggregatedTable) -> Vec<Sheet> {
    let mut sheets = Vec::new();
    match table.kind {
        TableKind::Entities => {
            let mut types = Sheet::new("types", &["item", "count"]);
            for e in entity_type_counts(table) {
                types.rows.push(vec![Cell::Text(e.item), Cell::Int(e.count)]);
            }
            sheets.push(types);

            let mut pmi = Sheet::new("pmi", &["entity_type", "label", "count", "pmi"]);
            for p in label_pmi(table) {
                pmi.rows.push(vec![
                    Cell::Text(p.entity_type),
                    Cell::Text(p.label),
                    Cell::Int(p.count),
                    Cell::Float(p.pmi),
                ]);
            }
            sheets.push(pmi);

            let tab = CrossTab::entity_type_by_label(table);
            if !tab.is_empty() {
                let mut header = vec!["entity_type"];
                header.extend(tab.columns.iter().map(String::as_str));
                let mut counts = Sheet::new("crosstab", &header);
                let mut normalized = Sheet::new("crosstab_norm", &header);
                let norm = tab.normalized_by_column();
                for (i, kind) in tab.rows.iter().enumerate() {
                    let mut row = vec![Cell::Text(kind.clone())];
                    row.extend(tab.counts[i].iter().map(|&c| Cell::Int(c)));
                    counts.rows.push(row);

                    let mut row = vec![Cell::Text(kind.clone())];
                    row.extend(norm[i].iter().map(|&v| Cell::Float(v)));
                    normalized.rows.push(row);
                }
                sheets.push(counts);
                sheets.push(normalized);
            }

            let by_topic = CrossTab::entity_type_by_topic(table);
            if !by_topic.is_empty() {
                let mut header = vec!["entity_type"];
                header.extend(by_topic.columns.iter().map(String::as_str));
                let mut sheet = Sheet::new("crosstab_topic", &header);
                for (kind, counts) in by_topic.rows.iter().zip(&by_topic.counts) {
                    let mut row = vec![Cell::Text(kind.clone())];
                    row.extend(counts.iter().map(|&c| Cell::Int(c)));
                    sheet.rows.push(row);
                }
                sheets.push(sheet);
            }
        }
        TableKind::Sentiment => {
            let mut stats = Sheet::new(
                "sentiment",
                &["group", "count", "mean", "std_dev", "min", "max"],
            );
            for s in sentiment_by_group(table) {
                stats.rows.push(vec![
                    Cell::Text(s.group),
                    Cell::Int(s.count),
                    Cell::Float(s.mean),
                    Cell::Float(s.std_dev),
                    Cell::Float(s.min),
                    Cell::Float(s.max),
                ]);
            }
            sheets.push(stats);
        }
        TableKind::Topics => {}
    }

    if table.kind == TableKind::Topics || table.with_topic {
        let mut topics = Sheet::new("topics", &["item", "count"]);
        for t in topic_distribution(table) {
            topics.rows.push(vec![Cell::Text(t.item), Cell::Int(t.count)]);
        }
        sheets.push(topics);
    }
    sheets
}

fn write_sheet(sheet: &Sheet, path: &Path, format: ExportFormat) -> Result<(), AnalysisError> {
    let export_err = |message: String| AnalysisError::Export {
        path: path.to_path_buf(),
        message,
    };

    match format {
        ExportFormat::Csv | ExportFormat::Tsv => {
            let delimiter = if format == ExportFormat::Tsv { b'\t' } else { b',' };
            let mut writer = csv::WriterBuilder::new()
                .delimiter(delimiter)
                .from_path(path)
                .map_err(|e| export_err(e.to_string()))?;
            writer
                .write_record(&sheet.header)
                .map_err(|e| export_err(e.to_string()))?;
            for row in &sheet.rows {
                let record: Vec<String> = row
                    .iter()
                    .map(|c| match c {
                        Cell::Text(s) => csv_safe_cell(s),
                        other => other.plain(),
                    })
                    .collect();
                writer
                    .write_record(&record)
                    .map_err(|e| export_err(e.to_string()))?;
            }
            writer.flush().map_err(|e| export_err(e.to_string()))?;
        }
        ExportFormat::Json => {
            let items: Vec<Json> = sheet
                .rows
                .iter()
                .map(|row| {
                    let obj: Map<String, Json> = sheet
                        .header
                        .iter()
                        .cloned()
                        .zip(row.iter().map(Cell::json))
                        .collect();
                    Json::Object(obj)
                })
                .collect();
            let file = File::create(path).map_err(|e| export_err(e.to_string()))?;
            let mut out = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut out, &items).map_err(|e| export_err(e.to_string()))?;
            out.flush().map_err(|e| export_err(e.to_string()))?;
        }
        ExportFormat::Txt => {
            let file = File::create(path).map_err(|e| export_err(e.to_string()))?;
            let mut out = BufWriter::new(file);
            let mut text = sheet.header.join("\t");
            text.push('\n');
            for row in &sheet.rows {
                let line: Vec<String> = row.iter().map(Cell::plain).collect();
                text.push_str(&line.join("\t"));
                text.push('\n');
            }
            out.write_all(text.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|e| export_err(e.to_string()))?;
        }
    }
    Ok(())
}

/// Writes the rows table and the summaries matching its kind into `out_dir`
/// (created if missing). Nothing is written for an empty table. Returns the
/// written paths.
pub fn export_table(
    table: &AggregatedTable,
    stem: &str,
    out_dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, AnalysisError> {
    if table.is_empty() {
        log::info!("Nothing to export for {stem}");
        return Ok(Vec::new());
    }
    fs::create_dir_all(out_dir).map_err(|e| AnalysisError::file_access(out_dir, e))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let sheet_path = |name: &str| {
        out_dir.join(format!("{stem}_{timestamp}_{name}.{}", format.extension()))
    };

    let rows_path = sheet_path("rows");
    match format {
        ExportFormat::Json => write_rows_json(table, &rows_path)?,
        _ => write_sheet(&rows_sheet(table), &rows_path, format)?,
    }
    log::debug!("Wrote {}", rows_path.display());
    let mut written = vec![rows_path];

    for sheet in &summary_sheets(table) {
        let path = sheet_path(sheet.name);
        write_sheet(sheet, &path, format)?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Entity;

    fn entities_table() -> AggregatedTable {
        AggregatedTable {
            kind: TableKind::Entities,
            with_topic: true,
            rows: vec![
                Row {
                    essay: "essay01.txt".to_string(),
                    topic: Some(TopicCategory::Politics),
                    label: "Claim".to_string(),
                    payload: Payload::Entity(Entity::new("=SUM(A1)", "ORG")),
                },
                Row {
                    essay: "essay01.txt".to_string(),
                    topic: Some(TopicCategory::Politics),
                    label: "Premise".to_string(),
                    payload: Payload::Entity(Entity::new("Alice", "PERSON")),
                },
            ],
        }
    }

    #[test]
    fn csv_safe_cell_prefixes_formulas() {
        assert_eq!(csv_safe_cell("=1+1"), "'=1+1");
        assert_eq!(csv_safe_cell("-3"), "'-3");
        assert_eq!(csv_safe_cell("@cmd"), "'@cmd");
        assert_eq!(csv_safe_cell("Alice"), "Alice");
    }

    #[test]
    fn writes_rows_and_summaries_as_csv() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_table(&entities_table(), "entities", dir.path(), ExportFormat::Csv).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        for suffix in [
            "_rows.csv",
            "_types.csv",
            "_pmi.csv",
            "_crosstab.csv",
            "_crosstab_norm.csv",
            "_crosstab_topic.csv",
            "_topics.csv",
        ] {
            assert!(
                names.iter().any(|n| n.starts_with("entities_") && n.ends_with(suffix)),
                "missing {suffix} in {names:?}"
            );
        }

        let rows_path = written.iter().find(|p| p.to_string_lossy().ends_with("_rows.csv")).unwrap();
        let content = fs::read_to_string(rows_path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("essay,topic,label,entity,type"));
        assert_eq!(lines.next(), Some("essay01.txt,Politics,Claim,'=SUM(A1),ORG"));
        assert_eq!(lines.next(), Some("essay01.txt,Politics,Premise,Alice,PERSON"));
    }

    #[test]
    fn json_keeps_numbers_typed() {
        let dir = tempfile::tempdir().unwrap();
        let table = AggregatedTable {
            kind: TableKind::Sentiment,
            with_topic: false,
            rows: vec![Row {
                essay: "e.txt".to_string(),
                topic: None,
                label: "Claim".to_string(),
                payload: Payload::Sentiment(-0.25),
            }],
        };
        let written = export_table(&table, "sentiment", dir.path(), ExportFormat::Json).unwrap();
        assert_eq!(written.len(), 2);

        let rows: Json = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(rows[0]["essay"], "e.txt");
        assert_eq!(rows[0]["label"], "Claim");
        assert_eq!(rows[0]["sentiment"], -0.25);
        assert!(rows[0].get("topic").is_none());

        let stats: Json = serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert_eq!(stats[0]["group"], "Claim");
        assert_eq!(stats[0]["count"], 1);
    }

    #[test]
    fn json_rows_use_column_keys_and_topic_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = entities_table();
        table.rows[1].topic = Some(TopicCategory::SocialIssues);
        let written = export_table(&table, "entities", dir.path(), ExportFormat::Json).unwrap();
        assert!(written[0].to_string_lossy().ends_with("_rows.json"));

        let rows: Json = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(
            rows[1],
            serde_json::json!({
                "essay": "essay01.txt",
                "topic": "Social Issues",
                "label": "Premise",
                "entity": "Alice",
                "type": "PERSON",
            })
        );

        let topics = AggregatedTable {
            kind: TableKind::Topics,
            with_topic: false,
            rows: vec![Row {
                essay: "e.txt".to_string(),
                topic: None,
                label: "Claim".to_string(),
                payload: Payload::Topic(TopicCategory::EconomicIssues),
            }],
        };
        let written = export_table(&topics, "topics", dir.path(), ExportFormat::Json).unwrap();
        let rows: Json = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(
            rows[0],
            serde_json::json!({"essay": "e.txt", "label": "Claim", "category": "Economic Issues"})
        );
    }

    #[test]
    fn crosstab_topic_counts_types_per_document_topic() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_table(&entities_table(), "entities", dir.path(), ExportFormat::Tsv).unwrap();
        let path = written
            .iter()
            .find(|p| p.to_string_lossy().ends_with("_crosstab_topic.tsv"))
            .unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["entity_type\tPolitics", "ORG\t1", "PERSON\t1"]);
    }

    #[test]
    fn empty_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let table = AggregatedTable {
            kind: TableKind::Topics,
            with_topic: false,
            rows: Vec::new(),
        };
        let written = export_table(&table, "topics", dir.path(), ExportFormat::Tsv).unwrap();
        assert!(written.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
