//! Summaries computed from an [`AggregatedTable`]: entity type counts,
//! type-by-label contingency tables, PMI of type/label pairs, sentiment
//! statistics per group and topic distribution. Also renders the stdout
//! summary.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;

use crate::aggregate::{AggregatedTable, Row, TableKind};
use crate::enrich::{Payload, TopicCategory};

#[derive(Debug, Clone, PartialEq)]
pub struct CountEntry {
    pub item: String,
    pub count: usize,
}

/// Association of an entity type with an argument label.
#[derive(Debug, Clone, PartialEq)]
pub struct PmiEntry {
    pub entity_type: String,
    pub label: String,
    pub count: usize,
    pub pmi: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentStats {
    /// Label, or `topic / label` when the table carries topics.
    pub group: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Counts with one row per entity type and one column per label or topic.
/// Rows and columns are sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn entity_type_by_label(table: &AggregatedTable) -> Self {
        Self::entity_type_by(table, |row| Some(row.label.clone()))
    }

    /// Columns are document topics; rows without a topic are left out.
    pub fn entity_type_by_topic(table: &AggregatedTable) -> Self {
        Self::entity_type_by(table, |row| row.topic.map(|t| t.to_string()))
    }

    fn entity_type_by<F>(table: &AggregatedTable, column: F) -> Self
    where
        F: Fn(&Row) -> Option<String>,
    {
        let mut cells: BTreeMap<(String, String), usize> = BTreeMap::new();
        let mut rows: BTreeSet<String> = BTreeSet::new();
        let mut columns: BTreeSet<String> = BTreeSet::new();
        for row in &table.rows {
            if let (Some(kind), Some(col)) = (row.entity_type(), column(row)) {
                rows.insert(kind.to_string());
                columns.insert(col.clone());
                *cells.entry((kind.to_string(), col)).or_insert(0) += 1;
            }
        }
        let rows: Vec<String> = rows.into_iter().collect();
        let columns: Vec<String> = columns.into_iter().collect();

        let counts = rows
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| cells.get(&(r.clone(), c.clone())).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            rows,
            columns,
            counts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_totals(&self) -> Vec<usize> {
        (0..self.columns.len())
            .map(|j| self.counts.iter().map(|r| r[j]).sum())
            .collect()
    }

    /// Each cell divided by its column total; empty columns stay 0.
    pub fn normalized_by_column(&self) -> Vec<Vec<f64>> {
        let totals = self.column_totals();
        self.counts
            .iter()
            .map(|r| {
                r.iter()
                    .zip(&totals)
                    .map(|(&c, &t)| if t == 0 { 0.0 } else { c as f64 / t as f64 })
                    .collect()
            })
            .collect()
    }
}

fn sorted_counts(map: HashMap<String, usize>) -> Vec<CountEntry> {
    let mut out: Vec<CountEntry> = map
        .into_iter()
        .map(|(item, count)| CountEntry { item, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item)));
    out
}

/// Rows per entity type, most frequent first, ties by name.
pub fn entity_type_counts(table: &AggregatedTable) -> Vec<CountEntry> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for kind in table.rows.iter().filter_map(|r| r.entity_type()) {
        *map.entry(kind.to_string()).or_insert(0) += 1;
    }
    sorted_counts(map)
}

/// Rows per topic category. Uses the topic payload for topic tables and the
/// document topic column otherwise.
pub fn topic_distribution(table: &AggregatedTable) -> Vec<CountEntry> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for row in &table.rows {
        let topic: Option<TopicCategory> = match row.payload {
            Payload::Topic(t) => Some(t),
            _ => row.topic,
        };
        if let Some(t) = topic {
            *map.entry(t.to_string()).or_insert(0) += 1;
        }
    }
    sorted_counts(map)
}

/// PMI(type, label) = log2(p(type, label) / (p(type) * p(label))) over the
/// entity rows. Sorted by count desc, then PMI desc, then names.
pub fn label_pmi(table: &AggregatedTable) -> Vec<PmiEntry> {
    let mut joint: HashMap<(&str, &str), usize> = HashMap::new();
    let mut by_type: HashMap<&str, usize> = HashMap::new();
    let mut by_label: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;

    for row in &table.rows {
        if let Some(kind) = row.entity_type() {
            *joint.entry((kind, row.label.as_str())).or_insert(0) += 1;
            *by_type.entry(kind).or_insert(0) += 1;
            *by_label.entry(row.label.as_str()).or_insert(0) += 1;
            total += 1;
        }
    }
    if total == 0 {
        return Vec::new();
    }

    let n = total as f64;
    let mut out: Vec<PmiEntry> = joint
        .into_iter()
        .map(|((kind, label), count)| {
            let p_joint = count as f64 / n;
            let p_type = by_type[kind] as f64 / n;
            let p_label = by_label[label] as f64 / n;
            PmiEntry {
                entity_type: kind.to_string(),
                label: label.to_string(),
                count,
                pmi: (p_joint / (p_type * p_label)).log2(),
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.pmi.partial_cmp(&a.pmi).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.entity_type.cmp(&b.entity_type))
            .then_with(|| a.label.cmp(&b.label))
    });
    out
}

/// Sentiment statistics per label, or per topic and label when the table
/// has a topic column. Groups are sorted by name.
pub fn sentiment_by_group(table: &AggregatedTable) -> Vec<SentimentStats> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        if let Some(score) = row.sentiment() {
            let key = match row.topic {
                Some(topic) => format!("{topic} / {}", row.label),
                None => row.label.clone(),
            };
            groups.entry(key).or_default().push(score);
        }
    }

    groups
        .into_iter()
        .map(|(group, values)| {
            let count = values.len();
            let mean = values.iter().sum::<f64>() / count as f64;
            // sample standard deviation, 0 for a single value
            let std_dev = if count > 1 {
                (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64)
                    .sqrt()
            } else {
                0.0
            };
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            SentimentStats {
                group,
                count,
                mean,
                std_dev,
                min,
                max,
            }
        })
        .collect()
}

/// Notice printed instead of a summary when the table has no rows.
pub fn empty_notice(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Entities => "No named entities found in the dataset.",
        TableKind::Sentiment => "No annotations found to score in the dataset.",
        TableKind::Topics => "No annotations found to categorize in the dataset.",
    }
}

/// Human-readable summary, `top` entries per section.
pub fn summary(table: &AggregatedTable, top: usize) -> String {
    if table.is_empty() {
        return empty_notice(table.kind).to_string();
    }

    let mut out = String::new();
    let essays = {
        let mut seen: Vec<&str> = table.rows.iter().map(|r| r.essay.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    };
    let _ = writeln!(out, "{} rows from {} essays", table.len(), essays);

    match table.kind {
        TableKind::Entities => {
            let _ = writeln!(out, "\nTop {top} entity types:");
            for e in entity_type_counts(table).iter().take(top) {
                let _ = writeln!(out, "  {}\t{}", e.item, e.count);
            }

            let _ = writeln!(out, "\nTop {top} PMI (by count, then PMI):");
            for p in label_pmi(table).iter().take(top) {
                let _ = writeln!(
                    out,
                    "  ({}, {})  count={}  PMI={:.3}",
                    p.entity_type, p.label, p.count, p.pmi
                );
            }

            let mut entities: HashMap<String, usize> = HashMap::new();
            for row in &table.rows {
                if let Payload::Entity(e) = &row.payload {
                    *entities.entry(format!("{} ({})", e.text, e.kind)).or_insert(0) += 1;
                }
            }
            let _ = writeln!(out, "\nTop {top} entities:");
            for e in sorted_counts(entities).iter().take(top) {
                let _ = writeln!(out, "  {}\t{}", e.item, e.count);
            }

            let by_topic = CrossTab::entity_type_by_topic(table);
            if !by_topic.is_empty() {
                let _ = writeln!(out, "\nEntity types by topic:");
                let _ = writeln!(out, "  type\t{}", by_topic.columns.join("\t"));
                for (kind, counts) in by_topic.rows.iter().zip(&by_topic.counts) {
                    let cells: Vec<String> = counts.iter().map(usize::to_string).collect();
                    let _ = writeln!(out, "  {}\t{}", kind, cells.join("\t"));
                }
            }
        }
        TableKind::Sentiment => {
            let _ = writeln!(out, "\nSentiment by group:");
            for s in sentiment_by_group(table) {
                let _ = writeln!(
                    out,
                    "  {}\tn={}  mean={:.3}  sd={:.3}  min={:.3}  max={:.3}",
                    s.group, s.count, s.mean, s.std_dev, s.min, s.max
                );
            }
        }
        TableKind::Topics => {}
    }

    if table.kind == TableKind::Topics || table.with_topic {
        let _ = writeln!(out, "\nTopics:");
        for t in topic_distribution(table).iter().take(top) {
            let _ = writeln!(out, "  {}\t{}", t.item, t.count);
        }
    }

    out.trim_end().to_string()
}
