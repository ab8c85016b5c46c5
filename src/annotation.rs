//! Parsing of brat standoff annotation files (`.ann`).
//!
//! Each line has the shape `<id>\t<label> [<start> <end>]\t<text>`. Lines
//! with fewer than three tab-separated fields (relations, attributes,
//! comments, junk) are skipped without failing the parse.

use std::fs;
use std::path::Path;

use crate::error::AnalysisError;

/// Character offsets of an annotated span in the companion document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One annotated argument component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub id: String,
    /// Argument-component category, e.g. `Claim`, `Premise`, `MajorClaim`.
    pub label: String,
    /// Present only when both offsets are given and numeric.
    pub span: Option<Span>,
    pub text: String,
}

/// Parses a single annotation line. Returns `None` for lines that do not
/// carry at least an id, a label and a text field.
pub fn parse_line(line: &str) -> Option<AnnotationRecord> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() < 3 {
        return None;
    }

    let mut type_info = fields[1].split_whitespace();
    let label = type_info.next()?;
    let start = type_info.next().and_then(|t| t.parse::<usize>().ok());
    let end = type_info.next().and_then(|t| t.parse::<usize>().ok());
    let span = match (start, end) {
        (Some(start), Some(end)) => Some(Span { start, end }),
        _ => None,
    };

    Some(AnnotationRecord {
        id: fields[0].to_string(),
        label: label.to_string(),
        span,
        text: fields[2].to_string(),
    })
}

/// Parses the content of an annotation file, keeping line order.
pub fn parse_annotations(content: &str) -> Vec<AnnotationRecord> {
    content.lines().filter_map(parse_line).collect()
}

/// Reads and parses an annotation file.
///
/// Fails only when the file cannot be read; malformed content is skipped.
pub fn load_annotations(path: &Path) -> Result<Vec<AnnotationRecord>, AnalysisError> {
    let content = fs::read_to_string(path).map_err(|e| AnalysisError::file_access(path, e))?;
    let records = parse_annotations(&content);
    log::debug!("{}: {} annotations", path.display(), records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_with_offsets() {
        let rec = parse_line("T1\tClaim 5 20\tSome text").unwrap();
        assert_eq!(
            rec,
            AnnotationRecord {
                id: "T1".to_string(),
                label: "Claim".to_string(),
                span: Some(Span { start: 5, end: 20 }),
                text: "Some text".to_string(),
            }
        );
    }

    #[test]
    fn offsets_are_optional() {
        let rec = parse_line("T7\tPremise\tno offsets here").unwrap();
        assert_eq!(rec.label, "Premise");
        assert_eq!(rec.span, None);
        assert_eq!(rec.text, "no offsets here");

        // a discontinuous brat span does not parse as a plain pair
        let rec = parse_line("T8\tPremise 3 9;12 20\tsplit span").unwrap();
        assert_eq!(rec.span, None);
    }

    #[test]
    fn skips_short_and_empty_lines() {
        assert!(parse_line("bad line no tabs").is_none());
        assert!(parse_line("A1\tStance T1 For").is_none());
        assert!(parse_line("").is_none());
        // empty type field has no label
        assert!(parse_line("T1\t\ttext").is_none());
    }

    #[test]
    fn keeps_line_order_and_skips_malformed() {
        let content = "T1\tMajorClaim 0 10\tfirst\nbad line no tabs\nT2\tClaim 11 20\tsecond\n";
        let records = parse_annotations(content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "T1");
        assert_eq!(records[1].id, "T2");
        assert_eq!(records[1].text, "second");
    }

    #[test]
    fn trailing_whitespace_and_crlf_are_trimmed() {
        let records = parse_annotations("T1\tClaim 1 4\tabc \r\nT2\tPremise 5 9\tdefg\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "abc");
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_lines_with_fewer_than_three_fields_are_skipped(
                head in "[^\t\r\n]{0,20}",
                tail in proptest::option::of("[^\t\r\n]{0,20}"),
            ) {
                let line = match tail {
                    Some(t) => format!("{head}\t{t}"),
                    None => head,
                };
                prop_assert!(parse_line(&line).is_none());
            }

            #[test]
            fn prop_malformed_lines_do_not_affect_valid_ones(
                junk in proptest::collection::vec("[^\t\r\n]{0,15}", 0..5),
            ) {
                let mut content = String::from("T1\tClaim 0 4\tabcd\n");
                for j in &junk {
                    content.push_str(j);
                    content.push('\n');
                }
                content.push_str("T2\tPremise 5 8\txyz\n");
                let records = parse_annotations(&content);
                prop_assert_eq!(records.len(), 2);
                prop_assert_eq!(records[0].id.as_str(), "T1");
                prop_assert_eq!(records[1].id.as_str(), "T2");
            }
        }
    }
}
