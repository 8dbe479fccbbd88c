//! Tolerant Construction File parser.
//!
//! Input arrives as one or more [`Blob`]s (a single cell, a row of cells or a
//! table of cells). Parsing runs in three independent stages:
//!
//! 1. [`normalize`] flattens the blobs into one block of text,
//! 2. [`tokenize_line`] splits each line into tokens,
//! 3. [`classify_line`] turns a token list into a step or a sequence
//!    definition.

use crate::{
    dna_sequence::{is_nucleotide_text, resolve_sequence},
    error::CfError,
};
use cfsim_protocol::{
    ConstructionFile, ConstructionStep, GIBSON_MARKER, LigationProtocol, OperationKind,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref TOKEN_SEPARATORS: Regex = Regex::new(r"[\s,()/]+").unwrap();
    static ref TEMPERATURE: Regex = Regex::new(r"(?i)^\d+(\.\d+)?C?$").unwrap();
    static ref SIZE: Regex = Regex::new(r"(?i)^(\d+)(bp)?$").unwrap();
}

const FILLER_WORDS: [&str; 2] = ["on", "with"];

/// One spreadsheet-like cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// A piece of loosely-typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Blob {
    Table(Vec<Vec<Cell>>),
    Row(Vec<Cell>),
    Scalar(Cell),
}

impl Blob {
    pub fn text(text: &str) -> Self {
        Blob::Scalar(Cell::from(text))
    }

    fn to_text(&self) -> String {
        match self {
            Self::Scalar(cell) => cell.to_string(),
            Self::Row(cells) => join_cells(cells),
            Self::Table(rows) => rows
                .iter()
                .map(|row| join_cells(row))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn join_cells(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("\t")
}

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Step(ConstructionStep),
    Sequence { name: String, sequence: String },
    Blank,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub construction_file: ConstructionFile,
    /// Lines that were neither an operation nor a sequence definition.
    pub skipped: Vec<SkippedLine>,
    /// Sequence names defined more than once; the last definition wins.
    pub redefined: Vec<String>,
}

/// Flattens blobs into one text block: table rows become lines of
/// tab-joined cells, a row becomes one line, a scalar is kept as is.
pub fn normalize(blobs: &[Blob]) -> String {
    blobs
        .iter()
        .map(|b| b.to_text())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tokenize_line(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') || trimmed.starts_with("//") {
        return vec![];
    }
    TOKEN_SEPARATORS
        .split(trimmed)
        .filter(|t| !t.is_empty())
        .filter(|t| !FILLER_WORDS.iter().any(|w| w.eq_ignore_ascii_case(t)))
        .map(|t| t.to_string())
        .collect()
}

/// Classifies one tokenized line; `line` is only used for diagnostics.
pub fn classify_line(line: usize, tokens: &[String]) -> Result<LineKind, CfError> {
    let Some(first) = tokens.first() else {
        return Ok(LineKind::Blank);
    };
    if first.parse::<OperationKind>().is_ok() {
        return parse_step(tokens)
            .map(LineKind::Step)
            .map_err(|e| match e {
                CfError::Parse { message, .. } => CfError::Parse {
                    line,
                    text: tokens.join(" "),
                    message,
                },
                other => other,
            });
    }
    let rest = tokens[1..].join("");
    if is_nucleotide_text(&rest) {
        return Ok(LineKind::Sequence {
            name: first.to_owned(),
            sequence: resolve_sequence(first, &rest)?,
        });
    }
    Ok(LineKind::Unrecognized)
}

fn layout_error(kind: OperationKind, tokens: &[String], expected: &str) -> CfError {
    CfError::Parse {
        line: 0,
        text: tokens.join(" "),
        message: format!("'{kind}' expects {expected}"),
    }
}

/// Builds a step from its positional token layout. The first token names the
/// operation.
pub fn parse_step(tokens: &[String]) -> Result<ConstructionStep, CfError> {
    let Some((op, args)) = tokens.split_first() else {
        return Err(CfError::UnsupportedOperation {
            operation: String::new(),
        });
    };
    let kind: OperationKind = op.parse()?;
    let output = args.last().cloned().unwrap_or_default();
    let step = match kind {
        OperationKind::Pcr => {
            // The size may be written as "3222", "3222bp" or "3222 bp".
            let args: Vec<&String> = args
                .iter()
                .filter(|t| !t.eq_ignore_ascii_case("bp"))
                .collect();
            let product_size = match args.len() {
                4 => None,
                5 => Some(parse_size(args[3]).ok_or_else(|| {
                    layout_error(kind, tokens, "a numeric product size before the output")
                })?),
                _ => {
                    return Err(layout_error(
                        kind,
                        tokens,
                        "forward, reverse, template, [size], output",
                    ));
                }
            };
            ConstructionStep::Pcr {
                output,
                forward_oligo: args[0].to_owned(),
                reverse_oligo: args[1].to_owned(),
                template: args[2].to_owned(),
                product_size,
            }
        }
        OperationKind::Digest => {
            if args.len() < 4 {
                return Err(layout_error(
                    kind,
                    tokens,
                    "dna, enzyme(s), fragment index, output",
                ));
            }
            let frag_select = args[args.len() - 2].parse::<usize>().map_err(|_| {
                layout_error(kind, tokens, "a zero-based fragment index before the output")
            })?;
            ConstructionStep::Digest {
                output,
                dna: args[0].to_owned(),
                enzymes: args[1..args.len() - 2].to_vec(),
                frag_select,
            }
        }
        OperationKind::Ligate | OperationKind::Blunt => {
            if args.len() < 2 {
                return Err(layout_error(kind, tokens, "dna(s), output"));
            }
            ConstructionStep::Ligate {
                output,
                dnas: args[..args.len() - 1].to_vec(),
                protocol: match kind {
                    OperationKind::Blunt => LigationProtocol::Blunt,
                    _ => LigationProtocol::Sticky,
                },
            }
        }
        OperationKind::Assemble | OperationKind::GoldenGate => {
            if args.len() < 3 {
                return Err(layout_error(kind, tokens, "dna(s), enzyme, output"));
            }
            let enzyme = &args[args.len() - 2];
            ConstructionStep::Assemble {
                output,
                dnas: args[..args.len() - 2].to_vec(),
                enzyme: match ConstructionStep::is_homology_assembly(enzyme) {
                    true => GIBSON_MARKER.to_string(),
                    false => enzyme.to_owned(),
                },
            }
        }
        OperationKind::Gibson => {
            if args.len() < 2 {
                return Err(layout_error(kind, tokens, "dna(s), output"));
            }
            ConstructionStep::Assemble {
                output,
                dnas: args[..args.len() - 1].to_vec(),
                enzyme: GIBSON_MARKER.to_string(),
            }
        }
        OperationKind::Transform => {
            if args.len() < 4 {
                return Err(layout_error(
                    kind,
                    tokens,
                    "dna, strain, antibiotic(s), [temperature], output",
                ));
            }
            let mut antibiotics = args[2..args.len() - 1].to_vec();
            let mut temperature = None;
            if antibiotics.len() > 1 {
                if let Some(last) = antibiotics.last() {
                    if TEMPERATURE.is_match(last) {
                        temperature = last.trim_end_matches(['C', 'c']).parse::<f64>().ok();
                        antibiotics.pop();
                    }
                }
            }
            ConstructionStep::Transform {
                output,
                dna: args[0].to_owned(),
                strain: args[1].to_owned(),
                antibiotics,
                temperature,
            }
        }
    };
    Ok(step)
}

fn parse_size(token: &str) -> Option<usize> {
    SIZE.captures(token)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parses blobs into a construction file. Unrecognized lines are reported in
/// [`ParseReport::skipped`], or fail with [`CfError::Parse`] when `strict`.
pub fn parse_blobs(blobs: &[Blob], strict: bool) -> Result<ParseReport, CfError> {
    let text = normalize(blobs);
    let mut report = ParseReport::default();
    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let tokens = tokenize_line(line);
        match classify_line(line_number, &tokens)? {
            LineKind::Step(step) => report.construction_file.steps.push(step),
            LineKind::Sequence { name, sequence } => {
                if report
                    .construction_file
                    .sequences
                    .insert(name.clone(), sequence)
                    .is_some()
                    && !report.redefined.contains(&name)
                {
                    report.redefined.push(name);
                }
            }
            LineKind::Blank => {}
            LineKind::Unrecognized if strict => {
                return Err(CfError::Parse {
                    line: line_number,
                    text: line.trim().to_string(),
                    message: "neither an operation nor a sequence definition".to_string(),
                });
            }
            LineKind::Unrecognized => report.skipped.push(SkippedLine {
                line: line_number,
                text: line.trim().to_string(),
            }),
        }
    }
    Ok(report)
}

/// Permissive parse of a single text block.
pub fn parse_text(text: &str) -> Result<ConstructionFile, CfError> {
    Ok(parse_blobs(&[Blob::text(text)], false)?.construction_file)
}
