use std::collections::BTreeMap;

use anyhow::Context;
use lazy_static::lazy_static;
use libtrellis::structs::{LabelMap, ProbabilityTables};
use regex::Regex;
use thiserror::Error;

/// A label-keyed probability matrix: row label -> column label -> probability.
pub type LabelMatrix = LabelMap;

// this static regex matches the dashed lines that separate problem sections
lazy_static! {
    static ref SEPARATOR_RE: Regex = Regex::new(r"^\s*-{3,}\s*$").unwrap();
}

#[derive(Error, Debug)]
#[error("expected {expected} sections separated by dashed lines, found {found}")]
pub struct SectionCountError {
    expected: usize,
    found: usize,
}

#[derive(Error, Debug)]
#[error("the {what} section is empty")]
pub struct EmptySectionError {
    what: &'static str,
}

#[derive(Error, Debug)]
#[error("expected a single-character label, found: {token}")]
pub struct LabelError {
    token: String,
}

#[derive(Error, Debug)]
#[error("matrix row {label} has {found} values, expected {expected}")]
pub struct MatrixRowError {
    label: char,
    found: usize,
    expected: usize,
}

/// The whitespace-separated tokens of one section, line by line.
/// Blank lines are dropped.
#[derive(Debug, Default)]
pub struct Section<'a> {
    lines: Vec<Vec<&'a str>>,
}

fn label(token: &str) -> anyhow::Result<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LabelError {
            token: token.to_string(),
        }
        .into()),
    }
}

impl<'a> Section<'a> {
    /// The first token of the section.
    pub fn word(&self, what: &'static str) -> anyhow::Result<&'a str> {
        self.lines
            .first()
            .and_then(|line| line.first())
            .copied()
            .ok_or_else(|| EmptySectionError { what }.into())
    }

    /// The characters of the first token of the section.
    pub fn chars(&self, what: &'static str) -> anyhow::Result<Vec<char>> {
        Ok(self.word(what)?.chars().collect())
    }

    /// Every token of the section, each read as a single-character label.
    pub fn labels(&self, what: &'static str) -> anyhow::Result<Vec<char>> {
        let labels = self
            .lines
            .iter()
            .flatten()
            .map(|token| label(token))
            .collect::<anyhow::Result<Vec<char>>>()
            .context(format!("failed to read the {what} section"))?;

        match labels.is_empty() {
            true => Err(EmptySectionError { what }.into()),
            false => Ok(labels),
        }
    }

    /// A matrix laid out as a header line of column labels followed by one
    /// line per row: the row label and then one value per column.
    pub fn matrix(&self, what: &'static str) -> anyhow::Result<LabelMatrix> {
        let (header, rows) = self.lines.split_first().ok_or(EmptySectionError { what })?;

        let columns = header
            .iter()
            .map(|token| label(token))
            .collect::<anyhow::Result<Vec<char>>>()
            .context(format!("failed to read the {what} header"))?;

        let mut matrix = LabelMatrix::new();
        for line in rows {
            let row_label = label(line[0]).context(format!("failed to read a {what} row label"))?;
            let values = &line[1..];

            if values.len() != columns.len() {
                return Err(MatrixRowError {
                    label: row_label,
                    found: values.len(),
                    expected: columns.len(),
                }
                .into());
            }

            let row = columns
                .iter()
                .zip(values)
                .map(|(&column, value)| {
                    value
                        .parse::<f64>()
                        .map(|p| (column, p))
                        .context(format!("failed to parse {what} value: {value}"))
                })
                .collect::<anyhow::Result<BTreeMap<char, f64>>>()?;

            matrix.insert(row_label, row);
        }

        Ok(matrix)
    }
}

/// Split problem text on its dashed separator lines, expecting exactly
/// `expected` sections. Trailing empty sections are ignored.
pub fn split_sections(text: &str, expected: usize) -> anyhow::Result<Vec<Section<'_>>> {
    let mut sections = vec![];
    let mut current = Section::default();

    for line in text.lines() {
        if SEPARATOR_RE.is_match(line) {
            sections.push(std::mem::take(&mut current));
        } else {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if !tokens.is_empty() {
                current.lines.push(tokens);
            }
        }
    }
    sections.push(current);

    while sections.len() > expected && sections.last().is_some_and(|s| s.lines.is_empty()) {
        sections.pop();
    }

    if sections.len() != expected {
        return Err(SectionCountError {
            expected,
            found: sections.len(),
        }
        .into());
    }

    Ok(sections)
}

fn uniform_matrix(labels: &[char]) -> LabelMatrix {
    let p = 1.0 / labels.len().max(1) as f64;
    labels
        .iter()
        .map(|&row| (row, labels.iter().map(|&col| (col, p)).collect()))
        .collect()
}

/// A hidden path scored against a transition matrix.
#[derive(Debug)]
pub struct PathProblem {
    pub path: Vec<char>,
    pub states: Vec<char>,
    pub transition: LabelMatrix,
}

impl PathProblem {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let sections = split_sections(text, 3)?;
        Ok(Self {
            path: sections[0].chars("hidden path")?,
            states: sections[1].labels("states")?,
            transition: sections[2].matrix("transition")?,
        })
    }

    pub fn tables(&self) -> anyhow::Result<ProbabilityTables> {
        Ok(ProbabilityTables::from_maps(
            &self.states,
            &[],
            &self.transition,
            &LabelMatrix::new(),
        )?)
    }
}

/// An emitted string scored against its hidden path and an emission matrix.
#[derive(Debug)]
pub struct OutcomeProblem {
    pub sequence: Vec<char>,
    pub alphabet: Vec<char>,
    pub path: Vec<char>,
    pub states: Vec<char>,
    pub emission: LabelMatrix,
}

impl OutcomeProblem {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let sections = split_sections(text, 5)?;
        Ok(Self {
            sequence: sections[0].chars("emitted string")?,
            alphabet: sections[1].labels("alphabet")?,
            path: sections[2].chars("hidden path")?,
            states: sections[3].labels("states")?,
            emission: sections[4].matrix("emission")?,
        })
    }

    /// The transitions play no part in the outcome probability and are
    /// filled in uniformly.
    pub fn tables(&self) -> anyhow::Result<ProbabilityTables> {
        Ok(ProbabilityTables::from_maps(
            &self.states,
            &self.alphabet,
            &uniform_matrix(&self.states),
            &self.emission,
        )?)
    }
}

/// An emitted string together with a hidden path, for parameter estimation.
#[derive(Debug)]
pub struct EstimateProblem {
    pub sequence: Vec<char>,
    pub alphabet: Vec<char>,
    pub path: Vec<char>,
    pub states: Vec<char>,
}

impl EstimateProblem {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let sections = split_sections(text, 4)?;
        Ok(Self {
            sequence: sections[0].chars("emitted string")?,
            alphabet: sections[1].labels("alphabet")?,
            path: sections[2].chars("hidden path")?,
            states: sections[3].labels("states")?,
        })
    }
}

/// An emitted string and a full model, optionally preceded by an
/// iteration count for the learners.
#[derive(Debug)]
pub struct ModelProblem {
    pub iterations: Option<usize>,
    pub sequence: Vec<char>,
    pub tables: ProbabilityTables,
}

impl ModelProblem {
    pub fn parse(text: &str, with_iterations: bool) -> anyhow::Result<Self> {
        let offset = usize::from(with_iterations);
        let sections = split_sections(text, 5 + offset)?;

        let iterations = match with_iterations {
            true => {
                let word = sections[0].word("iterations")?;
                let context = format!("failed to parse iteration count: {word}");
                Some(word.parse::<usize>().context(context)?)
            }
            false => None,
        };

        let sequence = sections[offset].chars("emitted string")?;
        let alphabet = sections[offset + 1].labels("alphabet")?;
        let states = sections[offset + 2].labels("states")?;
        let transition = sections[offset + 3].matrix("transition")?;
        let emission = sections[offset + 4].matrix("emission")?;

        let tables = ProbabilityTables::from_maps(&states, &alphabet, &transition, &emission)
            .context("failed to build the model tables")?;

        Ok(Self {
            iterations,
            sequence,
            tables,
        })
    }
}
