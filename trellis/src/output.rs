use std::io::Write;

use libtrellis::decode::{Posteriors, ViterbiResult};
use libtrellis::structs::ProbabilityTables;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("no posteriors were computed for state '{state}'")]
pub struct UnknownStateError {
    state: char,
}

/// The result of solving one problem.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Probability { probability: f64 },
    Path(ViterbiResult),
    Tables(ProbabilityTables),
    Posteriors {
        states: Vec<char>,
        posteriors: Posteriors,
    },
}

/// Scientific notation with 11 decimals and an exponent that carries a sign
/// and at least two digits, e.g. `3.84928691755e-04`.
pub fn scientific(value: f64) -> String {
    let formatted = format!("{value:.11e}");

    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

fn write_row<'a>(
    out: &mut impl Write,
    label: &str,
    values: impl IntoIterator<Item = &'a f64>,
    precision: usize,
) -> anyhow::Result<()> {
    write!(out, "{label}")?;
    for value in values {
        write!(out, "\t{value:.precision$}")?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_header(
    out: &mut impl Write,
    labels: impl IntoIterator<Item = char>,
) -> anyhow::Result<()> {
    for label in labels {
        write!(out, "\t{label}")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Transition and emission tables, tab-separated with three decimals and a
/// dashed line between them.
pub fn write_tables(out: &mut impl Write, tables: &ProbabilityTables) -> anyhow::Result<()> {
    let precision = 3;

    write_header(out, tables.states().iter().copied())?;
    for (state_idx, state) in tables.states().iter().enumerate() {
        let row = tables.transition_row(state_idx);
        write_row(out, &state.to_string(), row, precision)?;
    }

    writeln!(out, "--------")?;

    write_header(out, tables.alphabet().iter().copied())?;
    for (state_idx, state) in tables.states().iter().enumerate() {
        let row = tables.emission_row(state_idx);
        write_row(out, &state.to_string(), row, precision)?;
    }

    Ok(())
}

/// One line of state labels, then one line of state posteriors per position,
/// with the columns in the order of `states`.
pub fn write_posteriors(
    out: &mut impl Write,
    states: &[char],
    posteriors: &Posteriors,
) -> anyhow::Result<()> {
    let precision = 4;

    let header: Vec<String> = states.iter().map(|s| s.to_string()).collect();
    writeln!(out, "{}", header.join("\t"))?;

    for position in 0..posteriors.len() {
        let row = states
            .iter()
            .map(|&state| {
                posteriors
                    .state_posterior(position, state)
                    .map(|p| format!("{p:.precision$}"))
                    .ok_or(UnknownStateError { state })
            })
            .collect::<Result<Vec<String>, _>>()?;
        writeln!(out, "{}", row.join("\t"))?;
    }

    Ok(())
}

impl Report {
    pub fn write_text(&self, out: &mut impl Write) -> anyhow::Result<()> {
        match self {
            Report::Probability { probability } => writeln!(out, "{}", scientific(*probability))?,
            Report::Path(result) => writeln!(out, "{}", result.path_string())?,
            Report::Tables(tables) => write_tables(out, tables)?,
            Report::Posteriors { states, posteriors } => write_posteriors(out, states, posteriors)?,
        }
        Ok(())
    }

    pub fn write_json(&self, out: &mut impl Write) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_scientific() {
        check!(scientific(0.0003849286917546758) == "3.84928691755e-04");
        check!(scientific(3.5974895474624624e-06) == "3.59748954746e-06");
        check!(scientific(12345.0) == "1.23450000000e+04");
        check!(scientific(0.0) == "0.00000000000e+00");
        check!(scientific(2.5e-120) == "2.50000000000e-120");
    }

    #[test]
    fn test_write_tables() -> anyhow::Result<()> {
        let tables = ProbabilityTables::new(
            &['A', 'B'],
            &['x', 'y'],
            vec![vec![0.25, 0.75], vec![1.0 / 3.0, 2.0 / 3.0]],
            vec![vec![1.0, 0.0], vec![0.5, 0.5]],
        )?;

        let mut out = Vec::new();
        Report::Tables(tables).write_text(&mut out)?;

        let expected = "\tA\tB
A\t0.250\t0.750
B\t0.333\t0.667
--------
\tx\ty
A\t1.000\t0.000
B\t0.500\t0.500
";
        let text = String::from_utf8(out)?;
        check!(text == expected);
        Ok(())
    }

    #[test]
    fn test_write_json() -> anyhow::Result<()> {
        let mut out = Vec::new();
        Report::Probability { probability: 0.5 }.write_json(&mut out)?;

        let value: serde_json::Value = serde_json::from_slice(&out)?;
        check!(value["kind"] == "probability");
        check!(value["probability"] == 0.5);
        Ok(())
    }
}
