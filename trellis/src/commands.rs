use std::io::{BufWriter, Write};

use anyhow::Context;
use libtrellis::decode::{
    decode, hidden_path_probability, likelihood, outcome_probability, soft_decode,
};
use libtrellis::learn::{baum_welch, estimate_parameters, viterbi_learning};
use log::info;
use rayon::prelude::*;

use crate::args::ProblemArgs;
use crate::io::{EstimateProblem, ModelProblem, OutcomeProblem, PathProblem};
use crate::output::Report;
use crate::util::read_inputs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    PathProbability,
    OutcomeProbability,
    Decode,
    Likelihood,
    Estimate,
    ViterbiLearn,
    BaumWelch,
    SoftDecode,
}

/// Parse one problem text and solve it.
///
/// For the learners, `iterations` overrides the count given in the text.
pub fn solve(task: Task, text: &str, iterations: Option<usize>) -> anyhow::Result<Report> {
    let report = match task {
        Task::PathProbability => {
            let problem = PathProblem::parse(text)?;
            let probability = hidden_path_probability(&problem.path, &problem.tables()?)?;
            Report::Probability { probability }
        }
        Task::OutcomeProbability => {
            let problem = OutcomeProblem::parse(text)?;
            let tables = problem.tables()?;
            let probability = outcome_probability(&problem.sequence, &problem.path, &tables)?;
            Report::Probability { probability }
        }
        Task::Decode => {
            let problem = ModelProblem::parse(text, false)?;
            Report::Path(decode(&problem.sequence, &problem.tables)?)
        }
        Task::Likelihood => {
            let problem = ModelProblem::parse(text, false)?;
            let probability = likelihood(&problem.sequence, &problem.tables)?;
            Report::Probability { probability }
        }
        Task::Estimate => {
            let problem = EstimateProblem::parse(text)?;
            Report::Tables(estimate_parameters(
                &problem.sequence,
                &problem.path,
                &problem.states,
                &problem.alphabet,
            )?)
        }
        Task::ViterbiLearn | Task::BaumWelch => {
            let problem = ModelProblem::parse(text, true)?;
            let iterations = iterations.or(problem.iterations).unwrap_or_default();

            let learner = match task {
                Task::ViterbiLearn => viterbi_learning,
                _ => baum_welch,
            };
            Report::Tables(learner(&problem.sequence, &problem.tables, iterations)?)
        }
        Task::SoftDecode => {
            let problem = ModelProblem::parse(text, false)?;
            Report::Posteriors {
                states: problem.tables.states().iter().copied().collect(),
                posteriors: soft_decode(&problem.sequence, &problem.tables)?,
            }
        }
    };

    Ok(report)
}

/// Solve every input problem in parallel and print the reports in input
/// order, separated by blank lines.
pub fn run(task: Task, args: &ProblemArgs, iterations: Option<usize>) -> anyhow::Result<()> {
    let inputs = read_inputs(&args.input_paths)?;
    info!("solving {} problem(s) with task {task:?}", inputs.len());

    let reports = inputs
        .par_iter()
        .map(|input| {
            info!("solving {}", input.name);
            solve(task, &input.text, iterations)
                .context(format!("failed to solve: {}", input.name))
        })
        .collect::<anyhow::Result<Vec<Report>>>()?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for (idx, report) in reports.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }

        match args.common_args.json {
            true => report.write_json(&mut out)?,
            false => report.write_text(&mut out)?,
        }
    }

    out.flush()?;
    Ok(())
}
