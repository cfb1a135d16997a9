use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    #[command(about = "Probability of a hidden path under a transition matrix")]
    PathProbability(ProblemArgs),
    #[command(about = "Probability of an emitted string given its hidden path")]
    OutcomeProbability(ProblemArgs),
    #[command(about = "Most probable hidden path of a string (Viterbi)")]
    Decode(ProblemArgs),
    #[command(about = "Probability of a string summed over all hidden paths (forward)")]
    Likelihood(ProblemArgs),
    #[command(about = "Transition and emission matrices estimated from a known hidden path")]
    Estimate(ProblemArgs),
    #[command(about = "Re-estimate the model by Viterbi learning")]
    ViterbiLearn(LearnArgs),
    #[command(about = "Re-estimate the model by Baum-Welch learning")]
    BaumWelch(LearnArgs),
    #[command(about = "Posterior probability of every state at every position")]
    SoftDecode(ProblemArgs),
}

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Decode, score, and train discrete hidden Markov models")]
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommands,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// The number of threads that trellis will use
    #[arg(
        short = 't',
        long = "threads",
        default_value_t = 8usize,
        value_name = "n"
    )]
    pub num_threads: usize,

    /// Print results as JSON instead of text
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ProblemArgs {
    /// Problem files; standard input is read when none are given
    #[arg(value_name = "PROBLEM.txt")]
    pub input_paths: Vec<PathBuf>,

    /// Arguments that are common across all trellis subcommands
    #[command(flatten)]
    pub common_args: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct LearnArgs {
    #[command(flatten)]
    pub problem_args: ProblemArgs,

    /// Override the number of iterations given in the problem text
    #[arg(short = 'i', long = "iterations", value_name = "N")]
    pub iterations: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn test_parse_learn_args() {
        let cli = Cli::parse_from(["trellis", "-vv", "baum-welch", "a.txt", "-i3", "--json"]);

        check!(cli.verbosity == 2);
        let_assert!(SubCommands::BaumWelch(args) = cli.command);
        check!(args.iterations == Some(3));
        check!(args.problem_args.input_paths.len() == 1);
        check!(args.problem_args.common_args.json);
        check!(args.problem_args.common_args.num_threads == 8);
    }

    #[test]
    fn test_parse_problem_args() {
        let cli = Cli::parse_from(["trellis", "decode", "-t", "2"]);

        check!(cli.verbosity == 0);
        let_assert!(SubCommands::Decode(args) = cli.command);
        check!(args.input_paths.is_empty());
        check!(args.common_args.num_threads == 2);
        check!(!args.common_args.json);
    }
}
