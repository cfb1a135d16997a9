mod args;
mod commands;
mod io;
mod output;
mod util;

use args::{Cli, SubCommands};
use commands::{run, Task};
use util::{init_verbose, set_threads};

use clap::Parser;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

fn main() -> anyhow::Result<()> {
    color_backtrace::install();

    let cli = Cli::parse();
    init_verbose(cli.verbosity);

    let (task, args, iterations) = match cli.command {
        SubCommands::PathProbability(args) => (Task::PathProbability, args, None),
        SubCommands::OutcomeProbability(args) => (Task::OutcomeProbability, args, None),
        SubCommands::Decode(args) => (Task::Decode, args, None),
        SubCommands::Likelihood(args) => (Task::Likelihood, args, None),
        SubCommands::Estimate(args) => (Task::Estimate, args, None),
        SubCommands::SoftDecode(args) => (Task::SoftDecode, args, None),
        SubCommands::ViterbiLearn(args) => (Task::ViterbiLearn, args.problem_args, args.iterations),
        SubCommands::BaumWelch(args) => (Task::BaumWelch, args.problem_args, args.iterations),
    };

    set_threads(args.common_args.num_threads)?;
    run(task, &args, iterations)
}
