use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use log::{Level, LevelFilter};

/// The text of one problem and where it came from.
#[derive(Debug, Clone)]
pub struct ProblemInput {
    pub name: String,
    pub text: String,
}

/// Read every problem file, or standard input when no paths are given.
pub fn read_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<ProblemInput>> {
    if paths.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read problem from stdin")?;

        return Ok(vec![ProblemInput {
            name: "<stdin>".to_string(),
            text,
        }]);
    }

    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).context(format!(
                "failed to open problem file: {}",
                path.to_string_lossy()
            ))?;

            Ok(ProblemInput {
                name: path.to_string_lossy().to_string(),
                text,
            })
        })
        .collect()
}

pub fn set_threads(num_threads: usize) -> anyhow::Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("failed to build rayon global threadpool")
}

/// Install the stderr logger: warnings by default, info with -v, debug
/// with -vv. `RUST_LOG` can still raise the level per module.
pub fn init_verbose(verbosity: u8) {
    let filter_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(filter_level)
        .parse_default_env()
        .format(|buf, record| {
            let level = record.level().to_string();
            let level = match record.level() {
                Level::Error => level.red(),
                Level::Warn => level.yellow(),
                Level::Info => level.green(),
                Level::Debug => level.blue(),
                Level::Trace => level.cyan(),
            };

            writeln!(buf, "[{}] {} - {}", level, record.target(), record.args())
        })
        .init();
}
