use crate::search::Limit;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "parallel SAT-based integer factorization")]
pub(crate) struct Options {
    /// DIMACS file produced by the multiplication-circuit generator.
    pub(crate) path: PathBuf,

    /// Cap on frontier expansion iterations.
    #[arg(short = 'd', value_name = "DEPTH")]
    pub(crate) depth: Option<usize>,

    /// Cap on the number of frontier tasks.
    #[arg(short = 't', value_name = "TASKS")]
    pub(crate) tasks: Option<usize>,

    /// Cap on the frontier queue length; overrides depth and task caps.
    #[arg(short = 'q', value_name = "QUEUE")]
    pub(crate) queue: Option<usize>,

    /// Cores left to the system.
    #[arg(short = 'r', value_name = "CORES", default_value_t = 0)]
    pub(crate) reserve: usize,

    /// Directory for the result file.
    #[arg(short = 'o', value_name = "DIR")]
    pub(crate) output: Option<PathBuf>,
}

impl Options {
    pub(crate) fn new() -> Self {
        Self::try_parse().unwrap_or_else(|error| {
            let _ = error.print();
            let code = match error.kind() {
                clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        })
    }

    pub(crate) fn limit(&self) -> Limit {
        if let Some(cap) = self.queue {
            Limit::Queue(cap)
        } else if let Some(cap) = self.depth {
            Limit::Depth(cap)
        } else if let Some(cap) = self.tasks {
            Limit::Tasks(cap)
        } else {
            Limit::Auto
        }
    }

    /// Short cap description embedded in the result file name.
    pub(crate) fn flag(&self) -> String {
        match self.limit() {
            Limit::Auto => "auto".to_string(),
            Limit::Depth(cap) => format!("d{}", cap),
            Limit::Tasks(cap) => format!("t{}", cap),
            Limit::Queue(cap) => format!("q{}", cap),
        }
    }
}
