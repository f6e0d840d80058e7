mod clause;
mod digest;
mod dimacs;
mod factors;
mod options;
mod report;
mod resolve;
#[cfg(test)]
mod scenarios;
mod search;

use crate::options::Options;
use crate::report::Report;
use anyhow::Context;
use std::env;

const STACK: usize = 0x1000000;

fn report_err<T>(err: anyhow::Error) -> T {
    eprintln!("satfact: {:?}", err.context("fatal error, exiting"));
    std::process::exit(1);
}

fn go(options: Options) -> anyhow::Result<()> {
    let total_cores = std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1);
    anyhow::ensure!(
        options.reserve <= total_cores,
        "usable cores must be 0 or greater, adjust reserved cores"
    );
    let workers = total_cores.saturating_sub(options.reserve).max(1);

    let problem = dimacs::load(&options.path)?;
    println!("satfact {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!(" Total Cores: {}", total_cores);
    println!("      System: {}", options.reserve);
    println!("  Used Cores: {}", workers);
    println!();
    println!("Input Number: {}", problem.product);
    println!("        Bits: {}", problem.bits);
    println!("     Clauses: {}", problem.clause_count);
    println!("        VARs: {}", problem.variables);
    match options.limit() {
        search::Limit::Auto => {
            println!("  BFS #Tasks: {}", search::auto_task_cap(&problem))
        }
        search::Limit::Depth(cap) => println!("       Depth: {}", cap),
        search::Limit::Tasks(cap) => println!("  BFS #Tasks: {}", cap),
        search::Limit::Queue(cap) => println!("  Queue size: {}", cap),
    }
    println!();

    let outcome = search::run(&problem, options.limit(), workers);
    let factors = outcome
        .solution
        .as_ref()
        .map(|trail| factors::reconstruct(trail, &problem));

    let report = Report::new(&problem, &outcome, factors, total_cores, &options.path);
    {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        report.render(&mut lock).context("printing report")?;
    }

    let directory = match &options.output {
        Some(directory) => directory.clone(),
        None => env::current_dir().context("resolving working directory")?,
    };
    let path = report.write(&directory, &options.flag(), options.reserve)?;
    println!("Result saved: {}", path.display());
    Ok(())
}

fn main() {
    env_logger::init();
    let options = Options::new();
    let engine = std::thread::Builder::new()
        .stack_size(STACK)
        .name("satfact".to_string())
        .spawn(move || go(options).unwrap_or_else(report_err))
        .context("spawning engine thread")
        .unwrap_or_else(report_err);
    if engine.join().is_err() {
        std::process::exit(1);
    }
}
