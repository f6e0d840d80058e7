use crate::digest::Digest;
use crate::dimacs::Problem;
use crate::factors::Factors;
use crate::search::Outcome;
use anyhow::Context;
use chrono::Utc;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const PROGRAM: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) struct Report<'a> {
    problem: &'a Problem,
    outcome: &'a Outcome,
    factors: Option<Factors>,
    total_cores: usize,
    dimacs: String,
    utc: String,
    problem_id: String,
}

impl<'a> Report<'a> {
    pub(crate) fn new(
        problem: &'a Problem,
        outcome: &'a Outcome,
        factors: Option<Factors>,
        total_cores: usize,
        dimacs: &Path,
    ) -> Self {
        let utc = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let problem_id = problem_id(problem, outcome.workers, &utc);
        let dimacs = dimacs.display().to_string();
        Self {
            problem,
            outcome,
            factors,
            total_cores,
            dimacs,
            utc,
            problem_id,
        }
    }

    pub(crate) fn render<W: Write>(&self, w: &mut W) -> anyhow::Result<()> {
        let bfs = self.outcome.bfs_time.as_secs_f64();
        let dfs = self.outcome.dfs_time.as_secs_f64();
        let total = bfs + dfs;

        writeln!(w, "        Bits: {}", self.problem.bits)?;
        writeln!(w, "        VARs: {}", self.problem.variables)?;
        writeln!(w, "     Clauses: {}", self.problem.clause_count)?;
        writeln!(w)?;
        writeln!(w, "Input Number: {}", self.problem.product)?;
        match &self.factors {
            Some(factors) => {
                writeln!(w, "      FACT 1: {}", factors.first)?;
                writeln!(w, "      FACT 2: {}", factors.second)?;
                let status = if factors.verified { "verified." } else { "FALSE" };
                writeln!(w, "              {}", status)?;
            }
            None => writeln!(w, "              Prime!")?,
        }
        writeln!(w)?;
        writeln!(
            w,
            "    BFS time: {:.6} seconds ({})",
            bfs,
            percentage(bfs, total)
        )?;
        writeln!(w, "              {}", human_duration(bfs))?;
        writeln!(
            w,
            "    DFS time: {:.6} seconds ({})",
            dfs,
            percentage(dfs, total)
        )?;
        writeln!(w, "              {}", human_duration(dfs))?;
        writeln!(w, "  Total time: {:.6} seconds", total)?;
        writeln!(w, "              {}", human_duration(total))?;
        writeln!(w, " Total Cores: {}", self.total_cores)?;
        writeln!(w, " DFS Threads: {}", self.outcome.busy_workers)?;
        writeln!(w, "  Queue Size: {}", self.outcome.queue_size)?;
        writeln!(w, "       Depth: {}", self.outcome.iterations)?;
        writeln!(w, "       Tasks: {}", self.outcome.tasks)?;
        writeln!(w)?;
        writeln!(w, "     Version: {} {}", PROGRAM, VERSION)?;
        writeln!(w, "      DIMACS: {}", self.dimacs)?;
        writeln!(w, "   Zulu time: {}", self.utc)?;
        writeln!(w, "  Problem ID: {}", self.problem_id)?;
        Ok(())
    }

    pub(crate) fn filename(&self, flag: &str, reserve: usize) -> String {
        let name = Path::new(&self.dimacs)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("input");
        format!(
            "{}_{}_{}_{}_r{}.txt",
            PROGRAM,
            sanitize(name),
            &self.problem_id[..5],
            flag,
            reserve
        )
    }

    pub(crate) fn write(
        &self,
        directory: &Path,
        flag: &str,
        reserve: usize,
    ) -> anyhow::Result<PathBuf> {
        let mut buffer = Vec::new();
        self.render(&mut buffer)?;
        let path = directory.join(self.filename(flag, reserve));
        fs::write(&path, &buffer)
            .with_context(|| format!("writing result file '{}'", path.display()))?;
        Ok(path)
    }
}

fn problem_id(problem: &Problem, workers: usize, utc: &str) -> String {
    let mut digest = Digest::default();
    digest.update_str(&format!(
        "{}-{}-{}-{}",
        problem.product, problem.bits, workers, utc
    ));
    let hex = format!("{:032x}", digest);
    hex[..16].to_string()
}

/// Generator file names embed the full product; digit runs are split
/// after the fifth digit.
fn sanitize(name: &str) -> String {
    let stem = match name.find(".dimacs") {
        Some(position) => &name[..position],
        None => name,
    };
    match Regex::new(r"(\d{5})(\d+)") {
        Ok(pattern) => pattern.replace_all(stem, "${1}e${2}").into_owned(),
        Err(_) => stem.to_string(),
    }
}

fn percentage(part: f64, total: f64) -> String {
    let share = if total > 0.0 { part / total * 100.0 } else { 0.0 };
    format!("{:.2}%", share)
}

fn human_duration(total: f64) -> String {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;
    const MONTH: f64 = 30.0 * DAY;

    let mut seconds = total;
    let mut out = String::new();
    let months = (seconds / MONTH) as u64;
    seconds -= months as f64 * MONTH;
    let days = (seconds / DAY) as u64;
    seconds -= days as f64 * DAY;
    let hours = (seconds / HOUR) as u64;
    seconds -= hours as f64 * HOUR;
    let minutes = (seconds / MINUTE) as u64;
    seconds -= minutes as f64 * MINUTE;
    if months > 0 {
        out.push_str(&format!("{} months ", months));
    }
    if days > 0 {
        out.push_str(&format!("{} days ", days));
    }
    if hours > 0 {
        out.push_str(&format!("{} hours ", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{} minutes ", minutes));
    }
    out.push_str(&format!("{:.3} seconds", seconds));
    out
}
