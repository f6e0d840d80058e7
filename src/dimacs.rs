use crate::clause::{Clause, ClauseSet};
use anyhow::Context;
use log::debug;
use memmap::Mmap;
use num_bigint::BigUint;
use regex::Regex;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum IngestError {
    #[error("no 'Circuit for product' header in DIMACS input")]
    MissingProduct,
    #[error("no 'p cnf' problem line in DIMACS input")]
    MissingProblemLine,
    #[error("no unit or ternary clauses in DIMACS input")]
    EmptyClauseSet,
}

/// Ingested problem instance, read-only after construction.
#[derive(Debug)]
pub(crate) struct Problem {
    pub(crate) clauses: ClauseSet,
    /// Variables holding the bits of each factor, most significant first.
    pub(crate) first_operand: Vec<i32>,
    pub(crate) second_operand: Vec<i32>,
    pub(crate) product: BigUint,
    pub(crate) variables: usize,
    pub(crate) clause_count: usize,
    pub(crate) bits: u32,
}

pub(crate) fn load(path: &Path) -> anyhow::Result<Problem> {
    let file = fs::File::open(path)
        .with_context(|| format!("opening '{}'", path.display()))?;
    let metadata = file.metadata()?;
    anyhow::ensure!(metadata.len() > 0, "'{}' is empty", path.display());
    let map = unsafe { Mmap::map(&file) }.context("memory-mapping DIMACS file")?;
    let text = std::str::from_utf8(&map).context("DIMACS input is not UTF-8")?;
    parse(text)
}

pub(crate) fn parse(text: &str) -> anyhow::Result<Problem> {
    let product = scrape_product(text)?;
    let (variables, clause_count) = scrape_problem_line(text)?;
    let first_operand = scrape_operand(text, "first");
    let second_operand = scrape_operand(text, "second");
    let bits = second_operand.last().map(|&v| v as u32).unwrap_or(0);

    let mut clauses = ClauseSet::with_capacity(clause_count);
    let mut skipped = 0usize;
    for line in text.lines() {
        match line.bytes().next() {
            None | Some(b'c') | Some(b'p') => continue,
            _ => {}
        }
        let mut literals = [0i32; 3];
        let mut arity = 0usize;
        for literal in line
            .split_whitespace()
            .map_while(|token| token.parse::<i32>().ok())
            .take_while(|&literal| literal != 0)
        {
            if arity < 3 {
                literals[arity] = literal;
            }
            arity += 1;
        }
        match arity {
            1 => clauses.push(Clause::unit(literals[0])),
            3 => clauses.push(Clause::ternary(literals[0], literals[1], literals[2])),
            0 => {}
            // Generator output contains nothing else; anything else is noise.
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("ignored {} clause lines of unsupported arity", skipped);
    }
    if clauses.is_empty() {
        return Err(IngestError::EmptyClauseSet.into());
    }

    Ok(Problem {
        clauses,
        first_operand,
        second_operand,
        product,
        variables,
        clause_count,
        bits,
    })
}

fn scrape_product(text: &str) -> anyhow::Result<BigUint> {
    let pattern = Regex::new(r"Circuit for product = ([0-9]+) \[")?;
    let digits = pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .ok_or(IngestError::MissingProduct)?;
    digits
        .as_str()
        .parse::<BigUint>()
        .context("parsing product from DIMACS header")
}

fn scrape_problem_line(text: &str) -> anyhow::Result<(usize, usize)> {
    let pattern = Regex::new(r"p cnf ([0-9]+) ([0-9]+)")?;
    let captures = pattern
        .captures(text)
        .ok_or(IngestError::MissingProblemLine)?;
    let variables = captures[1].parse::<usize>()?;
    let clause_count = captures[2].parse::<usize>()?;
    Ok((variables, clause_count))
}

fn scrape_operand(text: &str, which: &str) -> Vec<i32> {
    let pattern = format!(
        r"Variables for {} input \[msb,\.\.\.,lsb\]: \[(.*?)\]",
        which
    );
    let Ok(pattern) = Regex::new(&pattern) else {
        return vec![];
    };
    let Some(captures) = pattern.captures(text) else {
        debug!("no '{} input' variable list in DIMACS header", which);
        return vec![];
    };
    captures[1]
        .split(',')
        .filter_map(|index| index.trim().parse::<i32>().ok())
        .collect()
}
