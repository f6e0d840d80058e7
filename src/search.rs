use crate::clause::{in_conflict, ClauseSet, Pool};
use crate::dimacs::Problem;
use crate::resolve::{choice, resolution_step};
use log::{debug, info, trace};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Branching decisions from the root to a node, sign giving the polarity.
pub(crate) type Trail = Vec<i32>;

/// Cap on frontier expansion. `Queue` wins over `Depth` wins over `Tasks`
/// when several flags are given; `Auto` derives a task cap from the
/// problem dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Limit {
    Auto,
    Depth(usize),
    Tasks(usize),
    Queue(usize),
}

pub(crate) struct Task {
    pub(crate) clauses: ClauseSet,
    pub(crate) trail: Trail,
}

pub(crate) struct Frontier {
    pub(crate) queue: VecDeque<Task>,
    pub(crate) iterations: usize,
    pub(crate) tasks: usize,
    /// Set when expansion ran into a completing assignment before any cap.
    pub(crate) solution: Option<Trail>,
}

pub(crate) struct Outcome {
    pub(crate) solution: Option<Trail>,
    pub(crate) iterations: usize,
    pub(crate) tasks: usize,
    pub(crate) queue_size: usize,
    pub(crate) workers: usize,
    /// Workers inside a DFS task when the solution was published; the
    /// full pool if the frontier exhausted, zero if DFS never ran.
    pub(crate) busy_workers: usize,
    pub(crate) bfs_time: Duration,
    pub(crate) dfs_time: Duration,
}

/// Task cap used when no flag is given.
pub(crate) fn auto_task_cap(problem: &Problem) -> usize {
    problem
        .clause_count
        .saturating_sub(problem.variables)
        .max(1)
}

/// Expand the root clause set breadth-first until a cap is reached,
/// producing the task queue for the parallel phase. Single-threaded and
/// deterministic.
pub(crate) fn frontier(problem: &Problem, limit: Limit) -> Frontier {
    let (depth_cap, task_cap, queue_cap) = match limit {
        Limit::Queue(cap) => (None, None, Some(cap)),
        Limit::Depth(cap) => (Some(cap), None, None),
        Limit::Tasks(cap) => (Some(cap), Some(cap), None),
        Limit::Auto => {
            let cap = auto_task_cap(problem);
            (Some(cap), Some(cap), None)
        }
    };

    let mut pool = Pool::default();
    let mut queue = VecDeque::new();
    queue.push_back(Task {
        clauses: problem.clauses.clone(),
        trail: Trail::new(),
    });
    let mut iterations = 0;
    let mut tasks = 1;

    loop {
        if let Some(cap) = queue_cap {
            if queue.len() >= cap {
                break;
            }
        }
        if let Some(cap) = task_cap {
            if tasks >= cap {
                break;
            }
        }
        let Some(task) = queue.pop_front() else {
            break;
        };
        if in_conflict(&task.clauses) {
            pool.release(task.clauses);
            continue;
        }
        let variable = choice(&task.clauses);
        if variable == 0 {
            // Nothing left to satisfy: the trail is already a solution.
            return Frontier {
                queue,
                iterations,
                tasks,
                solution: Some(task.trail),
            };
        }
        let (on_true, on_false) = resolution_step(&task.clauses, variable, &mut pool);
        pool.release(task.clauses);
        for (child, decision) in [(on_true, variable), (on_false, -variable)] {
            if child.is_empty() {
                let mut trail = task.trail.clone();
                trail.push(decision);
                return Frontier {
                    queue,
                    iterations,
                    tasks,
                    solution: Some(trail),
                };
            }
            if in_conflict(&child) {
                pool.release(child);
                continue;
            }
            let mut trail = task.trail.clone();
            trail.push(decision);
            queue.push_back(Task {
                clauses: child,
                trail,
            });
            tasks += 1;
            trace!(
                "queue {} depth {} tasks {}",
                queue.len(),
                iterations + 1,
                tasks
            );
        }
        iterations += 1;
        if let Some(cap) = depth_cap {
            if iterations >= cap {
                break;
            }
        }
    }

    Frontier {
        queue,
        iterations,
        tasks,
        solution: None,
    }
}

struct Engine {
    queue: Mutex<VecDeque<Task>>,
    found: AtomicBool,
    solution: Mutex<Option<Trail>>,
    active: AtomicUsize,
    busy: AtomicUsize,
}

impl Engine {
    fn new(queue: VecDeque<Task>) -> Self {
        Self {
            queue: Mutex::new(queue),
            found: AtomicBool::new(false),
            solution: Mutex::new(None),
            active: AtomicUsize::new(0),
            busy: AtomicUsize::new(0),
        }
    }

    fn work(&self) {
        let mut pool = Pool::default();
        loop {
            if self.found.load(Ordering::Acquire) {
                return;
            }
            let task = match self.queue.lock() {
                Ok(mut queue) => queue.pop_front(),
                Err(_) => return,
            };
            let Some(task) = task else {
                return;
            };
            let active = self.active.fetch_add(1, Ordering::Relaxed) + 1;
            trace!("{} workers busy", active);
            let local = dfs(task.clauses, &self.found, &mut pool);
            if let Some(local) = local {
                if self
                    .found
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    // Gauge snapshot before this worker leaves its task,
                    // so the winner counts itself.
                    self.busy
                        .store(self.active.load(Ordering::Relaxed), Ordering::Relaxed);
                    let mut trail = task.trail;
                    trail.extend(local);
                    if let Ok(mut slot) = self.solution.lock() {
                        *slot = Some(trail);
                    }
                    info!("worker published a solution");
                }
                self.active.fetch_sub(1, Ordering::Relaxed);
                return;
            }
            self.active.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

/// Complete one frontier task depth-first. Returns the first completing
/// trail, or `None` once the subtree is exhausted or another worker has
/// already won.
fn dfs(clauses: ClauseSet, found: &AtomicBool, pool: &mut Pool) -> Option<Trail> {
    let mut stack = vec![(clauses, Trail::new())];
    while let Some((clauses, trail)) = stack.pop() {
        if found.load(Ordering::Acquire) {
            return None;
        }
        if in_conflict(&clauses) {
            pool.release(clauses);
            continue;
        }
        let variable = choice(&clauses);
        if variable == 0 {
            return Some(trail);
        }
        let (on_true, on_false) = resolution_step(&clauses, variable, pool);
        pool.release(clauses);
        // False branch first: the stack pops the true branch before it.
        for (child, decision) in [(on_false, -variable), (on_true, variable)] {
            if in_conflict(&child) {
                pool.release(child);
                continue;
            }
            let mut extended = trail.clone();
            extended.push(decision);
            if child.is_empty() {
                pool.release(child);
                return Some(extended);
            }
            stack.push((child, extended));
        }
    }
    None
}

/// Drain the frontier with `workers` OS threads; the first completing
/// assignment wins and stops the rest. Also reports how many workers
/// were inside a DFS task when the solution appeared.
pub(crate) fn solve(queue: VecDeque<Task>, workers: usize) -> (Option<Trail>, usize) {
    let engine = Engine::new(queue);
    std::thread::scope(|scope| {
        for index in 0..workers {
            let engine = &engine;
            if let Err(error) = std::thread::Builder::new()
                .name(format!("dfs-{}", index))
                .spawn_scoped(scope, move || engine.work())
            {
                debug!("spawning worker {}: {}", index, error);
            }
        }
    });
    let solution = engine.solution.into_inner().unwrap_or(None);
    let busy = match &solution {
        Some(_) => engine.busy.into_inner(),
        None => workers,
    };
    (solution, busy)
}

/// Both phases back to back, with wall-clock accounting for the report.
pub(crate) fn run(problem: &Problem, limit: Limit, workers: usize) -> Outcome {
    let bfs_start = Instant::now();
    let frontier = frontier(problem, limit);
    let bfs_time = bfs_start.elapsed();
    let queue_size = frontier.queue.len();
    info!(
        "frontier built: {} tasks over {} iterations, {} queued",
        frontier.tasks, frontier.iterations, queue_size
    );

    let dfs_start = Instant::now();
    let (solution, busy_workers) = match frontier.solution {
        Some(solution) => (Some(solution), 0),
        None => solve(frontier.queue, workers),
    };
    let dfs_time = dfs_start.elapsed();

    Outcome {
        solution,
        iterations: frontier.iterations,
        tasks: frontier.tasks,
        queue_size,
        workers,
        busy_workers,
        bfs_time,
        dfs_time,
    }
}
