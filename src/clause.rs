use std::fmt;

/// A clause of at most three literals. Literals are signed variable indices;
/// a zero slot is absent. Units are stored as `(0, 0, x)`, and `(0, 0, 0)`
/// is the empty clause.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Clause(pub(crate) [i32; 3]);

impl Clause {
    #[inline]
    pub(crate) fn unit(literal: i32) -> Self {
        Self([0, 0, literal])
    }

    #[inline]
    pub(crate) fn ternary(a: i32, b: i32, c: i32) -> Self {
        Self([a, b, c])
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.0 == [0, 0, 0]
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "({}, {}, {})", a, b, c)
    }
}

pub(crate) type ClauseSet = Vec<Clause>;

#[inline]
pub(crate) fn in_conflict(clauses: &[Clause]) -> bool {
    clauses.iter().any(Clause::is_empty)
}

/// Free list of clause-set buffers, recycled across resolution steps.
/// One pool per thread: buffers move between the pool and the search
/// frames of its owner only.
#[derive(Default)]
pub(crate) struct Pool {
    free: Vec<ClauseSet>,
}

impl Pool {
    pub(crate) fn obtain(&mut self, reserve: usize) -> ClauseSet {
        let mut buffer = self.free.pop().unwrap_or_default();
        buffer.clear();
        buffer.reserve(reserve);
        buffer
    }

    #[inline]
    pub(crate) fn release(&mut self, buffer: ClauseSet) {
        self.free.push(buffer);
    }
}
