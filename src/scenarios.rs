use crate::dimacs;
use crate::factors::reconstruct;
use crate::search::{self, Limit};
use num_bigint::BigUint;

/// Emits multiplication-circuit DIMACS in the generator's format: unit
/// and ternary clause lines plus the product and operand-bit headers.
/// Two-literal clauses are padded to ternary by repeating a literal.
struct Encoder {
    next: i32,
    lines: Vec<String>,
}

impl Encoder {
    fn new() -> Self {
        Self {
            next: 0,
            lines: Vec::new(),
        }
    }

    fn fresh(&mut self) -> i32 {
        self.next += 1;
        self.next
    }

    fn unit(&mut self, literal: i32) {
        self.lines.push(format!("{} 0", literal));
    }

    fn ternary(&mut self, a: i32, b: i32, c: i32) {
        self.lines.push(format!("{} {} {} 0", a, b, c));
    }

    fn binary(&mut self, a: i32, b: i32) {
        self.ternary(a, b, a);
    }

    fn and(&mut self, a: i32, b: i32) -> i32 {
        let output = self.fresh();
        self.ternary(-a, -b, output);
        self.binary(a, -output);
        self.binary(b, -output);
        output
    }

    fn xor(&mut self, a: i32, b: i32) -> i32 {
        let output = self.fresh();
        self.ternary(-a, -b, -output);
        self.ternary(a, b, -output);
        self.ternary(-a, b, output);
        self.ternary(a, -b, output);
        output
    }

    fn majority(&mut self, a: i32, b: i32, c: i32) -> i32 {
        let output = self.fresh();
        self.ternary(-a, -b, output);
        self.ternary(-a, -c, output);
        self.ternary(-b, -c, output);
        self.ternary(a, b, -output);
        self.ternary(a, c, -output);
        self.ternary(b, c, -output);
        output
    }
}

/// A `first_bits` x `second_bits` school multiplier with its output wires
/// pinned to `product`: partial-product AND gates feed per-column half
/// and full adders, carries ripple upward.
fn circuit(first_bits: usize, second_bits: usize, product: u64) -> String {
    assert!(product < 1u64 << (first_bits + second_bits));
    let mut encoder = Encoder::new();
    let first: Vec<i32> = (0..first_bits).map(|_| encoder.fresh()).collect();
    let second: Vec<i32> = (0..second_bits).map(|_| encoder.fresh()).collect();

    let width = first_bits + second_bits;
    let mut columns: Vec<Vec<i32>> = vec![Vec::new(); width];
    for (i, &a) in first.iter().enumerate() {
        for (j, &b) in second.iter().enumerate() {
            let partial = encoder.and(a, b);
            columns[i + j].push(partial);
        }
    }

    for position in 0..width {
        while columns[position].len() > 1 {
            let carry = if columns[position].len() == 2 {
                let b = columns[position].pop().unwrap();
                let a = columns[position].pop().unwrap();
                let sum = encoder.xor(a, b);
                columns[position].push(sum);
                encoder.and(a, b)
            } else {
                let c = columns[position].pop().unwrap();
                let b = columns[position].pop().unwrap();
                let a = columns[position].pop().unwrap();
                let partial = encoder.xor(a, b);
                let sum = encoder.xor(partial, c);
                columns[position].push(sum);
                encoder.majority(a, b, c)
            };
            if position + 1 < width {
                columns[position + 1].push(carry);
            } else {
                encoder.unit(-carry);
            }
        }
        let want = (product >> position) & 1 == 1;
        match columns[position].first() {
            Some(&bit) => encoder.unit(if want { bit } else { -bit }),
            None => assert!(!want, "product bit {} has no circuit wire", position),
        }
    }

    let msb_first = |bits: &[i32]| {
        bits.iter()
            .rev()
            .map(|variable| variable.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut text = String::new();
    text.push_str(&format!(
        "c Circuit for product = {} [{}x{} multiplier]\n",
        product, first_bits, second_bits
    ));
    text.push_str(&format!(
        "c Variables for first input [msb,...,lsb]: [{}]\n",
        msb_first(&first)
    ));
    text.push_str(&format!(
        "c Variables for second input [msb,...,lsb]: [{}]\n",
        msb_first(&second)
    ));
    text.push_str(&format!("p cnf {} {}\n", encoder.next, encoder.lines.len()));
    for line in &encoder.lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

fn factor(first_bits: usize, second_bits: usize, product: u64) -> Option<(BigUint, BigUint)> {
    let text = circuit(first_bits, second_bits, product);
    let problem = dimacs::parse(&text).unwrap();
    let outcome = search::run(&problem, Limit::Auto, 4);
    outcome.solution.map(|trail| {
        let factors = reconstruct(&trail, &problem);
        assert!(factors.verified);
        (factors.first, factors.second)
    })
}

#[test]
fn smallest_composite_splits() {
    // 3 and 5 are the only factors fitting 2 and 3 bits.
    let (first, second) = factor(2, 3, 15).expect("15 is composite");
    assert_eq!(first, BigUint::from(3u32));
    assert_eq!(second, BigUint::from(5u32));
}

#[test]
fn prime_input_exhausts_the_search() {
    assert!(factor(2, 3, 13).is_none());
}

#[test]
fn balanced_semiprime_splits() {
    let (first, second) = factor(4, 4, 143).expect("143 is composite");
    let mut pair = [first, second];
    pair.sort();
    assert_eq!(pair[0], BigUint::from(11u32));
    assert_eq!(pair[1], BigUint::from(13u32));
}

#[test]
fn capped_frontier_still_factors() {
    let text = circuit(2, 3, 15);
    let problem = dimacs::parse(&text).unwrap();
    let bounded = search::frontier(&problem, Limit::Queue(2));
    assert!(bounded.queue.len() <= 2);

    let outcome = search::run(&problem, Limit::Queue(2), 2);
    let trail = outcome.solution.expect("queue cap leaves the search complete");
    let factors = reconstruct(&trail, &problem);
    assert!(factors.verified);
    assert_eq!(&factors.first * &factors.second, BigUint::from(15u32));
}

#[test]
fn circuit_text_round_trips_through_ingest() {
    let text = circuit(4, 4, 143);
    let problem = dimacs::parse(&text).unwrap();
    assert_eq!(problem.product, BigUint::from(143u32));
    assert_eq!(problem.first_operand.len(), 4);
    assert_eq!(problem.second_operand.len(), 4);
    assert_eq!(problem.clauses.len(), problem.clause_count);
}
