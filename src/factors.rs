use crate::dimacs::Problem;
use fnv::FnvHashSet;
use log::error;
use num_bigint::BigUint;
use num_traits::Zero;

pub(crate) struct Factors {
    pub(crate) first: BigUint,
    pub(crate) second: BigUint,
    pub(crate) verified: bool,
}

/// Map a satisfying trail back onto the two operand bit lists and check
/// the product.
pub(crate) fn reconstruct(trail: &[i32], problem: &Problem) -> Factors {
    let positive: FnvHashSet<i32> =
        trail.iter().copied().filter(|&literal| literal > 0).collect();
    let first = operand_value(&positive, &problem.first_operand);
    let second = operand_value(&positive, &problem.second_operand);
    let verified = &first * &second == problem.product;
    if !verified {
        error!(
            "reconstructed factors {} * {} do not multiply to {}",
            first, second, problem.product
        );
    }
    Factors {
        first,
        second,
        verified,
    }
}

fn operand_value(positive: &FnvHashSet<i32>, bits: &[i32]) -> BigUint {
    let mut value = BigUint::zero();
    for variable in bits {
        value <<= 1u32;
        if positive.contains(variable) {
            value += 1u32;
        }
    }
    value
}
