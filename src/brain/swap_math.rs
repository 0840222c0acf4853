//! Pure swap quoting for both invariant families.
//!
//! All amounts in and out of this module are decimal units; raw base-unit
//! pool balances are normalized through each constituent's decimals on
//! entry. Nothing here touches I/O or shared state, and every failure is a
//! typed value - the route search treats a failed quote as an unusable
//! edge, not a fatal condition.

use crate::cartographer::{Pool, PoolKind};
use crate::error::RouterError;

/// Iteration cap shared by both stable-pool solvers.
pub const MAX_ITERATIONS: usize = 100;

/// Absolute convergence tolerance shared by both stable-pool solvers.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// Quote one ordered asset pair of a pool.
pub fn amount_out(
    pool: &Pool,
    from_index: usize,
    to_index: usize,
    amount_in: f64,
) -> Result<f64, RouterError> {
    if from_index >= pool.coins.len() || to_index >= pool.coins.len() || from_index == to_index {
        return Err(RouterError::Validation(format!(
            "asset pair ({}, {}) out of range for pool {:?}",
            from_index, to_index, pool.name
        )));
    }

    let balances = normalized_balances(pool);

    match &pool.kind {
        PoolKind::Weighted { weights } => weighted_out(
            balances[from_index],
            balances[to_index],
            weights[from_index],
            weights[to_index],
            amount_in,
            pool.fee,
        ),
        PoolKind::Stable { amplification } => stable_out(
            &balances,
            *amplification,
            from_index,
            to_index,
            amount_in,
            pool.fee,
        ),
    }
}

fn normalized_balances(pool: &Pool) -> Vec<f64> {
    pool.balances
        .iter()
        .zip(&pool.coins)
        .map(|(&balance, coin)| balance as f64 / 10f64.powi(coin.decimals as i32))
        .collect()
}

fn finite_non_negative(amount: f64) -> Result<f64, RouterError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(RouterError::InvalidQuote);
    }
    Ok(amount)
}

// ============================================
// WEIGHTED POOLS (closed form)
// ============================================

/// Constant-value curve quote:
/// `out = B_o * (1 - (B_i / (B_i + in*(1-fee)))^(w_i/w_o))`
pub fn weighted_out(
    balance_in: f64,
    balance_out: f64,
    weight_in: f64,
    weight_out: f64,
    amount_in: f64,
    fee: f64,
) -> Result<f64, RouterError> {
    let grown_in = balance_in + amount_in * (1.0 - fee);
    if grown_in <= 0.0 {
        return Err(RouterError::InvalidQuote);
    }

    let out = balance_out * (1.0 - (balance_in / grown_in).powf(weight_in / weight_out));
    finite_non_negative(out)
}

// ============================================
// STABLE POOLS (iterative invariant solve)
// ============================================

/// Solve the amplified invariant `D` for the current balance vector by
/// fixed-point iteration, seeded at `sum(balances)`:
///
/// `D' = ((A*n*S + n*P) * D) / ((A*n - 1)*D + (n+1)*P)`
///
/// with `S = sum(balances)` and `P = prod_i(D / (balance_i * n))`.
pub fn stable_invariant(balances: &[f64], amplification: f64) -> Result<f64, RouterError> {
    let n = balances.len() as f64;
    let s: f64 = balances.iter().sum();
    if s == 0.0 {
        return Ok(0.0);
    }

    let mut d = s;
    for _ in 0..MAX_ITERATIONS {
        let mut p = 1.0;
        for &balance in balances {
            p *= d / (balance * n);
        }

        let next = ((amplification * n * s + n * p) * d)
            / ((amplification * n - 1.0) * d + (n + 1.0) * p);
        if !next.is_finite() {
            return Err(RouterError::InvalidQuote);
        }
        if (next - d).abs() < CONVERGENCE_TOLERANCE {
            return Ok(next);
        }
        d = next;
    }

    Err(RouterError::Convergence {
        iterations: MAX_ITERATIONS,
    })
}

/// Residual of the relation satisfied at the converged `D`:
/// `A*n*(D - S) - (D - P)`, zero at a true fixed point.
pub fn invariant_residual(d: f64, balances: &[f64], amplification: f64) -> f64 {
    let n = balances.len() as f64;
    let s: f64 = balances.iter().sum();
    let mut p = 1.0;
    for &balance in balances {
        p *= d / (balance * n);
    }
    amplification * n * (d - s) - (d - p)
}

/// Stable-pool quote: take the fee off the input, grow the in-balance, then
/// solve for the out-balance that keeps `D` constant. The difference between
/// the old and new out-balance is the output.
pub fn stable_out(
    balances: &[f64],
    amplification: f64,
    from_index: usize,
    to_index: usize,
    amount_in: f64,
    fee: f64,
) -> Result<f64, RouterError> {
    let d = stable_invariant(balances, amplification)?;

    let effective_in = amount_in * (1.0 - fee);
    let mut shifted = balances.to_vec();
    shifted[from_index] += effective_in;

    let new_balance_out = solve_balance_out(d, &shifted, amplification, to_index)?;
    finite_non_negative(balances[to_index] - new_balance_out)
}

/// Newton iteration over the single unknown out-balance `y`, holding every
/// other balance and `D` fixed. The residual is the same relation the `D`
/// solve converged on, so both solvers agree on what the invariant is.
fn solve_balance_out(
    d: f64,
    balances: &[f64],
    amplification: f64,
    out_index: usize,
) -> Result<f64, RouterError> {
    let n = balances.len() as f64;
    let an = amplification * n;

    let mut sum_rest = 0.0;
    let mut prod_rest = 1.0;
    for (i, &balance) in balances.iter().enumerate() {
        if i == out_index {
            continue;
        }
        sum_rest += balance;
        prod_rest *= d / (balance * n);
    }

    let mut y = balances[out_index];
    for _ in 0..MAX_ITERATIONS {
        // f(y) = A*n*(D - S_rest - y) - D + P_rest * D / (y * n)
        let f = an * (d - sum_rest - y) - d + prod_rest * d / (y * n);
        let f_prime = -an - prod_rest * d / (n * y * y);
        let next = y - f / f_prime;

        if !next.is_finite() || next <= 0.0 {
            return Err(RouterError::InvalidQuote);
        }
        if (next - y).abs() < CONVERGENCE_TOLERANCE {
            return Ok(next);
        }
        y = next;
    }

    Err(RouterError::Convergence {
        iterations: MAX_ITERATIONS,
    })
}
