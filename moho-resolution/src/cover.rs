use std::cmp::Reverse;
use ahash::AHashSet;
use itertools::Itertools;
use log::{debug, trace};
use num_traits::Zero;
use moho::Int;
use moho_matrix::FreeSubmod;

use crate::{BasisLayout, Cell, LeftMulTable, Monoid, ResolutionConfig, ResolutionError, Result, RightMulMatrix, Shrink};

/// A free module `ℤ[M]f₁ ⊕ … ⊕ ℤ[M]fₘ` together with a map onto the
/// ℤ-span of the given kernel vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverResult {
    pub input_gens: Vec<usize>,
    pub matrix: RightMulMatrix,
}

impl CoverResult {
    fn empty(n_output: usize) -> Self {
        Self { input_gens: vec![], matrix: RightMulMatrix::empty(n_output) }
    }
}

/// Covers the ℤ-span of `kernel`, a list of vectors in the flat basis of
/// `⊕ ℤ[M]eᵢ` (`eᵢ` = `output_gens`), by a sum of projectives `ℤ[M]f`.
///
/// The kernel vectors must span a ℤ[M]-submodule.
pub fn cover(monoid: &Monoid, output_gens: &[usize], kernel: &[Vec<Int>], config: &ResolutionConfig) -> Result<CoverResult> {
    if kernel.is_empty() {
        return Ok(CoverResult::empty(output_gens.len()))
    }

    let c = Coverer::new(monoid, output_gens);
    let summands = if kernel.len() <= config.greedy_limit {
        c.greedy(kernel)?
    } else {
        c.fast(kernel)?
    };

    let summands = match config.shrink {
        Shrink::Off => summands,
        dir => c.shrink(kernel, summands, dir)
    };

    debug!("cover: {} vectors in rank {} -> {} generators", kernel.len(), c.layout.dim(), summands.len());

    Ok(c.finish(kernel, &summands))
}

/// Covers `kernel` trying to keep the number of new ℤ-ranks small.
pub fn cover_greedy(monoid: &Monoid, output_gens: &[usize], kernel: &[Vec<Int>]) -> Result<CoverResult> {
    if kernel.is_empty() {
        return Ok(CoverResult::empty(output_gens.len()))
    }
    let c = Coverer::new(monoid, output_gens);
    let summands = c.greedy(kernel)?;
    Ok(c.finish(kernel, &summands))
}

/// Covers `kernel` in a single pass, adding a summand for each vector not
/// yet covered.
pub fn cover_fast(monoid: &Monoid, output_gens: &[usize], kernel: &[Vec<Int>]) -> Result<CoverResult> {
    if kernel.is_empty() {
        return Ok(CoverResult::empty(output_gens.len()))
    }
    let c = Coverer::new(monoid, output_gens);
    let summands = c.fast(kernel)?;
    Ok(c.finish(kernel, &summands))
}

// (generator, kernel index)
type Summand = (usize, usize);

struct Coverer<'a> {
    monoid: &'a Monoid,
    layout: BasisLayout,
    lmul: LeftMulTable,
}

impl<'a> Coverer<'a> {
    fn new(monoid: &'a Monoid, output_gens: &[usize]) -> Self {
        let layout = BasisLayout::new(monoid, output_gens);
        let lmul = layout.left_mul_table(monoid);
        Self { monoid, layout, lmul }
    }

    fn orbit_span(&self, vec: &[Int]) -> FreeSubmod {
        let mut span = FreeSubmod::new(self.layout.dim());
        for v in self.lmul.orbit(vec) {
            span.push(&v);
        }
        span
    }

    fn cost(&self, e: usize) -> usize {
        self.monoid.lclass(e).len()
    }

    fn greedy(&self, kernel: &[Vec<Int>]) -> Result<Vec<Summand>> {
        let n = kernel.len();
        let spans = kernel.iter().map(|v| self.orbit_span(v)).collect_vec();

        let by_size = self.monoid.representatives().sorted_by_key(|&e| self.cost(e)).collect_vec();
        let gens = kernel.iter().enumerate().map(|(k, v)|
            by_size.iter().find(|&&e| &self.lmul.apply(e, v) == v).cloned().ok_or(
                ResolutionError::CoverImpossible { kindex: k }
            )
        ).collect::<Result<Vec<_>>>()?;

        let base = (0..n).map(|k1|
            (0..n).filter(|&k2| k2 == k1 || spans[k1].contains(&kernel[k2])).collect::<AHashSet<_>>()
        ).collect_vec();

        let order = (0..n).sorted_by_key(|&k| Reverse(base[k].len())).collect_vec();

        let mut state = GreedyState {
            covered: AHashSet::new(),
            span: FreeSubmod::new(self.layout.dim()),
            chosen: vec![],
        };

        loop {
            trace!("greedy cover: {} remaining", n - state.covered.len());

            let mut incls = order.iter().filter(|&&k| !state.covered.contains(&k)).map(|&k|
                (k, base[k].iter().chain(state.covered.iter()).cloned().collect::<AHashSet<_>>())
            ).collect_vec();

            for (k, incl) in incls.iter_mut() {
                let in_question = (0..n).filter(|k2| !incl.contains(k2)).collect_vec();
                if in_question.is_empty() {
                    continue
                }
                let span = &state.span + &spans[*k];
                incl.extend(in_question.into_iter().filter(|&k2| span.contains(&kernel[k2])));
            }

            // the first one maximizing (newly included) / (added rank).
            let mut best = 0;
            for (i, (k, incl)) in incls.iter().enumerate().skip(1) {
                let (bk, bincl) = &incls[best];
                if incl.len() * self.cost(gens[*bk]) > bincl.len() * self.cost(gens[*k]) {
                    best = i;
                }
            }

            let (k, incl) = &incls[best];
            let num_covered = incl.len() - state.covered.len();
            let efficiency = num_covered as f64 / self.cost(gens[*k]) as f64 - 0.0001;

            state.add(*k, incl, &spans[*k]);
            if state.covered.len() == n {
                break
            }

            for (k, incl) in incls.iter() {
                if state.covered.contains(k) {
                    continue
                }
                let approx = incl.difference(&state.covered).count();
                if approx as f64 / self.cost(gens[*k]) as f64 >= efficiency {
                    state.add(*k, incl, &spans[*k]);
                }
            }

            for k in 0..n {
                if !state.covered.contains(&k) && state.span.contains(&kernel[k]) {
                    state.covered.insert(k);
                }
            }

            if state.covered.len() == n {
                break
            }
        }

        Ok(state.chosen.into_iter().map(|k| (gens[k], k)).collect())
    }

    fn fast(&self, kernel: &[Vec<Int>]) -> Result<Vec<Summand>> {
        let mut covered = FreeSubmod::new(self.layout.dim());
        let mut summands = vec![];

        for (k, vec) in kernel.iter().enumerate() {
            if covered.contains(vec) {
                continue
            }

            let mut fixing: Option<usize> = None;
            for (s, sv) in self.lmul.orbit(vec).enumerate() {
                covered.push(&sv);
                if self.monoid.is_representative(s) && &sv == vec && fixing.map_or(true, |e| self.cost(s) < self.cost(e)) {
                    fixing = Some(s);
                }
            }

            let e = fixing.ok_or(ResolutionError::CoverImpossible { kindex: k })?;
            summands.push((e, k));
        }

        Ok(summands)
    }

    // Drops a summand whose orbit lies in the span of the kept summands
    // before it and all summands after it. The image does not change.
    fn shrink(&self, kernel: &[Vec<Int>], mut summands: Vec<Summand>, dir: Shrink) -> Vec<Summand> {
        if dir == Shrink::Backward {
            summands.reverse();
        }

        let m = summands.len();
        let dim = self.layout.dim();
        let orbits = summands.iter().map(|&(_, k)| self.orbit_span(&kernel[k])).collect_vec();

        let mut suffix = vec![FreeSubmod::new(dim); m + 1];
        for i in (0..m).rev() {
            suffix[i] = &suffix[i + 1] + &orbits[i];
        }

        let mut prefix = FreeSubmod::new(dim);
        let mut kept = vec![];

        for i in 0..m {
            let rest = &prefix + &suffix[i + 1];
            if orbits[i].is_subset(&rest) {
                continue
            }
            prefix += &orbits[i];
            kept.push(summands[i]);
        }

        if dir == Shrink::Backward {
            kept.reverse();
        }

        debug!("shrink: {m} -> {}", kept.len());

        kept
    }

    fn column(&self, vec: &[Int]) -> Vec<Cell> {
        let mut col = vec![vec![]; self.layout.gens().len()];
        for (index, c) in vec.iter().enumerate() {
            if c.is_zero() {
                continue
            }
            let (i, _) = self.layout.pair(index);
            let m = self.layout.element(self.monoid, index);
            col[i].push((c.clone(), m));
        }
        col
    }

    fn finish(&self, kernel: &[Vec<Int>], summands: &[Summand]) -> CoverResult {
        let input_gens = summands.iter().map(|&(e, _)| e).collect();
        let cols = summands.iter().map(|&(_, k)| self.column(&kernel[k])).collect();
        let matrix = RightMulMatrix::from_cols(cols, self.layout.gens().len());
        CoverResult { input_gens, matrix }
    }
}

struct GreedyState {
    covered: AHashSet<usize>,
    span: FreeSubmod,
    chosen: Vec<usize>,
}

impl GreedyState {
    fn add(&mut self, k: usize, incl: &AHashSet<usize>, span: &FreeSubmod) {
        self.covered.extend(incl.iter().cloned());
        self.span += span;
        self.chosen.push(k);
    }
}
