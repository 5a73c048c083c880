#![allow(unused)]
use itertools::Itertools;
use moho_resolution::Monoid;

pub fn init_logger() {
    let _ = moho::util::log::init_simple_logger(log::LevelFilter::Info);
}

/// The 2×2 rectangular band `{0, 1, 2, 3}` with identity `4`.
pub fn rect22() -> Monoid {
    Monoid::new(vec![
        vec![0, 1, 0, 1, 0],
        vec![0, 1, 0, 1, 1],
        vec![2, 3, 2, 3, 2],
        vec![2, 3, 2, 3, 3],
        vec![0, 1, 2, 3, 4],
    ]).unwrap()
}

/// The n×n rectangular band, `(i, j) * (k, l) = (i, l)`, without identity.
pub fn rect_band(n: usize) -> Vec<Vec<usize>> {
    (0..n * n).map(|x|
        (0..n * n).map(|y| n * (x / n) + y % n).collect()
    ).collect()
}

/// All maps `{0, …, n-1} → {0, …, n-1}` under composition, `f * g = f ∘ g`.
/// The map `f` is labelled `Σ f(i) nⁱ`.
pub fn full_transformations(n: usize) -> Monoid {
    let maps = (0..n).map(|_| 0..n).multi_cartesian_product().map(|mut f| {
        f.reverse();
        f
    }).collect::<Vec<_>>();
    let label = |f: &[usize]| f.iter().rev().fold(0, |acc, &x| acc * n + x);

    let table = maps.iter().map(|f|
        maps.iter().map(|g| {
            let fg = g.iter().map(|&x| f[x]).collect::<Vec<_>>();
            label(&fg)
        }).collect()
    ).collect();

    Monoid::new(table).unwrap()
}

macro_rules! test {
    ($(#[$m:meta])* $test:ident, $monoid:expr, $maxdim:literal, $answer:literal) => {
        $(#[$m])*
        #[test]
        fn $test() -> Result<(), Box<dyn std::error::Error>> {
            use moho_resolution::*;

            common::init_logger();

            let monoid: Monoid = $monoid;
            let search = SearchConfig::default();

            let mut res = find_good_resolution(&monoid, &search)?;
            let h = res.homology_list($maxdim)?;

            assert_eq!(h.to_string(), $answer);
            Ok(())
        }
    };
}

pub(crate) use test;
