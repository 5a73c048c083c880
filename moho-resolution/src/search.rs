use log::{debug, info, warn};

use crate::{BranchedResolution, Monoid, Result, SearchConfig};

/// Builds resolutions of `monoid`, its opposite and their relabelings
/// `x ↦ n - 1 - x` up to `peek_dim`, and returns the most promising one.
///
/// A resolution that terminates (a dimension with no generators) is
/// returned as soon as it is found. Otherwise the one whose last dimension
/// has the fewest generators in nodes not seen in earlier dimensions wins,
/// the first on ties.
pub fn find_good_resolution(monoid: &Monoid, search: &SearchConfig) -> Result<BranchedResolution> {
    let log = |msg: String| if search.verbose { info!("{msg}") } else { debug!("{msg}") };

    let variants = [
        monoid.clone(),
        monoid.transpose(),
        monoid.reflect(),
        monoid.transpose().reflect(),
    ];

    let mut candidates = vec![];
    let mut last_err = None;

    for m in variants {
        match BranchedResolution::new(m, search.resolution.clone()) {
            Ok(res) => candidates.push(res),
            Err(e) => {
                warn!("dropping candidate: {e}");
                last_err = Some(e);
            }
        }
    }

    for dim in 2..=search.peek_dim {
        let mut i = 0;
        while i < candidates.len() {
            if let Err(e) = candidates[i].extend(dim) {
                warn!("dropping candidate {i} at dim {dim}: {e}");
                candidates.remove(i);
                last_err = Some(e);
                continue
            }
            if candidates[i].generator_counts()[dim] == 0 {
                log(format!("finite resolution of length {}", dim - 1));
                return Ok(candidates.swap_remove(i))
            }
            i += 1;
        }
    }

    let novelties = candidates.iter().map(|res| res.novelty()).collect::<Vec<_>>();
    log(format!("novelty of candidates: {novelties:?}"));

    let best = novelties.iter().enumerate().min_by_key(|&(_, &n)| n).map(|(i, _)| i);
    match (best, last_err) {
        (Some(i), _) => Ok(candidates.swap_remove(i)),
        (None, Some(e)) => Err(e),
        (None, None) => unreachable!("no candidates"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_is_returned_early() {
        let m = Monoid::new(vec![vec![0]]).unwrap();
        let res = find_good_resolution(&m, &SearchConfig::default()).unwrap();
        assert_eq!(res.max_dim(), 2);
        assert!(res.is_finite());
    }

    #[test]
    fn zmod2_is_periodic() {
        let m = Monoid::cyclic(2).unwrap();
        let mut res = find_good_resolution(&m, &SearchConfig::default()).unwrap();
        assert_eq!(res.max_dim(), 4);
        assert_eq!(res.novelty(), 0);
        assert_eq!(res.homology_list(2).unwrap().to_string(), "[C2, 0]");
    }

    #[test]
    fn all_candidates_fail() {
        use crate::{ResolutionConfig, ResolutionError};

        let m = Monoid::cyclic(3).unwrap();
        let search = SearchConfig {
            resolution: ResolutionConfig { max_rank: Some(1), ..Default::default() },
            ..Default::default()
        };
        let err = find_good_resolution(&m, &search).unwrap_err();
        assert!(matches!(err, ResolutionError::ResourceLimit(_)));
    }
}
