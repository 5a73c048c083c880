use crate::AbGroup;

/// Homology of `X × Y` from those of `X` and `Y` (Künneth formula):
///
/// `Hₙ(X × Y) = ⨁_{i+j=n} Hᵢ(X) ⊗ Hⱼ(Y) ⊕ ⨁_{i+j=n-1} Tor(Hᵢ(X), Hⱼ(Y))`.
pub fn product_homology(a: &[AbGroup], b: &[AbGroup]) -> Vec<AbGroup> {
    let (la, lb) = (a.len(), b.len());
    if la == 0 || lb == 0 {
        return vec![]
    }

    (0 .. la + lb - 1).map(|n| {
        let tensors = (0..=n).filter(|&i| i < la && n - i < lb).map(|i|
            a[i].tensor(&b[n - i])
        );
        let tors = (0..n).filter(|&i| i < la && n - 1 - i < lb).map(|i|
            a[i].tor(&b[n - 1 - i])
        );
        tensors.chain(tors).sum()
    }).collect()
}

/// `Hⁿ(X; G) = Ext(Hₙ₋₁(X), G) ⊕ Hom(Hₙ(X), G)`.
pub fn cohomology_from_homology(h: &[AbGroup], g: &AbGroup) -> Vec<AbGroup> {
    (0..h.len()).map(|n|
        if n == 0 {
            h[0].hom(g)
        } else {
            h[n - 1].ext(g).direct_sum(&h[n].hom(g))
        }
    ).collect()
}

/// `Hₙ(X; G) = Hₙ(X) ⊗ G ⊕ Tor(Hₙ₋₁(X), G)`.
pub fn homology_with_coefficients(h: &[AbGroup], g: &AbGroup) -> Vec<AbGroup> {
    (0..h.len()).map(|n|
        if n == 0 {
            h[0].tensor(g)
        } else {
            h[n].tensor(g).direct_sum(&h[n - 1].tor(g))
        }
    ).collect()
}
