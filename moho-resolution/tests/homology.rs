mod common;
use common::*;

use moho_resolution::Monoid;

test!(trivial,    Monoid::new(vec![vec![0]])?, 3, "[0, 0, 0]");
test!(zmod2,      Monoid::cyclic(2)?, 4, "[C2, 0, C2, 0]");
test!(zmod6,      Monoid::cyclic(6)?, 4, "[C6, 0, C6, 0]");
test!(zmod8,      Monoid::cyclic(8)?, 4, "[C8, 0, C8, 0]");
test!(rect_band2, Monoid::adjoin_identity(&rect_band(2))?, 3, "[0, Z, 0]");
test!(rect_band3, Monoid::adjoin_identity(&rect_band(3))?, 3, "[0, Z x Z x Z x Z, 0]");
