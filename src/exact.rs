// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Exact square-lattice walk counts.
//!
//! [`EXACT_COUNTS`] holds the published enumeration `c_0 ..= c_71`, used as
//! the reference for estimator accuracy. [`count_saws`] enumerates by
//! backtracking and is only practical for short walks.

use crate::lattice::LatticePoint;
use crate::walk::Walk;

/// `EXACT_COUNTS[L]` is the number of `L`-step self-avoiding walks from the
/// origin.
pub const EXACT_COUNTS: [u128; 72] = [
    1,
    4,
    12,
    36,
    100,
    284,
    780,
    2_172,
    5_916,
    16_268,
    44_100,
    120_292,
    324_932,
    881_500,
    2_374_444,
    6_416_596,
    17_245_332,
    46_466_676,
    124_658_732,
    335_116_620,
    897_697_164,
    2_408_806_028,
    6_444_560_484,
    17_266_613_812,
    46_146_397_316,
    123_481_354_908,
    329_712_786_220,
    881_317_491_628,
    2_351_378_582_244,
    6_279_396_229_332,
    16_741_957_935_348,
    44_673_816_630_956,
    119_034_997_913_020,
    317_406_598_267_076,
    845_279_074_648_708,
    2_252_534_077_759_844,
    5_995_740_499_124_412,
    15_968_852_281_708_724,
    42_486_750_758_210_044,
    113_101_676_587_853_932,
    300_798_249_248_474_268,
    800_381_032_599_158_340,
    2_127_870_238_872_271_828,
    5_659_667_057_165_209_612,
    15_041_631_638_016_155_884,
    39_992_704_986_620_915_140,
    106_255_762_193_816_523_332,
    282_417_882_500_511_560_972,
    750_139_547_395_987_948_108,
    1_993_185_460_468_062_845_836,
    5_292_794_668_724_837_206_644,
    14_059_415_980_606_050_644_844,
    37_325_046_962_536_847_970_116,
    99_121_668_912_462_180_162_908,
    263_090_298_246_050_489_804_708,
    698_501_700_277_581_954_674_604,
    1_853_589_151_789_474_253_830_500,
    4_920_146_075_313_000_860_596_140,
    13_053_884_641_516_572_778_155_044,
    34_642_792_634_590_824_499_672_196,
    91_895_836_025_056_214_634_047_716,
    243_828_023_293_849_420_839_513_468,
    646_684_752_476_890_688_940_276_172,
    1_715_538_780_705_298_093_042_635_884,
    4_549_252_727_304_405_545_665_901_684,
    12_066_271_136_346_725_726_547_810_652,
    31_992_427_160_420_423_715_150_496_804,
    84_841_788_997_462_209_800_131_419_244,
    224_916_973_773_967_421_352_838_735_684,
    596_373_847_126_147_985_434_982_575_724,
    1_580_784_678_250_571_882_017_480_243_636,
    4_190_893_020_903_935_054_619_120_005_916,
];

/// Largest length with a tabulated count.
pub const MAX_TABULATED_LENGTH: usize = EXACT_COUNTS.len() - 1;

/// Tabulated `c_L`, or `None` past [`MAX_TABULATED_LENGTH`].
pub fn exact_count(length: usize) -> Option<u128> {
    EXACT_COUNTS.get(length).copied()
}

/// Exact `c_{n+1} / c_n`, the quantity a pivot chain on `n`-step walks
/// estimates.
pub fn exact_ratio(steps: usize) -> Option<f64> {
    let next = exact_count(steps + 1)?;
    let current = exact_count(steps)?;
    Some(next as f64 / current as f64)
}

/// Count `length`-step walks by depth-first enumeration.
///
/// The first step is fixed along `+x` and the total multiplied by four.
pub fn count_saws(length: usize) -> u64 {
    if length == 0 {
        return 1;
    }
    let mut walk = Walk::with_capacity(LatticePoint::ORIGIN, length);
    let extended = walk.extend(LatticePoint::new(1, 0));
    debug_assert!(extended);
    4 * count_extensions(&mut walk, length)
}

fn count_extensions(walk: &mut Walk, length: usize) -> u64 {
    if walk.steps() == length {
        return 1;
    }
    let candidates = walk.candidates();
    if walk.steps() + 1 == length {
        return candidates.len() as u64;
    }
    let mut total = 0;
    for &next in candidates.as_slice() {
        let extended = walk.extend(next);
        debug_assert!(extended, "enumerator offered an occupied site");
        total += count_extensions(walk, length);
        walk.retract();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_matches_table() {
        for length in 0..=11 {
            assert_eq!(
                count_saws(length) as u128,
                EXACT_COUNTS[length],
                "c_{length}"
            );
        }
    }

    #[test]
    fn table_lookup_is_bounded() {
        assert_eq!(exact_count(10), Some(44_100));
        assert_eq!(
            exact_count(71),
            Some(4_190_893_020_903_935_054_619_120_005_916)
        );
        assert_eq!(exact_count(72), None);
        assert_eq!(MAX_TABULATED_LENGTH, 71);
        assert_eq!(exact_ratio(1), Some(3.0));
        assert_eq!(exact_ratio(71), None);
    }

    #[test]
    fn counts_are_increasing_and_submultiplicative() {
        for l in 1..EXACT_COUNTS.len() {
            assert!(EXACT_COUNTS[l] > EXACT_COUNTS[l - 1]);
        }
        // c_{m+n} <= c_m c_n
        for m in 1..30 {
            for n in 1..30 {
                assert!(EXACT_COUNTS[m + n] <= EXACT_COUNTS[m] * EXACT_COUNTS[n]);
            }
        }
    }
}
