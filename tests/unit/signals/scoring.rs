//! Unit tests for confluence scoring

use tickerwatch::signals::scoring::{adx_band, confluence_score, rsi_band, support_band, MAX_SCORE};

#[test]
fn test_rsi_band_edges() {
    assert_eq!(rsi_band(Some(29.9)), 4);
    assert_eq!(rsi_band(Some(30.0)), 2);
    assert_eq!(rsi_band(Some(39.9)), 2);
    assert_eq!(rsi_band(Some(40.0)), 0);
    assert_eq!(rsi_band(None), 0);
}

#[test]
fn test_adx_band_edges() {
    assert_eq!(adx_band(Some(25.1)), 3);
    assert_eq!(adx_band(Some(25.0)), 1);
    assert_eq!(adx_band(Some(20.0)), 1);
    assert_eq!(adx_band(Some(19.9)), 0);
    assert_eq!(adx_band(None), 0);
}

#[test]
fn test_support_band_edges() {
    assert_eq!(support_band(Some(0.0)), 3);
    assert_eq!(support_band(Some(-1.9)), 3);
    assert_eq!(support_band(Some(-2.0)), 0);
    assert_eq!(support_band(Some(2.0)), 1);
    assert_eq!(support_band(Some(8.0)), 1);
    assert_eq!(support_band(Some(-8.0)), 0);
    assert_eq!(support_band(None), 0);
}

#[test]
fn test_full_confluence_scores_ten() {
    assert_eq!(confluence_score(Some(25.0), Some(30.0), Some(1.0)), MAX_SCORE);
}

#[test]
fn test_undefined_inputs_score_zero() {
    assert_eq!(confluence_score(None, None, None), 0);
}

#[test]
fn test_score_never_exceeds_max() {
    let rsis = [None, Some(0.0), Some(29.0), Some(35.0), Some(55.0), Some(100.0)];
    let adxs = [None, Some(0.0), Some(22.0), Some(26.0), Some(80.0)];
    let dists = [None, Some(-12.0), Some(-1.0), Some(0.5), Some(9.0)];

    for rsi in rsis {
        for adx in adxs {
            for dist in dists {
                assert!(confluence_score(rsi, adx, dist) <= MAX_SCORE);
            }
        }
    }
}
