use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [0, 0, 0, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_blends() {
    let dst = [0, 0, 255, 255];
    let src = [128, 0, 0, 128];
    assert_eq!(over(dst, src), [128, 0, 127, 255]);
}

#[test]
fn coverage_scales_all_channels() {
    assert_eq!(with_coverage([200, 100, 50, 255], 0), [0, 0, 0, 0]);
    assert_eq!(with_coverage([200, 100, 50, 255], 255), [200, 100, 50, 255]);
    assert_eq!(with_coverage([200, 100, 50, 255], 128), [100, 50, 25, 128]);
}

#[test]
fn over_in_place_checks_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    assert!(over_in_place(&mut dst, &[255u8; 8]).is_ok());
    assert_eq!(dst, vec![255u8; 8]);
}

#[test]
fn paint_coverage_only_touches_covered_pixels() {
    let mut dst = vec![0u8; 3 * 4];
    paint_coverage_in_place(&mut dst, &[0, 255, 128], [255, 0, 0, 255]).unwrap();
    assert_eq!(&dst[0..4], &[0, 0, 0, 0]);
    assert_eq!(&dst[4..8], &[255, 0, 0, 255]);
    assert_eq!(&dst[8..12], &[128, 0, 0, 128]);
    assert!(paint_coverage_in_place(&mut dst, &[0, 0], [1, 1, 1, 1]).is_err());
}
