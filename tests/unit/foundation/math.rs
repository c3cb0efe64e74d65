use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(200, 128), 100);
}

#[test]
fn premultiply_then_unpremultiply_is_identity_for_opaque_pixels() {
    let mut px = vec![10u8, 200, 30, 255, 0, 0, 0, 255];
    let orig = px.clone();
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, orig);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, orig);
}

#[test]
fn transparent_pixels_clear_color() {
    let mut px = vec![10u8, 20, 30, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
    let mut px = vec![10u8, 20, 30, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn unpremultiply_restores_half_alpha_color_approximately() {
    let mut px = vec![200u8, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px[..3].iter().zip([200u8, 100, 50]) {
        assert!((i16::from(*got) - i16::from(want)).abs() <= 2);
    }
    assert_eq!(px[3], 128);
}
