use super::*;

const W: u32 = 16;
const H: u32 = 12;

static LIVE: std::sync::LazyLock<CancelToken> = std::sync::LazyLock::new(CancelToken::new);

fn checkerboard() -> Vec<u8> {
    let mut out = Vec::with_capacity((W * H * 4) as usize);
    for y in 0..H {
        for x in 0..W {
            let v = if (x + y) % 2 == 0 { 40 } else { 200 };
            out.extend_from_slice(&[v, v, v, 255]);
        }
    }
    out
}

fn square_mask(side: u32) -> GlyphMask {
    GlyphMask::new(side, side, vec![255; (side * side) as usize]).unwrap()
}

fn input<'a>(bg: &'a [u8], mask: &'a GlyphMask) -> CompositeInput<'a> {
    CompositeInput {
        background: bg,
        width: W,
        height: H,
        mask,
        origin: (6, 4),
        color: Rgba8::new(255, 0, 0, 255),
        style: EffectStyle::None,
        blur_radius: 0.0,
        jitter_seed: 7,
        opts: EffectOpts::default(),
        cancel: &LIVE,
    }
}

fn px(buf: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * W + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

#[test]
fn plain_text_replaces_only_glyph_pixels() {
    let bg = checkerboard();
    let mask = square_mask(3);
    let out = composite(&input(&bg, &mask)).unwrap();
    for y in 0..H {
        for x in 0..W {
            let inside = (6..9).contains(&x) && (4..7).contains(&y);
            if inside {
                assert_eq!(px(&out, x, y), [255, 0, 0, 255]);
            } else {
                assert_eq!(px(&out, x, y), px(&bg, x, y));
            }
        }
    }
}

#[test]
fn outline_draws_contrasting_halo_beneath_glyphs() {
    let bg = checkerboard();
    let mask = square_mask(3);
    let out = composite(&CompositeInput {
        style: EffectStyle::Outline,
        color: Rgba8::WHITE,
        ..input(&bg, &mask)
    })
    .unwrap();
    // Two pixels left of the square is covered by the (-2, 0) copy.
    assert_eq!(px(&out, 4, 5), [0, 0, 0, 255]);
    // The glyph itself stays on top.
    assert_eq!(px(&out, 7, 5), [255, 255, 255, 255]);
    // Far away is untouched.
    assert_eq!(px(&out, 0, 0), px(&bg, 0, 0));
}

#[test]
fn glow_tints_neighbourhood_with_translucent_text_color() {
    let bg = vec![0u8; (W * H * 4) as usize];
    let mask = square_mask(1);
    let out = composite(&CompositeInput {
        style: EffectStyle::Glow,
        opts: EffectOpts {
            glow_radius: 2,
            ..EffectOpts::default()
        },
        ..input(&bg, &mask)
    })
    .unwrap();
    let glow = px(&out, 8, 4);
    assert_eq!(glow[3], 110);
    assert_eq!(glow[0], 110);
    assert_eq!(px(&out, 9, 4), [0, 0, 0, 0]);
    assert_eq!(px(&out, 6, 4), [255, 0, 0, 255]);
}

#[test]
fn brushstroke_is_reproducible_for_a_seed() {
    let bg = checkerboard();
    let mask = square_mask(3);
    let base = CompositeInput {
        style: EffectStyle::Brushstroke,
        ..input(&bg, &mask)
    };
    let a = composite(&base).unwrap();
    let b = composite(&base).unwrap();
    assert_eq!(a, b);
}

#[test]
fn blur_softens_background_but_not_glyph_interior() {
    let bg = checkerboard();
    let mask = square_mask(3);
    let sharp = composite(&input(&bg, &mask)).unwrap();
    let blurred = composite(&CompositeInput {
        blur_radius: 3.0,
        ..input(&bg, &mask)
    })
    .unwrap();
    for y in 4..7 {
        for x in 6..9 {
            assert_eq!(px(&blurred, x, y), px(&sharp, x, y));
        }
    }
    assert_ne!(px(&blurred, 1, 1), px(&sharp, 1, 1));
}

#[test]
fn background_input_is_never_written() {
    let bg = checkerboard();
    let copy = bg.clone();
    let mask = square_mask(3);
    let _ = composite(&CompositeInput {
        style: EffectStyle::Glow,
        blur_radius: 2.0,
        ..input(&bg, &mask)
    })
    .unwrap();
    assert_eq!(bg, copy);
}

#[test]
fn stamp_clips_off_canvas_regions() {
    let mask = square_mask(4);
    let mut layer = vec![0u8; (W * H) as usize];
    stamp_max(&mut layer, W, H, &mask, (-2, -3));
    assert_eq!(layer.iter().filter(|&&c| c == 255).count(), 2);
    assert_eq!(layer[0], 255);
    assert_eq!(layer[1], 255);

    let mut layer = vec![0u8; (W * H) as usize];
    stamp_max(&mut layer, W, H, &mask, (W as i64 - 1, H as i64 - 1));
    assert_eq!(layer.iter().filter(|&&c| c == 255).count(), 1);

    let mut layer = vec![0u8; (W * H) as usize];
    stamp_max(&mut layer, W, H, &mask, (100, 0));
    stamp_max(&mut layer, W, H, &mask, (-100, 0));
    assert!(layer.iter().all(|&c| c == 0));
}

#[test]
fn rejects_mismatched_background() {
    let mask = square_mask(1);
    let bg = vec![0u8; 4];
    assert!(composite(&input(&bg, &mask)).is_err());
}

#[test]
fn cancelled_frame_is_abandoned_between_glow_stamps() {
    let bg = checkerboard();
    let mask = square_mask(3);
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = composite(&CompositeInput {
        style: EffectStyle::Glow,
        cancel: &cancel,
        ..input(&bg, &mask)
    })
    .unwrap_err();
    assert!(matches!(err, LogoError::Render(ref m) if m == "cancelled"));
}
