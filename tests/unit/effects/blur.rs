use super::*;

fn blurred(src: &[u8], w: u32, h: u32, radius: f32) -> Vec<u8> {
    let kernel = BlurKernel::for_radius(radius).unwrap();
    let mut canvas = vec![0u8; src.len()];
    blur_background_into(&mut canvas, src, w, h, &kernel, &CancelToken::new()).unwrap();
    canvas
}

#[test]
fn flat_background_stays_flat() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(blurred(&src, w, h, 6.0), src);
}

#[test]
fn single_pixel_spreads_but_keeps_its_energy() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blurred(&src, w, h, 2.4);

    assert!(out.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4, "alpha sum {sum_a}");
}

#[test]
fn previous_canvas_content_is_overwritten() {
    let src = [0u8, 0, 0, 255].repeat(6);
    let kernel = BlurKernel::for_radius(1.0).unwrap();
    let mut canvas = vec![200u8; src.len()];
    blur_background_into(&mut canvas, &src, 3, 2, &kernel, &CancelToken::new()).unwrap();
    assert_eq!(canvas, src);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let kernel = BlurKernel::for_radius(1.0).unwrap();
    let mut canvas = vec![0u8; 8];
    assert!(blur_background_into(&mut canvas, &[0u8; 7], 1, 2, &kernel, &CancelToken::new()).is_err());
    let mut short = vec![0u8; 4];
    assert!(blur_background_into(&mut short, &[0u8; 8], 1, 2, &kernel, &CancelToken::new()).is_err());
}

#[test]
fn cancelled_blur_stops_with_a_render_error() {
    let src = vec![0u8; 16 * 16 * 4];
    let kernel = BlurKernel::for_radius(3.0).unwrap();
    let mut canvas = vec![0u8; src.len()];
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = blur_background_into(&mut canvas, &src, 16, 16, &kernel, &cancel).unwrap_err();
    assert!(matches!(err, LogoError::Render(ref m) if m == "cancelled"));
}

#[test]
fn kernel_follows_radius() {
    assert_eq!(BlurKernel::for_radius(0.0), None);
    assert_eq!(BlurKernel::for_radius(-1.0), None);
    assert_eq!(BlurKernel::for_radius(f32::NAN), None);

    let k = BlurKernel::for_radius(4.0).unwrap();
    assert_eq!(k.reach(), 4);
    assert_eq!(k.taps().iter().sum::<u32>(), 65536);
    assert!(k.taps()[4] > k.taps()[0]);
    assert_eq!(k.taps()[0], k.taps()[8]);

    assert_eq!(BlurKernel::for_radius(0.3).unwrap().reach(), 1);
}
