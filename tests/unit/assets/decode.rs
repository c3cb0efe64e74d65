use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

const LIMITS: DecodeLimits = DecodeLimits {
    max_bytes: 1 << 20,
    max_pixels: 1 << 20,
};

#[test]
fn decode_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let bg = decode_background(&png_bytes(img), LIMITS).unwrap();
    assert_eq!((bg.width(), bg.height()), (1, 1));
    assert_eq!(
        bg.premul_bytes(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn oversized_payload_is_rejected_before_decoding() {
    let err = decode_background(&[0u8; 32], DecodeLimits { max_bytes: 16, ..LIMITS }).unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&Rejection::PayloadTooLarge { size: 32, max: 16 })
    );
}

#[test]
fn too_many_pixels_is_rejected() {
    let bytes = png_bytes(image::RgbaImage::new(20, 10));
    let err = decode_background(
        &bytes,
        DecodeLimits {
            max_pixels: 199,
            ..LIMITS
        },
    )
    .unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&Rejection::ImageTooLarge {
            width: 20,
            height: 10
        })
    );
}

#[test]
fn garbage_is_a_decode_failure() {
    let err = decode_background(b"definitely not an image", LIMITS).unwrap_err();
    assert!(matches!(err, LogoError::Decode(_)), "{err}");
}

#[test]
fn reference_is_stable_and_content_addressed() {
    let a = BackgroundImage::from_rgba(image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255])))
        .unwrap();
    let b = BackgroundImage::from_rgba(image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255])))
        .unwrap();
    let c = BackgroundImage::from_rgba(image::RgbaImage::from_pixel(4, 4, image::Rgba([9, 2, 3, 255])))
        .unwrap();
    assert_eq!(a.reference(), b.reference());
    assert_ne!(a.reference().fingerprint, c.reference().fingerprint);
    assert_eq!(a.reference().fingerprint.len(), 16);
}

#[test]
fn zero_sized_image_is_rejected() {
    assert!(BackgroundImage::from_rgba(image::RgbaImage::new(0, 3)).is_err());
}
