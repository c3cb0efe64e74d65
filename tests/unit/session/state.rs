use super::*;
use crate::foundation::core::{Offset, Rgba8};
use crate::foundation::error::LogoError;
use crate::text::registry::FontId;

fn defaults(seed: u64) -> ParameterVector {
    ParameterVector::initial(FontId::builtin(), Rgba8::WHITE, seed)
}

fn rules(max_chars: usize) -> TextRules {
    TextRules {
        max_chars,
        ..TextRules::default()
    }
}

fn background() -> Arc<BackgroundImage> {
    let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([10, 20, 30, 255]));
    Arc::new(BackgroundImage::from_rgba(img).unwrap())
}

fn rejection(err: LogoError) -> Rejection {
    err.rejection().cloned().expect("expected a rejection")
}

fn adjusting() -> Session {
    let mut s = Session::new(SessionKey::from("u1"), defaults(0));
    s.accept_image(background(), defaults(7)).unwrap();
    let candidate = s.prepare_text("  HELLO  ", &rules(64)).unwrap();
    s.commit(candidate);
    s
}

#[test]
fn image_moves_session_to_awaiting_text_and_resets_params() {
    let mut s = Session::new(SessionKey::from("u1"), defaults(0));
    assert_eq!(s.phase(), Phase::AwaitingImage);
    s.accept_image(background(), defaults(7)).unwrap();
    assert_eq!(s.phase(), Phase::AwaitingText);
    assert_eq!(s.params().seed, 7);
    assert!(s.background().is_some());
}

#[test]
fn second_image_is_rejected_without_mutation() {
    let mut s = adjusting();
    let before = s.snapshot();
    let err = s.accept_image(background(), defaults(1)).unwrap_err();
    assert_eq!(rejection(err), Rejection::InvalidForPhase("adjusting"));
    assert_eq!(s.snapshot(), before);
}

#[test]
fn text_is_trimmed_and_committed_on_success() {
    let s = adjusting();
    assert_eq!(s.phase(), Phase::Adjusting);
    assert_eq!(s.params().text, "HELLO");
}

#[test]
fn text_validation() {
    let mut s = Session::new(SessionKey::from("u1"), defaults(0));
    assert_eq!(
        rejection(s.prepare_text("HI", &rules(10)).unwrap_err()),
        Rejection::NoSession
    );
    s.accept_image(background(), defaults(0)).unwrap();
    assert_eq!(
        rejection(s.prepare_text("   ", &rules(10)).unwrap_err()),
        Rejection::EmptyText
    );
    assert_eq!(
        rejection(s.prepare_text("ABCDEFGHIJK", &rules(10)).unwrap_err()),
        Rejection::TextTooLong { max: 10 }
    );
    assert!(s.prepare_text("ABCDEFGHIJ", &rules(10)).is_ok());
    assert_eq!(s.phase(), Phase::AwaitingText);
    assert!(s.params().text.is_empty());
}

#[test]
fn text_twice_is_rejected() {
    let s = adjusting();
    assert_eq!(
        rejection(s.prepare_text("AGAIN", &rules(64)).unwrap_err()),
        Rejection::TextAlreadySet
    );
}

#[test]
fn adjustments_require_text() {
    let mut s = Session::new(SessionKey::from("u1"), defaults(0));
    s.accept_image(background(), defaults(0)).unwrap();
    let err = s
        .prepare_adjustment(
            &Command::Move { dx: 1, dy: 0 },
            &ParamLimits::default(),
            &FontRegistry::with_builtin(),
        )
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::InvalidForPhase("awaiting text"));
    assert_eq!(
        rejection(s.prepare_finalize().unwrap_err()),
        Rejection::InvalidForPhase("awaiting text")
    );
}

#[test]
fn prepare_adjustment_does_not_mutate_until_commit() {
    let mut s = adjusting();
    let candidate = s
        .prepare_adjustment(
            &Command::Move { dx: 10, dy: 0 },
            &ParamLimits::default(),
            &FontRegistry::with_builtin(),
        )
        .unwrap();
    assert_eq!(s.params().offset, Offset::new(0, 0));
    s.commit(candidate);
    assert_eq!(s.params().offset, Offset::new(10, 0));
    assert_eq!(s.phase(), Phase::Adjusting);
}

#[test]
fn finalized_session_refuses_everything() {
    let mut s = adjusting();
    s.prepare_finalize().unwrap();
    s.close();
    let fonts = FontRegistry::with_builtin();
    let limits = ParamLimits::default();

    let errs = [
        s.prepare_text("X", &rules(64)).unwrap_err(),
        s.prepare_adjustment(&Command::Scale { factor: 2.0 }, &limits, &fonts)
            .unwrap_err(),
        s.prepare_finalize().unwrap_err(),
        s.accept_image(background(), defaults(0)).unwrap_err(),
    ];
    for err in errs {
        assert_eq!(rejection(err), Rejection::SessionClosed);
    }
}

#[test]
fn snapshot_serializes_reference_vector_and_phase() {
    let s = adjusting();
    let snap = s.snapshot();
    let bg = snap.background.as_ref().unwrap();
    assert_eq!((bg.width, bg.height), (8, 6));
    assert_eq!(bg.fingerprint.len(), 16);

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["phase"], "adjusting");
    assert_eq!(json["params"]["text"], "HELLO");
    let back: SessionSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn key_seed_is_stable() {
    assert_eq!(SessionKey::from("a").seed(), SessionKey::from("a").seed());
    assert_ne!(SessionKey::from("a").seed(), SessionKey::from("b").seed());
}

#[test]
fn alphanumeric_rule_rejects_punctuation_without_mutation() {
    let mut s = Session::new(SessionKey::from("u1"), defaults(0));
    s.accept_image(background(), defaults(0)).unwrap();
    let strict = TextRules {
        alphanumeric_only: true,
        ..TextRules::default()
    };
    assert_eq!(
        rejection(s.prepare_text("HELLO!", &strict).unwrap_err()),
        Rejection::InvalidCharacters
    );
    assert_eq!(s.phase(), Phase::AwaitingText);
    assert!(s.prepare_text("HELLO 2", &strict).is_ok());
}

#[test]
fn variants_need_placed_text_and_change_only_the_effect() {
    let styles = [EffectStyle::Outline, EffectStyle::Glow];
    let mut s = Session::new(SessionKey::from("u1"), defaults(0));
    s.accept_image(background(), defaults(0)).unwrap();
    assert_eq!(
        rejection(s.prepare_variants(&styles).unwrap_err()),
        Rejection::InvalidForPhase("awaiting text")
    );

    let s = adjusting();
    let variants = s.prepare_variants(&styles).unwrap();
    assert_eq!(variants.len(), 2);
    for (v, style) in variants.iter().zip(styles) {
        assert_eq!(v.effect, style);
        assert_eq!(
            ParameterVector {
                effect: s.params().effect,
                ..v.clone()
            },
            *s.params()
        );
    }
    assert_eq!(s.params().effect, EffectStyle::None);
}
