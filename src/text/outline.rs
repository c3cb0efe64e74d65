use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use crate::foundation::error::{LogoError, LogoResult};
use crate::text::face::{FontFace, GlyphMask, TextExtent, check_size};

const MAX_RASTER_SIDE: u32 = u16::MAX as u32;
const MAX_IDLE_ENGINES: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Brush carried through Parley layouts. Coverage is all we rasterize, so it stays white.
pub(crate) struct MaskBrush;

/// Scalable face loaded from TTF/OTF bytes.
///
/// Shaping is done with Parley and glyphs are filled with `vello_cpu`; measurement and
/// rasterization share one layout path so their extents agree.
///
/// The bytes are registered with Parley once per layout context. Contexts are kept in a small
/// idle pool and reused, so concurrent renders on the pool each borrow their own.
pub struct OutlineFace {
    family: String,
    bytes: Arc<Vec<u8>>,
    font: vello_cpu::peniko::FontData,
    idle: Mutex<Vec<LayoutEngine>>,
}

impl std::fmt::Debug for OutlineFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFace")
            .field("family", &self.family)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl OutlineFace {
    /// Load a face from raw font bytes, validating that Parley can register a family.
    pub fn from_bytes(bytes: Vec<u8>) -> LogoResult<Self> {
        let bytes = Arc::new(bytes);
        let (engine, family) = LayoutEngine::registered(&bytes)?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Ok(Self {
            family,
            bytes,
            font,
            idle: Mutex::new(vec![engine]),
        })
    }

    fn layout(&self, text: &str, size_px: f32) -> LogoResult<parley::Layout<MaskBrush>> {
        check_size(size_px)?;
        let reused = self.idle_engines().pop();
        let mut engine = match reused {
            Some(engine) => engine,
            None => LayoutEngine::registered(&self.bytes)?.0,
        };
        let layout = engine.layout_plain(text, &self.family, size_px);
        let mut idle = self.idle_engines();
        if idle.len() < MAX_IDLE_ENGINES {
            idle.push(engine);
        }
        Ok(layout)
    }

    fn idle_engines(&self) -> std::sync::MutexGuard<'_, Vec<LayoutEngine>> {
        // A panic while holding the lock cannot leave a half-built context in the list.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn idle_count(&self) -> usize {
        self.idle_engines().len()
    }

    fn extent_of(layout: &parley::Layout<MaskBrush>) -> TextExtent {
        TextExtent {
            width: layout.width().max(0.0).ceil() as u32,
            height: layout.height().max(0.0).ceil() as u32,
        }
    }
}

impl FontFace for OutlineFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn measure(&self, text: &str, size_px: f32) -> LogoResult<TextExtent> {
        let layout = self.layout(text, size_px)?;
        Ok(Self::extent_of(&layout))
    }

    fn rasterize(&self, text: &str, size_px: f32) -> LogoResult<GlyphMask> {
        let layout = self.layout(text, size_px)?;
        let extent = Self::extent_of(&layout);
        if extent.width == 0 || extent.height == 0 {
            return GlyphMask::new(extent.width, extent.height, Vec::new());
        }
        if extent.width > MAX_RASTER_SIDE || extent.height > MAX_RASTER_SIDE {
            return Err(LogoError::render(format!(
                "text raster of {}x{} is too large",
                extent.width, extent.height
            )));
        }
        let (w, h) = (extent.width as u16, extent.height as u16);

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        // White paint: premultiplied alpha is the coverage.
        let coverage = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();
        GlyphMask::new(extent.width, extent.height, coverage)
    }
}

/// Parley contexts with one face's bytes already registered.
struct LayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<MaskBrush>,
}

impl LayoutEngine {
    /// Fresh contexts holding `font_bytes`, plus the family name Parley assigned them.
    fn registered(font_bytes: &[u8]) -> LogoResult<(Self, String)> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| LogoError::decode("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LogoError::decode("registered font family has no name"))?
            .to_string();

        let engine = Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        };
        Ok((engine, family))
    }

    fn layout_plain(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
    ) -> parley::Layout<MaskBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(MaskBrush));

        let mut layout: parley::Layout<MaskBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/outline.rs"]
mod tests;
