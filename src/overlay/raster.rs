use std::path::Path;

use anyhow::Context;

use crate::overlay::layout::{FramePlan, FrameRasterizer};

/// Serif candidates, checked in order when no explicit font path is
/// configured. Georgia on macOS, DejaVu/Liberation on Linux.
const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Georgia.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
];

/// RGBA8 brush color carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Shapes lines with Parley and rasterizes glyph runs with the CPU renderer.
/// One instance per render batch; layout contexts are reused across frames.
pub struct ParleyRasterizer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<BrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl ParleyRasterizer {
    pub fn from_font_bytes(font_bytes: Vec<u8>) -> anyhow::Result<Self> {
        let mut font_ctx = parley::FontContext::default();

        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .context("no font families registered from font bytes")?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .context("registered font family has no name")?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    /// Resolve font bytes from an explicit path or the candidate list.
    pub fn from_system_fonts(override_path: Option<&Path>) -> anyhow::Result<Self> {
        Self::from_font_bytes(load_font_bytes(override_path)?)
    }

    fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: BrushRgba8,
    ) -> parley::Layout<BrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<BrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl FrameRasterizer for ParleyRasterizer {
    fn measure_line(&mut self, text: &str, size_px: f32) -> anyhow::Result<f32> {
        let layout = self.layout_line(text, size_px, BrushRgba8::default());
        Ok(layout_advance(&layout))
    }

    fn rasterize(&mut self, plan: &FramePlan) -> anyhow::Result<Vec<u8>> {
        let w: u16 = plan.width.try_into().context("frame width exceeds u16")?;
        let h: u16 = plan.height.try_into().context("frame height exceeds u16")?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);

        for block in &plan.blocks {
            let [r, g, b, a] = block.style.color;
            let brush = BrushRgba8 { r, g, b, a };

            for (i, line) in block.lines.iter().enumerate() {
                let layout = self.layout_line(line, block.style.size_px, brush);
                let x = (plan.width as f32 - layout_advance(&layout)) / 2.0;
                let y = block.top_y + i as f32 * block.line_height;
                let off = block.style.shadow_offset_px;

                // Shadow pass first, then the fill at the true position, so
                // the run stays legible over any footage behind it.
                draw_layout(&mut ctx, &self.font, &layout, x + off, y + off, Some([0, 0, 0, 255]));
                draw_layout(&mut ctx, &self.font, &layout, x, y, None);
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_in_place(&mut data);
        Ok(data)
    }
}

/// Widest line advance of a shaped layout.
fn layout_advance(layout: &parley::Layout<BrushRgba8>) -> f32 {
    let mut width = 0.0f32;
    for line in layout.lines() {
        width = width.max(line.metrics().advance);
    }
    width
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<BrushRgba8>,
    x: f32,
    y: f32,
    override_color: Option<[u8; 4]>,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x as f64, y as f64)));

    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            let [r, g, b, a] = override_color.unwrap_or([brush.r, brush.g, brush.b, brush.a]);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));

            let glyphs = run.glyphs().map(|glyph| vello_cpu::Glyph {
                id: glyph.id,
                x: glyph.x,
                y: glyph.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

pub fn load_font_bytes(override_path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = override_path {
        return std::fs::read(path).with_context(|| format!("read font '{}'", path.display()));
    }

    for candidate in FONT_CANDIDATES {
        if let Ok(bytes) = std::fs::read(candidate) {
            return Ok(bytes);
        }
    }

    anyhow::bail!("no usable font found; set VERSECAST_FONT_PATH")
}

/// The renderer hands back premultiplied RGBA8; PNG wants straight alpha.
fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((px[c] as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Final write seam for rendered frames.
pub trait ImageWriter {
    fn write(&self, rgba: &[u8], width: u32, height: u32, path: &Path) -> anyhow::Result<()>;
}

/// Straight RGBA8 PNG on disk via the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngWriter;

impl ImageWriter for PngWriter {
    fn write(&self, rgba: &[u8], width: u32, height: u32, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }

        image::save_buffer_with_format(
            path,
            rgba,
            width,
            height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;

        Ok(())
    }
}
