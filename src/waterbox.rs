use crate::config::{ConfigStore, UpdateListener};
use crate::foundation::error::WaterboxResult;
use crate::options::{
    ColorScheme, OptionKey, OptionValue, Options, OptionsPatch, Pattern, Scale,
};
use crate::pattern::{PatternFactory, PatternPaint};
use crate::render::engine::{FramePatterns, FrameSurfaces, render_frame};
use crate::render::paint::Painter;
use crate::render::surface::{Canvas, FrameRGBA};
use crate::validate;

/// Canvases, cached pattern handles and drawing resources owned by a [`Waterbox`].
///
/// Reacts to option changes: dimension changes resize all three canvases, pattern changes
/// rebuild the affected handle against the work buffer.
#[derive(Debug)]
pub(crate) struct Surfaces {
    output: Canvas,
    work: Canvas,
    scratch: Canvas,
    back_pattern: Option<PatternPaint>,
    water_pattern: Option<PatternPaint>,
    front_pattern: Option<PatternPaint>,
    factory: PatternFactory,
    painter: Painter,
    last_changed: Vec<OptionKey>,
    updates: usize,
}

impl Surfaces {
    fn new(output: Canvas, factory: PatternFactory) -> Self {
        Self {
            output,
            work: Canvas::empty(),
            scratch: Canvas::empty(),
            back_pattern: None,
            water_pattern: None,
            front_pattern: None,
            factory,
            painter: Painter::new(),
            last_changed: Vec::new(),
            updates: 0,
        }
    }

    fn pattern_slot(&mut self, key: OptionKey) -> Option<&mut Option<PatternPaint>> {
        match key {
            OptionKey::BackPattern => Some(&mut self.back_pattern),
            OptionKey::WaterPattern => Some(&mut self.water_pattern),
            OptionKey::FrontPattern => Some(&mut self.front_pattern),
            _ => None,
        }
    }

    fn pattern(&self, key: OptionKey) -> Option<&PatternPaint> {
        match key {
            OptionKey::BackPattern => self.back_pattern.as_ref(),
            OptionKey::WaterPattern => self.water_pattern.as_ref(),
            OptionKey::FrontPattern => self.front_pattern.as_ref(),
            _ => None,
        }
    }

    fn render(&mut self, options: &Options) -> WaterboxResult<()> {
        let patterns = FramePatterns {
            back: self.back_pattern.as_ref(),
            water: self.water_pattern.as_ref(),
            front: self.front_pattern.as_ref(),
        };
        render_frame(
            options,
            patterns,
            FrameSurfaces {
                output: &mut self.output,
                work: &mut self.work,
                scratch: &mut self.scratch,
            },
            &mut self.painter,
        )
    }
}

impl UpdateListener<Options> for Surfaces {
    fn on_update(&mut self, changed: &[OptionKey], snapshot: &Options) -> WaterboxResult<()> {
        // Everything fallible is staged first so a failure leaves the surfaces untouched.
        let resized = if changed
            .iter()
            .any(|k| matches!(k, OptionKey::Width | OptionKey::Height))
        {
            Some(Canvas::new(snapshot.width, snapshot.height)?)
        } else {
            None
        };

        let mut rebuilt = Vec::new();
        {
            let host = resized.as_ref().unwrap_or(&self.work);
            let ctx = host.pattern_context();
            for &key in changed.iter().filter(|k| k.is_pattern()) {
                let paint = match snapshot.pattern(key) {
                    Some(pattern) => Some(self.factory.create(&ctx, pattern)?),
                    None => None,
                };
                rebuilt.push((key, paint));
            }
        }

        if let Some(work) = resized {
            self.output.resize(snapshot.width, snapshot.height)?;
            self.scratch.resize(snapshot.width, snapshot.height)?;
            self.work = work;
            tracing::debug!(
                width = snapshot.width,
                height = snapshot.height,
                "resized canvases"
            );
        }
        for (key, paint) in rebuilt {
            tracing::debug!(key = %key, present = paint.is_some(), "rebuilt pattern");
            if let Some(slot) = self.pattern_slot(key) {
                *slot = paint;
            }
        }

        self.last_changed = changed.to_vec();
        self.updates += 1;
        Ok(())
    }
}

/// An isometric liquid-fill container.
///
/// Options are validated on every mutation; nothing is painted until [`Waterbox::render`] is
/// called.
///
/// ```no_run
/// let mut wb = waterbox::Waterbox::new()?;
/// wb.set_value(42)?.set_stroke_width(2.0)?;
/// let frame = wb.render()?.to_frame(false);
/// # Ok::<(), waterbox::WaterboxError>(())
/// ```
#[derive(Debug)]
pub struct Waterbox {
    store: ConfigStore<Options, Surfaces>,
}

impl Waterbox {
    pub fn new() -> WaterboxResult<Self> {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> WaterboxResult<Self> {
        Self::with_factory(options, PatternFactory::new())
    }

    /// Default options with reproducible `noise`/`blocky` textures.
    pub fn seeded(seed: u64) -> WaterboxResult<Self> {
        Self::with_factory(Options::default(), PatternFactory::seeded(seed))
    }

    pub fn with_factory(options: Options, factory: PatternFactory) -> WaterboxResult<Self> {
        Self::with_canvas(Canvas::empty(), options, factory)
    }

    /// Draw into a caller-supplied canvas. It is resized to the options' dimensions.
    pub fn with_canvas(
        canvas: Canvas,
        options: Options,
        factory: PatternFactory,
    ) -> WaterboxResult<Self> {
        let store = ConfigStore::new(options, Surfaces::new(canvas, factory))?;
        Ok(Self { store })
    }

    /// Current validated options.
    pub fn options(&self) -> &Options {
        self.store.get()
    }

    /// Current value of one option; `None` for an absent optional field.
    pub fn get(&self, key: OptionKey) -> Option<OptionValue> {
        self.store.value(key)
    }

    pub fn set(&mut self, key: OptionKey, value: OptionValue) -> WaterboxResult<&mut Self> {
        self.update(OptionsPatch::new().set(key, value))?;
        Ok(self)
    }

    /// Remove an optional field.
    pub fn clear(&mut self, key: OptionKey) -> WaterboxResult<&mut Self> {
        self.update(OptionsPatch::new().clear(key))?;
        Ok(self)
    }

    /// Apply a batch; the reaction to it runs once for all of its keys.
    pub fn update(&mut self, patch: OptionsPatch) -> WaterboxResult<Vec<OptionKey>> {
        self.store.update(patch)
    }

    /// Apply a camelCase JSON object as one batch; `null` clears a field.
    pub fn update_json(&mut self, json: &serde_json::Value) -> WaterboxResult<Vec<OptionKey>> {
        self.update(validate::parse_patch(json)?)
    }

    /// Replace every option, clearing optional fields absent from `options`.
    pub fn set_options(&mut self, options: &Options) -> WaterboxResult<&mut Self> {
        self.update(OptionsPatch::full(options))?;
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.options().width
    }

    pub fn height(&self) -> u32 {
        self.options().height
    }

    pub fn value(&self) -> u8 {
        self.options().value
    }

    pub fn stroke_width(&self) -> f64 {
        self.options().stroke_width
    }

    pub fn clip_edges(&self) -> bool {
        self.options().clip_edges
    }

    pub fn back_color_scheme(&self) -> &ColorScheme {
        &self.options().back_color_scheme
    }

    pub fn water_color_scheme(&self) -> &ColorScheme {
        &self.options().water_color_scheme
    }

    pub fn front_color_scheme(&self) -> Option<&ColorScheme> {
        self.options().front_color_scheme.as_ref()
    }

    pub fn back_pattern(&self) -> Option<&Pattern> {
        self.options().back_pattern.as_ref()
    }

    pub fn water_pattern(&self) -> Option<&Pattern> {
        self.options().water_pattern.as_ref()
    }

    pub fn front_pattern(&self) -> Option<&Pattern> {
        self.options().front_pattern.as_ref()
    }

    pub fn scale(&self) -> Option<Scale> {
        self.options().scale
    }

    pub fn set_width(&mut self, width: u32) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().width(width))
    }

    pub fn set_height(&mut self, height: u32) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().height(height))
    }

    pub fn set_value(&mut self, value: u8) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().value(value))
    }

    pub fn set_stroke_width(&mut self, stroke_width: f64) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().stroke_width(stroke_width))
    }

    pub fn set_clip_edges(&mut self, clip: bool) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().clip_edges(clip))
    }

    pub fn set_back_color_scheme(&mut self, scheme: ColorScheme) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().back_color_scheme(scheme))
    }

    pub fn set_water_color_scheme(&mut self, scheme: ColorScheme) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().water_color_scheme(scheme))
    }

    pub fn set_front_color_scheme(
        &mut self,
        scheme: Option<ColorScheme>,
    ) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().front_color_scheme(scheme))
    }

    pub fn set_back_pattern(&mut self, pattern: Option<Pattern>) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().back_pattern(pattern))
    }

    pub fn set_water_pattern(&mut self, pattern: Option<Pattern>) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().water_pattern(pattern))
    }

    pub fn set_front_pattern(&mut self, pattern: Option<Pattern>) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().front_pattern(pattern))
    }

    pub fn set_scale(&mut self, scale: Option<Scale>) -> WaterboxResult<&mut Self> {
        self.patch(OptionsPatch::new().scale(scale))
    }

    fn patch(&mut self, patch: OptionsPatch) -> WaterboxResult<&mut Self> {
        self.update(patch)?;
        Ok(self)
    }

    /// Paint the current options onto the output canvas.
    #[tracing::instrument(skip(self))]
    pub fn render(&mut self) -> WaterboxResult<&Canvas> {
        let (options, surfaces) = self.store.parts_mut();
        surfaces.render(options)?;
        Ok(&self.store.listener().output)
    }

    /// Output canvas as of the last render.
    pub fn canvas(&self) -> &Canvas {
        &self.store.listener().output
    }

    /// Output pixels as of the last render.
    pub fn frame(&self, premultiplied: bool) -> FrameRGBA {
        self.canvas().to_frame(premultiplied)
    }

    /// Give the output canvas back to the caller.
    pub fn into_canvas(self) -> Canvas {
        self.store.into_listener().output
    }

    /// Materialized pattern behind one of the pattern keys.
    pub fn pattern_paint(&self, key: OptionKey) -> Option<&PatternPaint> {
        self.store.listener().pattern(key)
    }

    /// Keys of the most recent successful batch.
    pub fn last_update(&self) -> &[OptionKey] {
        &self.store.listener().last_changed
    }

    /// Number of successful batches, construction included.
    pub fn update_count(&self) -> usize {
        self.store.listener().updates
    }
}
