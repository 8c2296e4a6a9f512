//! Stroke engine - drives one tool through the stroke lifecycle

use super::session::{LayerKind, LayerMut, StrokeSession};
use super::{Dab, StrokeTool, ToolKind};
use crate::core::color::ColorF;
use crate::core::config::BrushConfig;
use crate::core::errors::StrokeError;
use crate::core::geometry::Rect;
use crate::core::raster::{GreyImage, RgbaImage};

/// Owns the active tool, its settings and the stroke in progress.
///
/// Calls must follow `begin_stroke` → `paint_dab`* → `merge_*`* →
/// `end_stroke`; anything else is rejected with an error and leaves the
/// engine untouched.
#[derive(Debug)]
pub struct StrokeEngine {
    kind: ToolKind,
    tool: Box<dyn StrokeTool>,
    config: BrushConfig,
    color: ColorF,
    session: Option<StrokeSession>,
}

impl StrokeEngine {
    /// Create an engine for `kind` with a validated configuration
    pub fn new(kind: ToolKind, config: BrushConfig) -> Result<Self, StrokeError> {
        config.validate()?;
        Ok(Self {
            kind,
            tool: kind.create_tool(),
            config,
            color: ColorF::BLACK,
            session: None,
        })
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.kind
    }

    pub fn tool(&self) -> &dyn StrokeTool {
        self.tool.as_ref()
    }

    pub fn config(&self) -> &BrushConfig {
        &self.config
    }

    pub fn color(&self) -> ColorF {
        self.color
    }

    /// Swap the tool; not allowed mid-stroke
    pub fn set_tool(&mut self, kind: ToolKind) -> Result<(), StrokeError> {
        if self.session.is_some() {
            return Err(StrokeError::StrokeInProgress);
        }
        self.kind = kind;
        self.tool = kind.create_tool();
        Ok(())
    }

    /// Replace the brush configuration; takes effect from the next dab
    pub fn set_config(&mut self, config: BrushConfig) -> Result<(), StrokeError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Set brush color
    pub fn set_color(&mut self, color: ColorF) {
        self.color = color;
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the layer must be re-merged before the next dab samples it
    pub fn wants_output_as_input(&self) -> bool {
        self.tool.wants_output_as_input()
    }

    /// Current stroked region, empty when idle
    pub fn stroked_region(&self) -> Rect {
        self.session
            .as_ref()
            .map(StrokeSession::stroked_region)
            .unwrap_or_else(Rect::empty)
    }

    pub fn session(&self) -> Option<&StrokeSession> {
        self.session.as_ref()
    }

    /// Start a stroke on a `width` x `height` layer
    pub fn begin_stroke(
        &mut self,
        layer_kind: LayerKind,
        width: usize,
        height: usize,
    ) -> Result<(), StrokeError> {
        if self.session.is_some() {
            tracing::warn!("begin_stroke while a {} stroke is active", self.tool.name());
            return Err(StrokeError::StrokeInProgress);
        }
        self.session = Some(StrokeSession::new(
            self.tool.scratch_kind(),
            layer_kind,
            width,
            height,
        ));
        self.tool.begin_stroke();
        tracing::debug!(
            "Stroke started: tool={} layer={:?} {}x{}",
            self.tool.name(),
            layer_kind,
            width,
            height
        );
        Ok(())
    }

    /// Accumulate one dab into the active stroke
    pub fn paint_dab(&mut self, layer: LayerMut<'_>, dab: &Dab<'_>) -> Result<(), StrokeError> {
        let session = self.session.as_mut().ok_or(StrokeError::NoActiveStroke)?;
        self.tool
            .paint_dab(session, layer, dab, &self.config, self.color)?;
        tracing::trace!(
            "{} dab at {:?} alpha {}",
            self.tool.name(),
            dab.image_rect,
            dab.alpha
        );
        Ok(())
    }

    /// Rebuild `dest` from `undo` plus the stroke so far
    pub fn merge_onto_image(
        &self,
        dest: &mut RgbaImage,
        undo: &RgbaImage,
    ) -> Result<(), StrokeError> {
        let session = self.session.as_ref().ok_or(StrokeError::NoActiveStroke)?;
        self.tool.merge_onto_image(session, dest, undo, self.color)
    }

    pub fn merge_onto_mask(&self, dest: &mut GreyImage, undo: &GreyImage) -> Result<(), StrokeError> {
        let session = self.session.as_ref().ok_or(StrokeError::NoActiveStroke)?;
        self.tool.merge_onto_mask(session, dest, undo, self.color)
    }

    /// Finish the stroke and return its stroked region.
    ///
    /// Ending without a final merge cancels the stroke.
    pub fn end_stroke(&mut self) -> Result<Rect, StrokeError> {
        let session = self.session.take().ok_or(StrokeError::NoActiveStroke)?;
        self.tool.end_stroke();
        let region = session.stroked_region();
        tracing::debug!("Stroke ended: tool={} region={:?}", self.tool.name(), region);
        Ok(region)
    }
}
