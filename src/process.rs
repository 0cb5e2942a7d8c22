//! The icon pipeline.
//!
//! Turns one uploaded image into one textured icon. The stage order is
//! fixed; [`ProcessingOptions`] only switches stages on or off:
//!
//! ```text
//! remove-background? → decode → horizontal-padding? → resize-to-square
//!   → edge-padding? → grayscale → contrast? → invert? → border?
//!   → texture → crop? → drop-shadow? → aspect-padding? → encode
//! ```
//!
//! [`plan_stages`] computes the enabled list up front as a pure function of
//! the options, and [`Pipeline::run`] folds a buffer through it. The one
//! decision taken at run time is the `auto` contrast mode, which asks the
//! two-tone classifier and may skip enhancement.
//!
//! The grayscale stage snapshots its input as the "original". Texture
//! compositing starts from that snapshot, so pixels the mask leaves
//! transparent keep their pre-grayscale colour.
//!
//! ## Concurrency
//!
//! A [`Pipeline`] only borrows its collaborators, all of which are `Sync`,
//! so one pipeline can serve many concurrent runs. Every run owns its
//! buffers; the texture and background-removal caches are the only shared
//! state.

use crate::imaging::{
    ImageSurface, PixelBuffer, SurfaceError, TextureError, TextureLoader, WHITE_TEXTURE,
    add_aspect_ratio_padding, add_content_border, add_edge_padding, add_horizontal_padding,
    apply_drop_shadow, apply_textures, crop_to_content, ensure_grayscale, increase_contrast,
    invert_image, is_two_tone_image, resize_to_square, rust_backend::is_svg,
};
use crate::removal::{BackgroundRemover, RemovalError};
use crate::types::{ContrastMode, ProcessingOptions};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    RemoveBackground,
    Decode,
    HorizontalPadding,
    ResizeToSquare,
    EdgePadding,
    Grayscale,
    Contrast,
    Invert,
    Border,
    Texture,
    Crop,
    DropShadow,
    AspectPadding,
    Encode,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::RemoveBackground => "remove-background",
            Stage::Decode => "decode",
            Stage::HorizontalPadding => "horizontal-padding",
            Stage::ResizeToSquare => "resize-to-square",
            Stage::EdgePadding => "edge-padding",
            Stage::Grayscale => "grayscale",
            Stage::Contrast => "contrast",
            Stage::Invert => "invert",
            Stage::Border => "border",
            Stage::Texture => "texture",
            Stage::Crop => "crop",
            Stage::DropShadow => "drop-shadow",
            Stage::AspectPadding => "aspect-padding",
            Stage::Encode => "encode",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stages that will run for `options`, in order.
///
/// The contrast stage is listed whenever the mode is not `black-white`; in
/// `auto` mode it may still be skipped at run time.
pub fn plan_stages(options: &ProcessingOptions) -> Vec<Stage> {
    let border = options.effective_border();
    [
        (Stage::RemoveBackground, options.remove_background),
        (Stage::Decode, true),
        (
            Stage::HorizontalPadding,
            options.effective_horizontal_adjustment() != 0,
        ),
        (Stage::ResizeToSquare, true),
        (Stage::EdgePadding, border > 0),
        (Stage::Grayscale, true),
        (Stage::Contrast, options.contrast != ContrastMode::BlackWhite),
        (Stage::Invert, options.invert),
        (Stage::Border, border > 0),
        (Stage::Texture, true),
        (Stage::Crop, options.crop),
        (Stage::DropShadow, options.drop_shadow),
        (Stage::AspectPadding, options.padding),
        (Stage::Encode, true),
    ]
    .into_iter()
    .filter_map(|(stage, enabled)| enabled.then_some(stage))
    .collect()
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Could not decode input image: {0}")]
    Decode(#[source] SurfaceError),
    #[error("Stage {stage} failed: {source}")]
    Surface {
        stage: Stage,
        #[source]
        source: SurfaceError,
    },
    #[error("Texture load failed: {0}")]
    TextureLoad(#[from] TextureError),
    #[error(transparent)]
    BackgroundRemoval(#[from] RemovalError),
    #[error("Background removal was requested but no remover is configured")]
    RemoverUnavailable,
}

impl ProcessError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            ProcessError::Decode(_) => Stage::Decode,
            ProcessError::Surface { stage, .. } => *stage,
            ProcessError::TextureLoad(_) => Stage::Texture,
            ProcessError::BackgroundRemoval(_) | ProcessError::RemoverUnavailable => {
                Stage::RemoveBackground
            }
        }
    }
}

fn surface_error(stage: Stage) -> impl FnOnce(SurfaceError) -> ProcessError {
    move |source| ProcessError::Surface { stage, source }
}

/// Bad input bytes are a decode error; an exhausted canvas is a surface error.
fn decode_error(source: SurfaceError) -> ProcessError {
    match source {
        SurfaceError::Unavailable(_) => ProcessError::Surface {
            stage: Stage::Decode,
            source,
        },
        other => ProcessError::Decode(other),
    }
}

/// Progress reported while a run advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A stage finished. Dimensions are absent before the image is decoded.
    StageCompleted {
        stage: Stage,
        dimensions: Option<(u32, u32)>,
    },
    /// A planned stage decided at run time not to change the buffer.
    StageSkipped { stage: Stage, reason: &'static str },
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessedIcon {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Stages that actually ran, in order.
    pub stages: Vec<Stage>,
}

/// Buffers threaded through a run.
struct Working<'i> {
    input: Cow<'i, [u8]>,
    buffer: PixelBuffer,
    original: Option<PixelBuffer>,
    png: Vec<u8>,
    decoded: bool,
}

/// The orchestrator: a surface, a texture source, and an optional remover.
pub struct Pipeline<'a, S: ImageSurface> {
    surface: &'a S,
    textures: &'a TextureLoader,
    remover: Option<&'a dyn BackgroundRemover>,
}

impl<'a, S: ImageSurface> Pipeline<'a, S> {
    pub fn new(surface: &'a S, textures: &'a TextureLoader) -> Self {
        Self {
            surface,
            textures,
            remover: None,
        }
    }

    /// Attach the adapter used when `remove_background` is set.
    pub fn with_remover(mut self, remover: &'a dyn BackgroundRemover) -> Self {
        self.remover = Some(remover);
        self
    }

    /// Run the pipeline on raw image bytes.
    pub fn run(
        &self,
        input: &[u8],
        options: &ProcessingOptions,
    ) -> Result<ProcessedIcon, ProcessError> {
        self.run_reporting(input, options, None)
    }

    /// Run the pipeline, sending a [`ProcessEvent`] after every stage.
    #[tracing::instrument(
        name = "pipeline",
        skip(self, input, options, events),
        fields(variant = %options.variant, bytes = input.len())
    )]
    pub fn run_reporting(
        &self,
        input: &[u8],
        options: &ProcessingOptions,
        events: Option<&Sender<ProcessEvent>>,
    ) -> Result<ProcessedIcon, ProcessError> {
        let send = |event: ProcessEvent| {
            if let Some(tx) = events {
                // A closed receiver only means nobody is listening any more
                tx.send(event).ok();
            }
        };

        let mut work = Working {
            input: Cow::Borrowed(input),
            buffer: PixelBuffer::new(0, 0),
            original: None,
            png: Vec::new(),
            decoded: false,
        };
        let mut executed = Vec::new();

        for stage in plan_stages(options) {
            match self.apply(stage, &mut work, options)? {
                Some(reason) => {
                    tracing::debug!(%stage, reason, "stage skipped");
                    send(ProcessEvent::StageSkipped { stage, reason });
                }
                None => {
                    let dimensions = work.decoded.then(|| work.buffer.dimensions());
                    tracing::trace!(%stage, ?dimensions, "stage completed");
                    executed.push(stage);
                    send(ProcessEvent::StageCompleted { stage, dimensions });
                }
            }
        }

        Ok(ProcessedIcon {
            png: work.png,
            width: work.buffer.width(),
            height: work.buffer.height(),
            stages: executed,
        })
    }

    /// Apply one stage. Returns `Some(reason)` if the stage chose to skip.
    fn apply(
        &self,
        stage: Stage,
        work: &mut Working<'_>,
        options: &ProcessingOptions,
    ) -> Result<Option<&'static str>, ProcessError> {
        let border = options.effective_border();
        let next = match stage {
            Stage::RemoveBackground => {
                let remover = self.remover.ok_or(ProcessError::RemoverUnavailable)?;
                // Removers only understand rasters
                let removed = if is_svg(&work.input) {
                    let rasterized = self.surface.decode(&work.input).map_err(decode_error)?;
                    let png = self
                        .surface
                        .encode_png(&rasterized)
                        .map_err(surface_error(stage))?;
                    remover.remove_background(&png)?
                } else {
                    remover.remove_background(&work.input)?
                };
                work.input = Cow::Owned(removed);
                return Ok(None);
            }
            Stage::Decode => {
                let decoded = self
                    .surface
                    .decode(&work.input)
                    .map_err(decode_error)?;
                work.decoded = true;
                decoded
            }
            Stage::HorizontalPadding => {
                add_horizontal_padding(&work.buffer, options.effective_horizontal_adjustment())
            }
            Stage::ResizeToSquare => {
                resize_to_square(self.surface, &work.buffer, options.output_size)
                    .map_err(surface_error(stage))?
            }
            Stage::EdgePadding => add_edge_padding(&work.buffer, border),
            Stage::Grayscale => {
                let gray = ensure_grayscale(&work.buffer);
                work.original = Some(std::mem::replace(&mut work.buffer, gray));
                return Ok(None);
            }
            Stage::Contrast => {
                if options.contrast == ContrastMode::Auto {
                    let two_tone = is_two_tone_image(&work.buffer);
                    tracing::debug!(two_tone, "auto contrast classification");
                    if two_tone {
                        return Ok(Some("input is two-tone"));
                    }
                }
                increase_contrast(&work.buffer)
            }
            Stage::Invert => invert_image(&work.buffer),
            Stage::Border => add_content_border(&work.buffer, border),
            Stage::Texture => {
                let white = self.textures.load(self.surface, WHITE_TEXTURE)?;
                let color = self
                    .textures
                    .load(self.surface, options.variant.texture_name())?;
                apply_textures(
                    self.surface,
                    &work.buffer,
                    &white,
                    &color,
                    options.smooth_blend,
                    work.original.as_ref(),
                )
                .map_err(surface_error(stage))?
            }
            Stage::Crop => crop_to_content(&work.buffer),
            Stage::DropShadow => apply_drop_shadow(&work.buffer),
            Stage::AspectPadding => add_aspect_ratio_padding(&work.buffer),
            Stage::Encode => {
                work.png = self
                    .surface
                    .encode_png(&work.buffer)
                    .map_err(surface_error(stage))?;
                return Ok(None);
            }
        };
        work.buffer = next;
        Ok(None)
    }
}
