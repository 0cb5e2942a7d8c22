//! # Clocktower Icons
//!
//! Turns an uploaded image into a stylized character icon: the artwork is
//! reduced to greyscale, binarized, optionally outlined with a white border,
//! and painted with a parchment texture plus a team-coloured texture.
//!
//! # Architecture: Pure Transforms + One Orchestrator
//!
//! ```text
//! bytes → [remove background] → decode → square → greyscale → contrast
//!       → invert → border → texture → crop → shadow → padding → PNG bytes
//! ```
//!
//! Every step is a pure function over a [`imaging::PixelBuffer`] that returns
//! a new buffer. The [`process::Pipeline`] decides which steps run and in what
//! order; nothing else in the crate knows the order. Codecs and resampling
//! sit behind the [`imaging::ImageSurface`] trait so the transform logic can
//! be tested against a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel buffers, codecs, and the transform library |
//! | [`process`] | Stage planning and the pipeline runner |
//! | [`removal`] | Background-removal adapter contract and the command-line remover |
//! | [`cache`] | Content-addressed cache in front of background removal |
//! | [`generate`] | Parallel batch generation over many input files |
//! | [`scan`] | Expands CLI paths into the list of input images |
//! | [`naming`] | `<stem>-<variant>.png` output names |
//! | [`types`] | Colour variants, contrast modes, and processing options |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No Filesystem in the Pipeline
//!
//! The pipeline takes bytes and returns bytes. Reading inputs and writing
//! icons is the caller's job ([`generate`] for the CLI). The one exception is
//! the [`imaging::TextureLoader`], which reads texture assets on first use
//! and keeps them for the life of the loader.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling, and PNG encoding use the `image` crate; SVG is
//! rasterized with `resvg`. There are no system dependencies.
//!
//! ## External Background Removal
//!
//! Segmentation models do not belong in this crate. Background removal is
//! any command that filters an image from stdin to stdout, configured in
//! `config.toml`, and results are cached by the SHA-256 of the input.

pub mod cache;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod removal;
pub mod scan;
pub mod types;
