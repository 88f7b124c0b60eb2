//! Diagram rendering.
//!
//! A [`Renderer`] turns laid-out positions plus the chain annotation into a drawable document.
//! [`svg::SvgRenderer`] is the default implementation.

pub mod svg;

use crate::core::models::annotation::ChainAnnotation;
use crate::core::models::sequence::Sequence;
use ::svg::Document;
use nalgebra::Point2;

/// Everything a renderer needs to draw one chain.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub positions: &'a [Point2<f64>],
    pub annotation: &'a ChainAnnotation,
    pub sequence: &'a Sequence,
    /// Nominal extent of the layout, used when there are no positions to fit.
    pub dimensions: f64,
    /// Label residues by residue ID instead of their one-letter code.
    pub use_residue_ids: bool,
}

pub trait Renderer {
    fn draw(&self, input: &RenderInput<'_>) -> Document;
}
