use super::{RenderInput, Renderer};
use crate::core::models::annotation::{Interaction, InteractionKind, PairClass};
use nalgebra::Point2;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Line, Path, Rectangle, Text};

const BACKBONE_COLOR: &str = "#7f7f7f";
const CANONICAL_COLOR: &str = "#1f77b4";
const NON_CANONICAL_COLOR: &str = "#d62728";
const STACK_COLOR: &str = "#2ca02c";

/// Draws residues as labelled discs joined by the backbone, with one line per annotated contact.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub residue_radius: f64,
    pub margin: f64,
    /// Output pixels per layout unit.
    pub scale: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            residue_radius: 1.8,
            margin: 4.0,
            scale: 8.0,
        }
    }
}

impl SvgRenderer {
    fn view_box(&self, positions: &[Point2<f64>], dimensions: f64) -> (f64, f64, f64, f64) {
        let Some(first) = positions.first() else {
            return (
                -self.margin,
                -self.margin,
                dimensions + 2.0 * self.margin,
                dimensions + 2.0 * self.margin,
            );
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in positions {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (
            min_x - self.margin,
            min_y - self.margin,
            (max_x - min_x) + 2.0 * self.margin,
            (max_y - min_y) + 2.0 * self.margin,
        )
    }

    fn backbone(&self, input: &RenderInput<'_>) -> Group {
        let mut group = Group::new().set("class", "backbone");
        let ids = input.sequence.residue_ids();
        let mut data: Option<Data> = None;

        for (k, p) in input.positions.iter().enumerate() {
            let contiguous = k > 0
                && ids
                    .get(k)
                    .zip(ids.get(k - 1))
                    .is_some_and(|(a, b)| a - b == 1);
            data = Some(match data {
                Some(d) if contiguous => d.line_to((p.x, p.y)),
                Some(d) => {
                    group = group.add(Self::backbone_path(d));
                    let prev = input.positions[k - 1];
                    group = group.add(
                        Line::new()
                            .set("x1", prev.x)
                            .set("y1", prev.y)
                            .set("x2", p.x)
                            .set("y2", p.y)
                            .set("stroke", BACKBONE_COLOR)
                            .set("stroke-width", 0.4)
                            .set("stroke-dasharray", "1,1"),
                    );
                    Data::new().move_to((p.x, p.y))
                }
                None => Data::new().move_to((p.x, p.y)),
            });
        }
        if let Some(d) = data {
            group = group.add(Self::backbone_path(d));
        }
        group
    }

    fn backbone_path(data: Data) -> Path {
        Path::new()
            .set("fill", "none")
            .set("stroke", BACKBONE_COLOR)
            .set("stroke-width", 0.6)
            .set("d", data)
    }

    fn contact_line(interaction: &Interaction, a: &Point2<f64>, b: &Point2<f64>) -> Line {
        let line = Line::new()
            .set("x1", a.x)
            .set("y1", a.y)
            .set("x2", b.x)
            .set("y2", b.y)
            .set("stroke-opacity", interaction.frequency.clamp(0.05, 1.0));
        match interaction.kind {
            InteractionKind::Pair(PairClass::Canonical) => line
                .set("stroke", CANONICAL_COLOR)
                .set("stroke-width", 0.8),
            InteractionKind::Pair(PairClass::NonCanonical) => line
                .set("stroke", NON_CANONICAL_COLOR)
                .set("stroke-width", 0.5)
                .set("stroke-dasharray", "1.2,0.8"),
            InteractionKind::Stack => line
                .set("stroke", STACK_COLOR)
                .set("stroke-width", 0.4)
                .set("stroke-dasharray", "0.3,0.6"),
        }
    }

    fn contacts(&self, input: &RenderInput<'_>) -> Group {
        input
            .annotation
            .interactions()
            .iter()
            .filter_map(|x| {
                let a = input.positions.get(x.i)?;
                let b = input.positions.get(x.j)?;
                Some(Self::contact_line(x, a, b))
            })
            .fold(Group::new().set("class", "contacts"), |group, line| {
                group.add(line)
            })
    }

    fn residues(&self, input: &RenderInput<'_>) -> Group {
        let font_size = self.residue_radius * 1.1;
        let mut group = Group::new().set("class", "residues");
        for (k, p) in input.positions.iter().enumerate() {
            let label = if input.use_residue_ids {
                input
                    .sequence
                    .residue_id(k)
                    .map(|id| id.to_string())
                    .unwrap_or_default()
            } else {
                input
                    .sequence
                    .letter(k)
                    .map(String::from)
                    .unwrap_or_default()
            };
            group = group
                .add(
                    Circle::new()
                        .set("cx", p.x)
                        .set("cy", p.y)
                        .set("r", self.residue_radius)
                        .set("fill", "white")
                        .set("stroke", "black")
                        .set("stroke-width", 0.3),
                )
                .add(
                    Text::new(label)
                        .set("x", p.x)
                        .set("y", p.y)
                        .set("font-family", "monospace")
                        .set("font-size", font_size)
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "central"),
                );
        }
        group
    }
}

impl Renderer for SvgRenderer {
    fn draw(&self, input: &RenderInput<'_>) -> Document {
        let (x, y, width, height) = self.view_box(input.positions, input.dimensions);
        Document::new()
            .set("viewBox", (x, y, width, height))
            .set("width", width * self.scale)
            .set("height", height * self.scale)
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", y)
                    .set("width", width)
                    .set("height", height)
                    .set("fill", "white"),
            )
            .add(self.backbone(input))
            .add(self.contacts(input))
            .add(self.residues(input))
    }
}
