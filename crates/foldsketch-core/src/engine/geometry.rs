use super::schedule::ActivationMode;
use crate::core::forcefield::term::PotentialTerm;
use nalgebra::Point2;
use std::f64::consts::PI;

/// Shape of the starting layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialGeometry {
    /// Residues evenly spread on a circle; used when the first and last residue are in contact.
    Circle,
    /// An almost straight line with a small zig-zag to break symmetry.
    Line,
}

impl InitialGeometry {
    /// Picks the starting shape from the scheduled pair and stack terms.
    pub fn select(schedule: &[PotentialTerm], n: usize) -> Self {
        if is_closed(schedule, n) {
            InitialGeometry::Circle
        } else {
            InitialGeometry::Line
        }
    }

    /// A closed structure starts with every contact active; an open one folds from the 5' end.
    pub fn activation_mode(self) -> ActivationMode {
        match self {
            InitialGeometry::Circle => ActivationMode::Immediate,
            InitialGeometry::Line => ActivationMode::Phased,
        }
    }
}

/// True when some pair or stack term links residue `0` with residue `n - 1`.
pub fn is_closed(schedule: &[PotentialTerm], n: usize) -> bool {
    if n < 2 {
        return false;
    }
    schedule
        .iter()
        .filter(|t| matches!(t, PotentialTerm::Pair { .. } | PotentialTerm::Stack { .. }))
        .any(|t| t.touches(0) && t.touches(n - 1))
}

/// Nominal extent of an `n`-residue layout.
pub fn layout_dimensions(n: usize, unit_spacing: f64) -> f64 {
    unit_spacing * n.saturating_sub(1) as f64 * 0.7
}

pub fn initial_positions(
    geometry: InitialGeometry,
    n: usize,
    unit_spacing: f64,
) -> Vec<Point2<f64>> {
    let dimensions = layout_dimensions(n, unit_spacing);
    let centre = dimensions / 2.0;
    match geometry {
        InitialGeometry::Circle => {
            let radius = n as f64 * unit_spacing / (2.0 * PI);
            let theta = 2.0 * PI / n as f64;
            (0..n)
                .map(|k| {
                    let phi = k as f64 * theta + theta / 2.0;
                    Point2::new(-radius * phi.sin() + centre, radius * phi.cos() + centre)
                })
                .collect()
        }
        InitialGeometry::Line => (0..n)
            .map(|k| {
                let wiggle = if k % 2 == 0 { 0.1 } else { -0.1 };
                Point2::new(k as f64 * unit_spacing, wiggle + centre)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotation::PairClass;

    fn pair(i: usize, j: usize) -> PotentialTerm {
        PotentialTerm::pair(i, j, PairClass::Canonical)
    }

    #[test]
    fn contact_between_chain_ends_closes_the_structure() {
        let schedule = [pair(2, 6), pair(1, 7), pair(0, 8)];
        assert!(is_closed(&schedule, 9));
        assert_eq!(InitialGeometry::select(&schedule, 9), InitialGeometry::Circle);
        assert_eq!(
            InitialGeometry::Circle.activation_mode(),
            ActivationMode::Immediate
        );
    }

    #[test]
    fn interior_contacts_leave_the_structure_open() {
        let schedule = [pair(2, 8), pair(3, 7)];
        assert!(!is_closed(&schedule, 10));
        assert_eq!(InitialGeometry::select(&schedule, 10), InitialGeometry::Line);
        assert_eq!(InitialGeometry::Line.activation_mode(), ActivationMode::Phased);
        assert!(!is_closed(&[], 10));
    }

    #[test]
    fn angle_terms_do_not_close_the_structure() {
        assert!(!is_closed(&[PotentialTerm::angle(0, 4, 8)], 9));
    }

    #[test]
    fn circle_has_the_requested_circumference_and_centre() {
        let n = 9;
        let unit = 5.0;
        let positions = initial_positions(InitialGeometry::Circle, n, unit);
        assert_eq!(positions.len(), n);

        let centre = layout_dimensions(n, unit) / 2.0;
        let radius = n as f64 * unit / (2.0 * PI);
        for p in &positions {
            let r = ((p.x - centre).powi(2) + (p.y - centre).powi(2)).sqrt();
            assert!((r - radius).abs() < 1e-9);
        }
        let theta = 2.0 * PI / n as f64;
        assert!((positions[0].x - (-radius * (theta / 2.0).sin() + centre)).abs() < 1e-9);
        assert!((positions[0].y - (radius * (theta / 2.0).cos() + centre)).abs() < 1e-9);
    }

    #[test]
    fn line_is_evenly_spaced_with_alternating_offset() {
        let positions = initial_positions(InitialGeometry::Line, 4, 5.0);
        let centre = layout_dimensions(4, 5.0) / 2.0;
        assert!((centre - 5.25).abs() < 1e-12);
        let xs: Vec<f64> = positions.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 5.0, 10.0, 15.0]);
        assert!((positions[0].y - (centre + 0.1)).abs() < 1e-12);
        assert!((positions[1].y - (centre - 0.1)).abs() < 1e-12);
        assert!((positions[2].y - (centre + 0.1)).abs() < 1e-12);
    }
}
