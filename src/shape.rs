//! Shape providers: interlock anchor layouts and picking radii.
//!
//! The simulation never sees geometry; a provider only yields the anchor
//! list and a bounding-sphere radius, and the embedding renderer supplies
//! the actual mesh. Construction failures degrade to a plain fallback
//! body so a bad parameter set cannot take down scene setup.

use glam::Vec3;

use crate::body::{BodyShape, InterlockPoint};
use crate::error::EngineError;

/// Bounding radius of the fallback body.
const FALLBACK_RADIUS: f32 = 0.75;

/// Anchor layout plus picking radius for one body.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeData {
    /// Interlock capability handed to the body registry.
    pub shape: BodyShape,
    /// Bounding-sphere radius for picking.
    pub bounding_radius: f32,
}

/// Produces the simulation-side data for one shape family.
pub trait ShapeProvider {
    /// Human-readable provider name, used in construction diagnostics.
    fn name(&self) -> &str;

    /// Build the anchor layout.
    ///
    /// # Errors
    /// Returns [`EngineError::ShapeConstruction`] when the parameters
    /// cannot produce a valid layout.
    fn build(&self) -> Result<ShapeData, EngineError>;
}

/// Build from a provider, degrading to a simple anchor-free body when
/// construction fails.
#[must_use]
pub fn build_or_fallback(provider: &dyn ShapeProvider) -> ShapeData {
    match provider.build() {
        Ok(data) => data,
        Err(err) => {
            log::warn!("shape '{}' failed to build: {err}; using fallback", provider.name());
            ShapeData {
                shape: BodyShape::Simple,
                bounding_radius: FALLBACK_RADIUS,
            }
        }
    }
}

fn require_positive(name: &str, field: &str, value: f32) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::ShapeConstruction(format!(
            "{name}: {field} must be finite and positive, got {value}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Built-in providers
// ---------------------------------------------------------------------------

/// Torus with hook anchors spaced around the outer equator.
#[derive(Debug, Clone, Copy)]
pub struct HookedTorus {
    /// Ring radius.
    pub radius: f32,
    /// Tube radius.
    pub tube: f32,
}

impl ShapeProvider for HookedTorus {
    fn name(&self) -> &str {
        "hooked-torus"
    }

    fn build(&self) -> Result<ShapeData, EngineError> {
        require_positive(self.name(), "radius", self.radius)?;
        require_positive(self.name(), "tube", self.tube)?;
        let reach = self.radius + self.tube;
        let points = (0..4)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let angle = i as f32 * std::f32::consts::FRAC_PI_2;
                let normal = Vec3::new(angle.cos(), 0.0, angle.sin());
                InterlockPoint { position: normal * reach, normal }
            })
            .collect();
        Ok(ShapeData {
            shape: BodyShape::Interlockable(points),
            bounding_radius: reach,
        })
    }
}

/// Cube with one anchor per face.
#[derive(Debug, Clone, Copy)]
pub struct PuzzleCube {
    /// Edge length.
    pub size: f32,
}

impl ShapeProvider for PuzzleCube {
    fn name(&self) -> &str {
        "puzzle-cube"
    }

    fn build(&self) -> Result<ShapeData, EngineError> {
        require_positive(self.name(), "size", self.size)?;
        let h = self.size / 2.0;
        let normals = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        let points = normals
            .iter()
            .map(|&normal| InterlockPoint { position: normal * h, normal })
            .collect();
        Ok(ShapeData {
            shape: BodyShape::Interlockable(points),
            bounding_radius: h * 3f32.sqrt(),
        })
    }
}

/// Helical arm with an anchor at each end of its main diagonal.
#[derive(Debug, Clone, Copy)]
pub struct SpiralArm {
    /// Overall reach from the center.
    pub radius: f32,
}

impl ShapeProvider for SpiralArm {
    fn name(&self) -> &str {
        "spiral-arm"
    }

    fn build(&self) -> Result<ShapeData, EngineError> {
        require_positive(self.name(), "radius", self.radius)?;
        let diagonal = Vec3::ONE.normalize();
        let points = vec![
            InterlockPoint { position: diagonal * self.radius, normal: diagonal },
            InterlockPoint {
                position: -diagonal * self.radius,
                normal: -diagonal,
            },
        ];
        Ok(ShapeData {
            shape: BodyShape::Interlockable(points),
            bounding_radius: self.radius * 1.1,
        })
    }
}

/// Interwoven knot with four axial anchors extended past the body.
#[derive(Debug, Clone, Copy)]
pub struct EntangledKnot {
    /// Core radius.
    pub radius: f32,
}

impl ShapeProvider for EntangledKnot {
    fn name(&self) -> &str {
        "entangled-knot"
    }

    fn build(&self) -> Result<ShapeData, EngineError> {
        require_positive(self.name(), "radius", self.radius)?;
        // Anchors sit past the surface so two knots interlock arm to arm.
        let reach = self.radius * 1.2;
        let normals = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y];
        let points = normals
            .iter()
            .map(|&normal| InterlockPoint { position: normal * reach, normal })
            .collect();
        Ok(ShapeData {
            shape: BodyShape::Interlockable(points),
            bounding_radius: self.radius * 1.3,
        })
    }
}
