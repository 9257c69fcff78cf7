//! Typed analysis configuration and validation
//!
//! All quantities are held in SI base units (m, Pa). The
//! [`AnalysisConfig::from_engineering_units`] constructor accepts the common
//! engineering units (mm for thickness, N/mm² for stresses and modulus).

use serde::{Deserialize, Serialize};

/// Plate dimensions in meters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlateGeometry {
    /// Plate width along the x axis [m]
    pub width: f64,
    /// Plate height along the y axis [m]
    pub height: f64,
    /// Plate thickness [m]
    pub thickness: f64,
}

impl PlateGeometry {
    pub fn new(width: f64, height: f64, thickness: f64) -> Self {
        Self {
            width,
            height,
            thickness,
        }
    }
}

/// Isotropic elastic material
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Young's modulus [Pa]
    pub e: f64,
    /// Poisson's ratio [-]
    pub v: f64,
}

impl MaterialProperties {
    pub fn new(e: f64, v: f64) -> Self {
        Self { e, v }
    }

    /// Structural steel (E = 210000 N/mm², v = 0.3)
    pub fn steel() -> Self {
        Self::new(210_000.0e6, 0.3)
    }

    /// Aluminium (E = 70000 N/mm², v = 0.35)
    pub fn aluminium() -> Self {
        Self::new(70_000.0e6, 0.35)
    }
}

/// Biaxial in-plane edge stress state [Pa]
///
/// Negative components are compressive. At least one component must be
/// compressive for a buckling solution to exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoadCase {
    /// Edge stress applied on the x = ±width/2 edges [Pa]
    pub sigma_x: f64,
    /// Edge stress applied on the y = ±height/2 edges [Pa]
    pub sigma_y: f64,
}

impl LoadCase {
    pub fn new(sigma_x: f64, sigma_y: f64) -> Self {
        Self { sigma_x, sigma_y }
    }

    /// True when at least one component is compressive
    pub fn has_compression(&self) -> bool {
        self.sigma_x < 0.0 || self.sigma_y < 0.0
    }
}

/// Edge support selector (1..=5)
///
/// The x = ±width/2 edges always receive a z clamp. Values above 2 add the
/// y = +height/2 edge, values above 3 add the y = -height/2 edge as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportConfig(pub u8);

impl SupportConfig {
    pub fn clamps_top(&self) -> bool {
        self.0 > 2
    }

    pub fn clamps_bottom(&self) -> bool {
        self.0 > 3
    }

    pub fn is_valid(&self) -> bool {
        (1..=5).contains(&self.0)
    }
}

/// Complete, immutable input set for one buckling run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub geometry: PlateGeometry,
    pub material: MaterialProperties,
    pub load: LoadCase,
    /// Minimum number of elements along the shorter plate edge
    pub nelem: usize,
    /// Number of buckling modes to extract and reconstruct
    pub nmodes: usize,
    pub supports: SupportConfig,
}

impl Default for AnalysisConfig {
    /// Demonstration defaults: 1 m × 1 m steel plate, 10 mm thick,
    /// sigma_x = -100 N/mm², four supported edges, four modes.
    fn default() -> Self {
        Self {
            geometry: PlateGeometry::new(1.0, 1.0, 0.01),
            material: MaterialProperties::steel(),
            load: LoadCase::new(-100.0e6, 0.0),
            nelem: 10,
            nmodes: 4,
            supports: SupportConfig(4),
        }
    }
}

impl AnalysisConfig {
    /// Build a configuration from engineering units: thickness in mm,
    /// stresses and Young's modulus in N/mm².
    #[allow(clippy::too_many_arguments)]
    pub fn from_engineering_units(
        width_m: f64,
        height_m: f64,
        thickness_mm: f64,
        nelem: usize,
        sigma_x_mpa: f64,
        sigma_y_mpa: f64,
        nmodes: usize,
        supports: u8,
        e_mpa: f64,
        v: f64,
    ) -> Self {
        Self {
            geometry: PlateGeometry::new(width_m, height_m, thickness_mm / 1000.0),
            material: MaterialProperties::new(e_mpa * 1.0e6, v),
            load: LoadCase::new(sigma_x_mpa * 1.0e6, sigma_y_mpa * 1.0e6),
            nelem,
            nmodes,
            supports: SupportConfig(supports),
        }
    }

    /// Check every constraint and report all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut violations = Vec::new();

        if self.geometry.width <= 0.0 {
            violations.push(ConfigViolation::WidthNotPositive(self.geometry.width));
        }
        if self.geometry.height <= 0.0 {
            violations.push(ConfigViolation::HeightNotPositive(self.geometry.height));
        }
        if self.geometry.thickness <= 0.0 {
            violations.push(ConfigViolation::ThicknessNotPositive(
                self.geometry.thickness,
            ));
        }
        if self.nelem < 1 {
            violations.push(ConfigViolation::ElementCountZero);
        }
        if !self.load.has_compression() {
            violations.push(ConfigViolation::NoCompressiveStress);
        }
        if !self.supports.is_valid() {
            violations.push(ConfigViolation::SupportsOutOfRange(self.supports.0));
        }
        if self.material.e <= 0.0 {
            violations.push(ConfigViolation::YoungsModulusNotPositive(self.material.e));
        }
        if !(0.0..=0.5).contains(&self.material.v) {
            violations.push(ConfigViolation::PoissonRatioOutOfRange(self.material.v));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { violations })
        }
    }
}

/// A single violated input constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigViolation {
    WidthNotPositive(f64),
    HeightNotPositive(f64),
    ThicknessNotPositive(f64),
    ElementCountZero,
    NoCompressiveStress,
    SupportsOutOfRange(u8),
    YoungsModulusNotPositive(f64),
    PoissonRatioOutOfRange(f64),
}

impl std::fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WidthNotPositive(w) => write!(f, "plate width must be > 0, got {w}"),
            Self::HeightNotPositive(h) => write!(f, "plate height must be > 0, got {h}"),
            Self::ThicknessNotPositive(t) => write!(f, "plate thickness must be > 0, got {t}"),
            Self::ElementCountZero => write!(f, "minimum element count must be >= 1"),
            Self::NoCompressiveStress => write!(
                f,
                "at least one stress component must be negative (compressive)"
            ),
            Self::SupportsOutOfRange(s) => {
                write!(f, "support configuration must be in 1..=5, got {s}")
            }
            Self::YoungsModulusNotPositive(e) => {
                write!(f, "Young's modulus must be > 0, got {e}")
            }
            Self::PoissonRatioOutOfRange(v) => {
                write!(f, "Poisson's ratio must be in [0, 0.5], got {v}")
            }
        }
    }
}

/// All constraint violations found in one configuration
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} constraint(s) violated: ", self.violations.len())?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
