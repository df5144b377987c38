use std::path::Path;

use anyhow::Context as _;

use crate::{
    controls::ControlSpec,
    foundation::error::{AcuityError, AcuityResult},
    render::gradient::{BandStrategy, GradientOpts},
};

/// Top-level configuration, usually read from JSON. Every field has a default.
///
/// ```json
/// {
///   "prescription": { "min": -6.0, "max": 6.0, "step": 0.01, "initial": 0.0 },
///   "render": { "strategy": "cropped", "parallel": true, "threads": 4 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcuityConfig {
    /// Range of the prescription input.
    pub prescription: ControlSpec,
    /// Range of the correction input.
    pub correction: ControlSpec,
    /// Render tuning.
    pub render: RenderConfig,
}

/// Render tuning knobs.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// How band scratch images are produced.
    pub strategy: BandStrategy,
    /// Compute bands in parallel.
    pub parallel: bool,
    /// Worker thread count for parallel mode. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl AcuityConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> AcuityResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| AcuityError::serde(format!("config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> AcuityResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> AcuityResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AcuityError::serde(e.to_string()))
    }

    /// Validate both control ranges and the thread count.
    pub fn validate(&self) -> AcuityResult<()> {
        self.prescription
            .validate()
            .map_err(|e| AcuityError::validation(format!("prescription: {e}")))?;
        self.correction
            .validate()
            .map_err(|e| AcuityError::validation(format!("correction: {e}")))?;
        if let Some(n) = self.render.threads
            && n == 0
        {
            return Err(AcuityError::validation(
                "render 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }

    /// Renderer options derived from the `render` section.
    pub fn gradient_opts(&self) -> GradientOpts {
        GradientOpts {
            strategy: self.render.strategy,
            parallel: self.render.parallel,
        }
    }
}
