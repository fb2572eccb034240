//! Window layout loaded from JSON.
//!
//! ```json
//! {
//!   "windows": [
//!     { "title": "left",  "width": 320, "height": 240, "pattern": "gradient" },
//!     { "title": "right", "width": 160, "height": 160, "pattern": "checker" }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::demo::Pattern;

/// One window to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub pattern: Pattern,
}

/// Set of windows the demo opens at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub windows: Vec<WindowSpec>,
}

impl Layout {
    /// `count` identical windows titled "window 1", "window 2", ...
    pub fn uniform(count: u32, width: u32, height: u32, pattern: Pattern) -> Self {
        let windows = (1..=count)
            .map(|n| WindowSpec {
                title: format!("window {n}"),
                width,
                height,
                pattern,
            })
            .collect();
        Self { windows }
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(source).context("invalid layout JSON")?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read layout {}", path.display()))?;
        Self::from_json(&source).with_context(|| format!("in layout {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.windows.is_empty() {
            bail!("layout contains no windows");
        }
        for spec in &self.windows {
            if spec.width == 0 || spec.height == 0 {
                bail!(
                    "window \"{}\" has empty dimensions {}x{}",
                    spec.title,
                    spec.width,
                    spec.height
                );
            }
        }
        Ok(())
    }
}
