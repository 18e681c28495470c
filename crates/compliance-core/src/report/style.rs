//! Cell styling, with a pluggable status → style step.

use crate::domain::ComplianceStatus;

/// Renderer-neutral description of how a cell looks. Colors are `0xRRGGBB`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    pub bold: bool,
    pub fill: Option<u32>,
    pub font_color: Option<u32>,
}

impl CellStyle {
    /// Column titles: bold white on black.
    pub fn header() -> Self {
        Self {
            bold: true,
            fill: Some(0x000000),
            font_color: Some(0xFFFFFF),
        }
    }

    pub fn body() -> Self {
        Self::default()
    }
}

/// Chooses the style of a `Result` cell from the check status.
pub trait StyleResolver: Send + Sync {
    fn status_style(&self, status: ComplianceStatus) -> CellStyle;
}

/// No status styling; every result cell looks like any other body cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyles;

impl StyleResolver for PlainStyles {
    fn status_style(&self, _status: ComplianceStatus) -> CellStyle {
        CellStyle::body()
    }
}

/// Green / red / amber fills, using Excel's stock "good / bad / neutral"
/// palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColors {
    pub passed: (u32, u32),
    pub failed: (u32, u32),
    pub warning: (u32, u32),
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            passed: (0xC6EFCE, 0x006100),
            failed: (0xFFC7CE, 0x9C0006),
            warning: (0xFFEB9C, 0x9C5700),
        }
    }
}

impl StyleResolver for StatusColors {
    fn status_style(&self, status: ComplianceStatus) -> CellStyle {
        let (fill, font) = match status {
            ComplianceStatus::Passed => self.passed,
            ComplianceStatus::Failed => self.failed,
            ComplianceStatus::Warning => self.warning,
        };
        CellStyle {
            bold: false,
            fill: Some(fill),
            font_color: Some(font),
        }
    }
}

/// The resolver selected by the `status_colors` setting.
pub fn resolver_for(status_colors: bool) -> Box<dyn StyleResolver> {
    if status_colors {
        Box::new(StatusColors::default())
    } else {
        Box::new(PlainStyles)
    }
}
