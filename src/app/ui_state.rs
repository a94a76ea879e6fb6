use crate::export::ExportFormat;
use crate::transform::{ColorMapping, CurveParams, RemapParams, TransformSpec};
use egui::Color32;
use egui_file_dialog::FileDialog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidePanelPosition {
    Left,
    Right,
}

pub struct UiState {
    pub(super) side_open: bool,
    pub(super) side_position: SidePanelPosition,
    pub(super) info_window_open: bool,
    pub(super) last_status: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            side_open: true,
            side_position: SidePanelPosition::Right,
            info_window_open: false,
            last_status: None,
        }
    }
}

#[derive(Debug)]
pub enum NativeDialog {
    Open(FileDialog),
    Export {
        dialog: FileDialog,
        format: ExportFormat,
    },
}

/// One editable row of the color remap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapRow {
    pub(super) from: Color32,
    pub(super) to: Color32,
}

impl Default for RemapRow {
    fn default() -> Self {
        Self {
            from: Color32::WHITE,
            to: Color32::BLACK,
        }
    }
}

/// Unapplied palette settings edited in the side panel.
pub struct AdjustState {
    pub(super) curve: CurveParams,
    pub(super) threshold_enabled: bool,
    pub(super) threshold_level: f32,
    pub(super) remap_rows: Vec<RemapRow>,
    pub(super) remap_tolerance: u8,
    pub(super) export_format: ExportFormat,
}

impl AdjustState {
    pub(super) fn new(export_format: ExportFormat) -> Self {
        Self {
            curve: CurveParams::default(),
            threshold_enabled: false,
            threshold_level: 0.5,
            remap_rows: vec![RemapRow::default()],
            remap_tolerance: 0,
            export_format,
        }
    }

    pub(super) fn curve_spec(&self) -> TransformSpec {
        TransformSpec::Curves(CurveParams {
            threshold: self.threshold_enabled.then_some(self.threshold_level),
            ..self.curve
        })
    }

    pub(super) fn remap_spec(&self) -> TransformSpec {
        let rgb = |c: Color32| [c.r(), c.g(), c.b()];
        TransformSpec::Remap(RemapParams {
            entries: self
                .remap_rows
                .iter()
                .map(|row| ColorMapping {
                    from: rgb(row.from),
                    to: rgb(row.to),
                })
                .collect(),
            tolerance: self.remap_tolerance,
        })
    }

    pub(super) fn reset_curve(&mut self) {
        self.curve = CurveParams::default();
        self.threshold_enabled = false;
    }
}
