//! GameView: maps game snapshots into a terminal framebuffer.
//!
//! One panel per player, side by side: the field in a box, with score,
//! level, lines, the next piece (local player only) and per-kind statistics
//! to its right. Only the visible rows are drawn; the overflow rows above
//! them stay hidden.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{appearance, get_shape, GameSnapshot};
use crate::fb::{FrameBuffer, Glyph, Rgb, Style};
use crate::palette::block_glyph;
use crate::types::{PieceKind, Rotation};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Banner drawn across the middle of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Paused,
    GameOver,
    Victory,
    ConnectionLost,
}

impl Overlay {
    pub fn text(self) -> &'static str {
        match self {
            Overlay::Paused => "PAUSED",
            Overlay::GameOver => "GAME OVER",
            Overlay::Victory => "VICTORY",
            Overlay::ConnectionLost => "CONNECTION LOST",
        }
    }
}

/// Everything needed to draw one player
#[derive(Debug, Clone, Copy)]
pub struct PlayerPanel<'a> {
    pub title: &'a str,
    pub snapshot: &'a GameSnapshot,
    pub next: Option<PieceKind>,
    pub overlay: Option<Overlay>,
}

const SIDE_W: u16 = 13;
const PANEL_GAP: u16 = 4;

const FIELD_BG: Style = Style::new(Rgb::new(60, 60, 70), Rgb::BLACK);
const BORDER: Style = Style::new(Rgb::new(200, 200, 200), Rgb::BLACK);
const LABEL: Style = Style::new(Rgb::new(150, 150, 160), Rgb::BLACK);
const VALUE: Style = Style::new(Rgb::new(240, 240, 240), Rgb::BLACK).bold();
const BANNER: Style = Style::new(Rgb::WHITE, Rgb::new(120, 0, 0)).bold();

/// A lightweight terminal renderer for one or two fields.
pub struct GameView {
    /// Field cell width in terminal columns.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self { cell_w: 2 }
    }
}

impl GameView {
    pub fn new(cell_w: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
        }
    }

    fn field_box(&self, snap: &GameSnapshot) -> (u16, u16) {
        let w = snap.field.width() as u16 * self.cell_w + 2;
        let h = snap.field.visible_height() as u16 + 2;
        (w, h)
    }

    fn panel_width(&self, panel: &PlayerPanel<'_>) -> u16 {
        self.field_box(panel.snapshot).0 + 1 + SIDE_W
    }

    /// Render all panels plus an optional status line into `fb`.
    ///
    /// Reuses `fb`'s allocation; it is resized to the viewport.
    pub fn render_into(
        &self,
        panels: &[PlayerPanel<'_>],
        status: Option<&str>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Glyph::default());

        let total_w: u16 = panels.iter().map(|p| self.panel_width(p)).sum::<u16>()
            + PANEL_GAP * panels.len().saturating_sub(1) as u16;
        let total_h = panels
            .iter()
            .map(|p| self.field_box(p.snapshot).1 + 1)
            .max()
            .unwrap_or(0);

        let mut x = viewport.width.saturating_sub(total_w) / 2;
        let y = viewport.height.saturating_sub(total_h + 2) / 2;

        for panel in panels {
            self.draw_panel(fb, panel, x, y);
            x += self.panel_width(panel) + PANEL_GAP;
        }

        if let Some(status) = status {
            let sy = (y + total_h + 1).min(viewport.height.saturating_sub(1));
            fb.put_str_centered(0, viewport.width, sy, status, LABEL);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        panels: &[PlayerPanel<'_>],
        status: Option<&str>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(panels, status, viewport, &mut fb);
        fb
    }

    fn draw_panel(&self, fb: &mut FrameBuffer, panel: &PlayerPanel<'_>, x: u16, y: u16) {
        let snap = panel.snapshot;
        let (box_w, box_h) = self.field_box(snap);

        fb.put_str_centered(x, box_w, y, panel.title, VALUE);
        let top = y + 1;
        fb.draw_box(x, top, box_w, box_h, BORDER);
        fb.fill_rect(x + 1, top + 1, box_w - 2, box_h - 2, Glyph::new(' ', FIELD_BG));

        let vh = snap.field.visible_height();
        for row in 0..vh {
            // row 0 is the floor, drawn last
            let sy = top + 1 + (vh - 1 - row) as u16;
            for (col, cell) in snap.field.row(row).iter().enumerate() {
                let sx = x + 1 + col as u16 * self.cell_w;
                for dx in 0..self.cell_w {
                    if let Some(glyph) = block_glyph(*cell, snap.level, dx) {
                        fb.set(sx + dx, sy, glyph);
                    }
                }
            }
        }

        if let Some(overlay) = panel.overlay {
            let text = format!(" {} ", overlay.text());
            fb.put_str_centered(x + 1, box_w - 2, top + box_h / 2, &text, BANNER);
        }

        self.draw_side(fb, panel, x + box_w + 1, top);
    }

    fn draw_side(&self, fb: &mut FrameBuffer, panel: &PlayerPanel<'_>, x: u16, y: u16) {
        let snap = panel.snapshot;
        let mut cy = y;

        for (label, value) in [
            ("SCORE", snap.score.to_string()),
            ("LEVEL", snap.level.to_string()),
            ("LINES", snap.lines.to_string()),
        ] {
            fb.put_str(x, cy, label, LABEL);
            fb.put_str(x, cy + 1, &value, VALUE);
            cy += 3;
        }

        if let Some(next) = panel.next {
            fb.put_str(x, cy, "NEXT", LABEL);
            self.draw_preview(fb, next, snap.level, x, cy + 1);
            cy += 4;
        }

        fb.put_str(x, cy, "STATS", LABEL);
        cy += 1;
        for kind in PieceKind::ALL {
            let line = format!("{:<2}{:>4}", kind.as_str(), snap.statistics[kind.index()]);
            fb.put_str(x, cy, &line, VALUE);
            cy += 1;
        }
    }

    /// Spawn-rotation piece in a 4 x 2 cell box
    fn draw_preview(&self, fb: &mut FrameBuffer, kind: PieceKind, level: u32, x: u16, y: u16) {
        let cell = appearance(kind);
        for (dx, dy) in get_shape(kind, Rotation::SPAWN) {
            let col = (dx + 2) as u16;
            let row = dy.max(0) as u16;
            for sub in 0..self.cell_w {
                if let Some(glyph) = block_glyph(cell, level, sub) {
                    fb.set(x + col * self.cell_w + sub, y + row, glyph);
                }
            }
        }
    }
}
