//! Board layout: peg lattice and slot geometry
//!
//! Pegs form a staggered triangle. Row `r` holds `r + 1` pegs, except the
//! last row which holds one peg per slot, spaced at the slot width so the
//! bottom of the lattice lines up with the slot boundaries. Every row is
//! centered on the last row.
//!
//! A layout is an immutable snapshot. Resizing builds a new one and swaps
//! it in; nothing patches an existing layout.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Peg;
use crate::consts::LABEL_OFFSET;
use crate::settings::BoardSettings;

/// Logical board size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardDims {
    pub width: f32,
    pub height: f32,
}

impl BoardDims {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Derived board geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardLayout {
    pub dims: BoardDims,
    pub side_margin: f32,
    pub top_margin: f32,
    pub peg_radius: f32,
    pub pegs: Vec<Peg>,
    /// Slot boundary x coordinates, `slots + 1` entries from left to right
    pub slot_edges: Vec<f32>,
    /// y of the line separating the peg field from the slots
    pub slot_line_y: f32,
    pub multipliers: Vec<f32>,
}

impl BoardLayout {
    /// Build the full layout for the given dimensions
    ///
    /// Pure function of its inputs: calling it twice with the same arguments
    /// yields identical geometry.
    pub fn build(dims: BoardDims, board: &BoardSettings, multipliers: &[f32]) -> Self {
        let slots = multipliers.len();
        let board_w = dims.width - board.side_margin * 2.0;
        let slot_w = if slots > 0 { board_w / slots as f32 } else { 0.0 };

        let pegs = peg_lattice(
            board.rows,
            slots,
            board.side_margin,
            board.top_margin + board.peg_start_offset,
            slot_w,
            board.row_spacing,
            board.peg_radius,
        );

        let slot_edges = (0..=slots)
            .map(|i| board.side_margin + i as f32 * slot_w)
            .collect();

        Self {
            dims,
            side_margin: board.side_margin,
            top_margin: board.top_margin,
            peg_radius: board.peg_radius,
            pegs,
            slot_edges,
            slot_line_y: dims.height - board.bottom_margin,
            multipliers: multipliers.to_vec(),
        }
    }

    /// Number of scoring slots
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.multipliers.len()
    }

    /// Inner board width between the side margins
    #[inline]
    pub fn board_width(&self) -> f32 {
        self.dims.width - self.side_margin * 2.0
    }

    #[inline]
    pub fn slot_width(&self) -> f32 {
        self.board_width() / self.slot_count() as f32
    }

    /// Left edge of the scoring area
    #[inline]
    pub fn left_edge(&self) -> f32 {
        self.side_margin
    }

    /// Horizontal center of the board
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.side_margin + self.board_width() / 2.0
    }

    /// Horizontal range a ball center may occupy: `(left, right)`
    pub fn inner_bounds(&self, ball_radius: f32) -> (f32, f32) {
        (
            self.side_margin + ball_radius,
            self.dims.width - self.side_margin - ball_radius,
        )
    }

    /// y at which a ball center counts as landed
    #[inline]
    pub fn landing_y(&self, ball_radius: f32) -> f32 {
        self.slot_line_y - ball_radius
    }

    /// Slot index for a landing x, always within `[0, slots - 1]`
    pub fn slot_for_x(&self, x: f32) -> usize {
        let last = self.slot_count().saturating_sub(1);
        let raw = ((x - self.left_edge()) / self.slot_width()).floor();
        // NaN (degenerate board) casts to 0
        if raw <= 0.0 || raw.is_nan() {
            0
        } else {
            (raw as usize).min(last)
        }
    }

    pub fn multiplier(&self, slot: usize) -> f32 {
        self.multipliers.get(slot).copied().unwrap_or(0.0)
    }

    /// Center x of a slot
    pub fn slot_center(&self, slot: usize) -> f32 {
        self.side_margin + slot as f32 * self.slot_width() + self.slot_width() / 2.0
    }

    /// Anchor for the `x{multiplier}` label under each slot
    pub fn label_anchors(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        let y = self.slot_line_y + LABEL_OFFSET;
        self.multipliers
            .iter()
            .enumerate()
            .map(move |(i, m)| (Vec2::new(self.slot_center(i), y), *m))
    }
}

/// Lay out the triangular lattice, centered on the final row
fn peg_lattice(
    rows: u32,
    slots: usize,
    side_margin: f32,
    start_y: f32,
    slot_w: f32,
    spacing: f32,
    peg_radius: f32,
) -> Vec<Peg> {
    let last_row_count = slots;
    let last_row_first_x = side_margin + slot_w / 2.0;
    let last_row_width = last_row_count.saturating_sub(1) as f32 * slot_w;

    let mut pegs = Vec::new();
    for row in 0..rows {
        let count = if row == rows - 1 {
            last_row_count
        } else {
            row as usize + 1
        };

        let row_width = count.saturating_sub(1) as f32 * slot_w;
        let center_offset = (last_row_width - row_width) / 2.0;
        let first_x = last_row_first_x + center_offset;
        let y = start_y + row as f32 * spacing;

        pegs.extend((0..count).map(|i| Peg {
            pos: Vec2::new(first_x + i as f32 * slot_w, y),
            radius: peg_radius,
        }));
    }
    pegs
}
