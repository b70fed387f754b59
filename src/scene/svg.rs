use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use kurbo::Size;

use crate::animation::ease::Ease;
use crate::animation::reveal::RevealStep;
use crate::foundation::core::{LineId, Millis, TileId};
use crate::routing::router::Connection;
use crate::scene::{LinePhase, LineStyle, Scene, TileTransition};

pub const LINE_CLASS: &str = "icon-grid-connecting-line";

#[derive(Clone, Debug)]
struct OverlayLine {
    d: String,
    length: f64,
    style: LineStyle,
    from: f64,
    to: f64,
    started: Millis,
    duration: Millis,
    ease: Ease,
}

impl OverlayLine {
    /// Stroke dash offset at `now`: `length` is hidden, 0 fully drawn, `-length` wiped.
    fn dash_offset(&self, now: Millis) -> f64 {
        if self.duration == Millis::ZERO {
            return self.to;
        }
        let t = now.since(self.started).0 as f64 / self.duration.0 as f64;
        self.from + (self.to - self.from) * self.ease.apply(t)
    }
}

/// In-memory line overlay that can be rendered to standalone SVG at any instant.
#[derive(Debug)]
pub struct SvgOverlay {
    size: Size,
    now: Millis,
    lines: BTreeMap<LineId, OverlayLine>,
    active_tiles: BTreeSet<TileId>,
    revealed: BTreeSet<TileId>,
    expanded: bool,
    vertical_offset: f64,
}

impl SvgOverlay {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            now: Millis::ZERO,
            lines: BTreeMap::new(),
            active_tiles: BTreeSet::new(),
            revealed: BTreeSet::new(),
            expanded: false,
            vertical_offset: 0.0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn active_tiles(&self) -> &BTreeSet<TileId> {
        &self.active_tiles
    }

    pub fn revealed_tiles(&self) -> &BTreeSet<TileId> {
        &self.revealed
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn vertical_offset(&self) -> f64 {
        self.vertical_offset
    }

    pub fn dash_offset(&self, line: LineId, now: Millis) -> Option<f64> {
        self.lines.get(&line).map(|l| l.dash_offset(now))
    }

    pub fn render(&self, now: Millis) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.size.width,
            h = self.size.height,
        );
        for line in self.lines.values() {
            let offset = line.dash_offset(now);
            // A wiped line is kept only until its removal; skip it like a hidden element.
            if offset <= -line.length && line.length > 0.0 {
                continue;
            }
            let _ = write!(
                out,
                r#"<path class="{LINE_CLASS}" d="{d}" fill="none" stroke="{color}" stroke-width="{width}" stroke-dasharray="{len:.3}" stroke-dashoffset="{offset:.3}"/>"#,
                d = line.d,
                color = escape_attr(&line.style.color),
                width = line.style.stroke_width,
                len = line.length,
            );
        }
        out.push_str("</svg>");
        out
    }
}

fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '"', '<', '>']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

impl Scene for SvgOverlay {
    fn advance_clock(&mut self, now: Millis) {
        self.now = now;
    }

    fn transition_tile(&mut self, tile: TileId, transition: &TileTransition) {
        if transition.active {
            self.active_tiles.insert(tile);
        } else {
            self.active_tiles.remove(&tile);
        }
    }

    fn reveal_tile(&mut self, step: &RevealStep) {
        self.revealed.insert(step.tile);
    }

    fn mark_expanded(&mut self) {
        self.expanded = true;
    }

    fn insert_line(&mut self, line: LineId, connection: &Connection, style: &LineStyle) {
        let length = connection.length();
        self.lines.insert(
            line,
            OverlayLine {
                d: connection.path_description(),
                length,
                style: style.clone(),
                from: length,
                to: length,
                started: self.now,
                duration: Millis::ZERO,
                ease: Ease::Linear,
            },
        );
    }

    fn animate_line(&mut self, line: LineId, phase: LinePhase, duration: Millis, ease: Ease) {
        let now = self.now;
        let Some(entry) = self.lines.get_mut(&line) else {
            return;
        };
        entry.from = entry.dash_offset(now);
        entry.to = match phase {
            LinePhase::Drawn => 0.0,
            LinePhase::Erased => -entry.length,
        };
        entry.started = now;
        entry.duration = duration;
        entry.ease = ease;
    }

    fn remove_line(&mut self, line: LineId) {
        self.lines.remove(&line);
    }

    fn set_vertical_offset(&mut self, offset: f64) {
        self.vertical_offset = offset;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/svg.rs"]
mod tests;
