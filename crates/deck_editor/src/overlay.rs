//! Grid and alignment-guide overlays drawn over the slide as SVG.

use std::fmt::Write;

use crate::geometry::{Rect, Size, DEFAULT_GRID_SIZE};
use crate::surface::{ElementId, RenderSurface};

/// Distance in pixels within which edges count as aligned.
pub const DEFAULT_GUIDE_THRESHOLD: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GridOverlay {
    pub grid_size: f64,
    pub color: String,
    pub opacity: f64,
    /// Every n-th line is drawn heavier; 0 disables.
    pub major_every: u32,
}

impl Default for GridOverlay {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            color: "#3b82f6".to_string(),
            opacity: 0.15,
            major_every: 8,
        }
    }
}

impl GridOverlay {
    pub fn new(grid_size: f64) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    /// Grid line offsets along one axis, excluding the edges.
    pub fn lines(&self, extent: f64) -> Vec<f64> {
        if self.grid_size <= 0.0 || !self.grid_size.is_finite() {
            return Vec::new();
        }
        let mut lines = Vec::new();
        let mut offset = self.grid_size;
        while offset < extent {
            lines.push(offset);
            offset += self.grid_size;
        }
        lines
    }

    pub fn render_svg(&self, size: Size) -> String {
        let mut minor = String::new();
        let mut major = String::new();
        for (i, x) in self.lines(size.width).into_iter().enumerate() {
            let path = if self.is_major(i) { &mut major } else { &mut minor };
            let _ = write!(path, "M{x} 0V{} ", size.height);
        }
        for (i, y) in self.lines(size.height).into_iter().enumerate() {
            let path = if self.is_major(i) { &mut major } else { &mut minor };
            let _ = write!(path, "M0 {y}H{} ", size.width);
        }

        let mut svg = svg_open(size);
        if !minor.is_empty() {
            let _ = write!(
                svg,
                r#"<path d="{}" stroke="{}" stroke-opacity="{}" stroke-width="1" fill="none"/>"#,
                minor.trim_end(),
                self.color,
                self.opacity
            );
        }
        if !major.is_empty() {
            let _ = write!(
                svg,
                r#"<path d="{}" stroke="{}" stroke-opacity="{}" stroke-width="1.5" fill="none"/>"#,
                major.trim_end(),
                self.color,
                (self.opacity * 2.0).min(1.0)
            );
        }
        svg.push_str("</svg>");
        svg
    }

    fn is_major(&self, index: usize) -> bool {
        self.major_every > 0 && (index + 1) % self.major_every as usize == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideOrientation {
    /// A line of constant x.
    Vertical,
    /// A line of constant y.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideKind {
    Edge,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub orientation: GuideOrientation,
    pub position: f64,
    pub kind: GuideKind,
}

fn vertical_lines(rect: &Rect) -> [(f64, GuideKind); 3] {
    [
        (rect.x, GuideKind::Edge),
        (rect.center().x, GuideKind::Center),
        (rect.right(), GuideKind::Edge),
    ]
}

fn horizontal_lines(rect: &Rect) -> [(f64, GuideKind); 3] {
    [
        (rect.y, GuideKind::Edge),
        (rect.center().y, GuideKind::Center),
        (rect.bottom(), GuideKind::Edge),
    ]
}

/// Guides where `active` lines up with a sibling or with the slide centre.
pub fn alignment_guides<S: RenderSurface + ?Sized>(
    surface: &S,
    active: ElementId,
    threshold: f64,
) -> Vec<Guide> {
    let Some(active_rect) = surface.bounding_rect(active) else {
        return Vec::new();
    };
    let mut targets: Vec<Rect> = surface
        .siblings(active)
        .into_iter()
        .filter_map(|sibling| surface.bounding_rect(sibling))
        .collect();

    let mut guides = Vec::new();
    if let Some(body) = surface.body_rect() {
        let center = body.center();
        if (active_rect.center().x - center.x).abs() <= threshold {
            guides.push(Guide {
                orientation: GuideOrientation::Vertical,
                position: center.x,
                kind: GuideKind::Center,
            });
        }
        if (active_rect.center().y - center.y).abs() <= threshold {
            guides.push(Guide {
                orientation: GuideOrientation::Horizontal,
                position: center.y,
                kind: GuideKind::Center,
            });
        }
    }

    for target in targets.drain(..) {
        for (line, _) in vertical_lines(&active_rect) {
            for (candidate, kind) in vertical_lines(&target) {
                if (line - candidate).abs() <= threshold {
                    guides.push(Guide {
                        orientation: GuideOrientation::Vertical,
                        position: candidate,
                        kind,
                    });
                }
            }
        }
        for (line, _) in horizontal_lines(&active_rect) {
            for (candidate, kind) in horizontal_lines(&target) {
                if (line - candidate).abs() <= threshold {
                    guides.push(Guide {
                        orientation: GuideOrientation::Horizontal,
                        position: candidate,
                        kind,
                    });
                }
            }
        }
    }

    guides.sort_by(|a, b| {
        (a.orientation as u8)
            .cmp(&(b.orientation as u8))
            .then(a.position.total_cmp(&b.position))
    });
    guides.dedup_by(|a, b| a.orientation == b.orientation && a.position == b.position);
    guides
}

pub fn render_guides_svg(size: Size, guides: &[Guide]) -> String {
    let mut svg = svg_open(size);
    for guide in guides {
        let dash = match guide.kind {
            GuideKind::Edge => "",
            GuideKind::Center => r#" stroke-dasharray="4 4""#,
        };
        let _ = match guide.orientation {
            GuideOrientation::Vertical => write!(
                svg,
                r##"<line x1="{p}" y1="0" x2="{p}" y2="{h}" stroke="#ec4899" stroke-width="1"{dash}/>"##,
                p = guide.position,
                h = size.height
            ),
            GuideOrientation::Horizontal => write!(
                svg,
                r##"<line x1="0" y1="{p}" x2="{w}" y2="{p}" stroke="#ec4899" stroke-width="1"{dash}/>"##,
                p = guide.position,
                w = size.width
            ),
        };
    }
    svg.push_str("</svg>");
    svg
}

fn svg_open(size: Size) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" pointer-events="none">"#,
        w = size.width,
        h = size.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_lines_skip_edges() {
        let grid = GridOverlay::new(100.0);
        assert_eq!(grid.lines(300.0), vec![100.0, 200.0]);
        assert!(GridOverlay::new(0.0).lines(300.0).is_empty());
    }

    #[test]
    fn grid_svg_contains_both_axes() {
        let svg = GridOverlay::new(50.0).render_svg(Size::new(100.0, 100.0));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("M50 0V100"));
        assert!(svg.contains("M0 50H100"));
        assert!(svg.ends_with("</svg>"));
    }
}
