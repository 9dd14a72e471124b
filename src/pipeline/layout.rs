//! Engine-neutral page geometry.
//!
//! The PDF engine is only asked for two things per page: positioned
//! characters and the segments of path objects (table rulings). Both are
//! stored here in top-down PDF points so table detection never has to know
//! which engine produced them, and tests can build pages by hand.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in top-down PDF points (`top < bottom`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl BBox {
    pub fn new(x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            x0: x0.min(x1),
            top: top.min(bottom),
            x1: x0.max(x1),
            bottom: top.max(bottom),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.top && y <= self.bottom
    }
}

/// One glyph as positioned on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextChar {
    pub ch: char,
    pub bbox: BBox,
}

/// One drawing step of a path object, in top-down page points.
///
/// Curves are reported as a `MoveTo` their end point; they never form rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Close,
}

/// Largest drift, in points, for a segment to still count as horizontal or
/// vertical.
const AXIS_TOLERANCE: f32 = 0.5;

fn axis_aligned(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() <= AXIS_TOLERANCE || (a.1 - b.1).abs() <= AXIS_TOLERANCE
}

/// A run of non-blank glyphs on one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// Everything table detection needs to know about one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-indexed page number.
    pub page_num: usize,
    pub width: f32,
    pub height: f32,
    /// Glyphs in content-stream order.
    pub chars: Vec<TextChar>,
    /// Rule lines (zero or small thickness) and rectangles.
    pub rulings: Vec<BBox>,
}

impl PageLayout {
    pub fn new(page_num: usize, width: f32, height: f32) -> Self {
        Self {
            page_num,
            width,
            height,
            ..Self::default()
        }
    }

    /// Lay out `text` as fixed-pitch glyphs starting at `(x0, top)`.
    ///
    /// `\n` moves to the next line at the same `x0`. Used to build pages in
    /// memory for engines that only report text runs.
    pub fn push_text(&mut self, text: &str, x0: f32, top: f32, char_width: f32, size: f32) {
        let mut x = x0;
        let mut y = top;
        for ch in text.chars() {
            if ch == '\n' {
                x = x0;
                y += size * 1.2;
                continue;
            }
            self.chars.push(TextChar {
                ch,
                bbox: BBox::new(x, y, x + char_width, y + size),
            });
            x += char_width;
        }
    }

    /// Add a ruling line or rectangle.
    pub fn push_ruling(&mut self, x0: f32, top: f32, x1: f32, bottom: f32) {
        self.rulings.push(BBox::new(x0, top, x1, bottom));
    }

    /// Add the rulings drawn by one path object.
    ///
    /// A whole grid is often a single path with one subpath per rule. A
    /// closed four-corner axis-aligned subpath (the `re` operator) stays one
    /// rectangle so a thin filled bar is still a single rule; every other
    /// straight horizontal or vertical segment becomes its own line.
    pub fn push_path(&mut self, segments: &[PathSegment]) {
        let mut subpath: Vec<(f32, f32)> = Vec::new();
        for segment in segments {
            match *segment {
                PathSegment::MoveTo(x, y) => {
                    self.push_subpath(&subpath, false);
                    subpath = vec![(x, y)];
                }
                PathSegment::LineTo(x, y) => subpath.push((x, y)),
                PathSegment::Close => {
                    self.push_subpath(&subpath, true);
                    // Drawing continues from the subpath's start point.
                    subpath = subpath.first().copied().into_iter().collect();
                }
            }
        }
        self.push_subpath(&subpath, false);
    }

    fn push_subpath(&mut self, points: &[(f32, f32)], closed: bool) {
        let mut points = points.to_vec();
        if closed && points.len() > 1 && points.first() != points.last() {
            points.push(points[0]);
        }

        let corners = &points[..points.len().saturating_sub(1)];
        if closed && corners.len() == 4 && points.windows(2).all(|w| axis_aligned(w[0], w[1])) {
            let (x0, x1) = corners.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |acc, p| {
                (acc.0.min(p.0), acc.1.max(p.0))
            });
            let (top, bottom) = corners.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |acc, p| {
                (acc.0.min(p.1), acc.1.max(p.1))
            });
            self.push_ruling(x0, top, x1, bottom);
            return;
        }

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a != b && axis_aligned(a, b) {
                self.push_ruling(a.0, a.1, b.0, b.1);
            }
        }
    }

    /// Group glyphs into words.
    ///
    /// Whitespace and control characters end a word, as does a horizontal
    /// gap wider than `gap_ratio` × glyph height or a glyph on another line.
    pub fn words(&self, gap_ratio: f32) -> Vec<Word> {
        let mut words = Vec::new();
        let mut current: Option<Word> = None;

        for c in &self.chars {
            if c.ch.is_whitespace() || c.ch.is_control() {
                words.extend(current.take());
                continue;
            }
            if let Some(word) = current.as_mut() {
                let height = word.bbox.height().max(c.bbox.height()).max(1.0);
                let same_line = (c.bbox.center_y() - word.bbox.center_y()).abs() <= height / 2.0;
                let gap = c.bbox.x0 - word.bbox.x1;
                if same_line && gap <= gap_ratio * height && gap >= -height {
                    word.text.push(c.ch);
                    word.bbox = word.bbox.union(&c.bbox);
                    continue;
                }
                words.extend(current.take());
            }
            current = Some(Word {
                text: c.ch.to_string(),
                bbox: c.bbox,
            });
        }
        words.extend(current);
        words
    }
}

/// Words grouped into visual lines, top to bottom, each sorted left to right.
pub(crate) fn group_lines<'a>(words: &'a [Word], tolerance: f32) -> Vec<Vec<&'a Word>> {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .center_y()
            .total_cmp(&b.bbox.center_y())
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines: Vec<Vec<&Word>> = Vec::new();
    let mut line_y = f32::NEG_INFINITY;
    for word in sorted {
        let y = word.bbox.center_y();
        match lines.last_mut() {
            Some(line) if (y - line_y).abs() <= tolerance => {
                line.push(word);
                line_y = line.iter().map(|w| w.bbox.center_y()).sum::<f32>() / line.len() as f32;
            }
            _ => {
                lines.push(vec![word]);
                line_y = y;
            }
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines
}
