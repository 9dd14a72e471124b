//! Whitespace-aligned table detection for credit-card statements.
//!
//! Card statements rarely draw rules; columns exist only as consistent
//! horizontal gaps between text. Lines are grouped into blocks separated by
//! vertical whitespace, and each block's columns are inferred from the
//! phrase layout its lines agree on most.

use super::layout::{group_lines, PageLayout, Word};
use crate::config::StreamSettings;
use crate::table::{RawRow, RawTable};
use std::collections::HashMap;
use tracing::trace;

/// Consecutive words on one line that belong to the same cell.
#[derive(Debug, Clone)]
struct Phrase {
    text: String,
    x0: f32,
    x1: f32,
}

impl Phrase {
    fn center(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

struct TextLine {
    top: f32,
    bottom: f32,
    phrases: Vec<Phrase>,
}

/// Detect tables on every page in page order.
pub fn find_tables_in_pages(pages: &[PageLayout], settings: &StreamSettings) -> Vec<RawTable> {
    pages
        .iter()
        .flat_map(|page| find_tables(page, settings))
        .collect()
}

/// Detect whitespace-separated tables on one page, top to bottom.
pub fn find_tables(page: &PageLayout, settings: &StreamSettings) -> Vec<RawTable> {
    let words = page.words(settings.word_gap_ratio);
    let lines: Vec<TextLine> = group_lines(&words, settings.row_tolerance)
        .into_iter()
        .map(|line| text_line(&line, settings.column_gap_ratio))
        .collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let blocks = split_blocks(lines, settings.table_gap_ratio);
    trace!("page {}: {} text blocks", page.page_num, blocks.len());

    blocks
        .into_iter()
        .filter(|block| block.len() > 1)
        .map(|block| RawTable::new(page.page_num, build_grid(&block)))
        .collect()
}

fn text_line(words: &[&Word], gap_ratio: f32) -> TextLine {
    let top = words.iter().map(|w| w.bbox.top).fold(f32::INFINITY, f32::min);
    let bottom = words
        .iter()
        .map(|w| w.bbox.bottom)
        .fold(f32::NEG_INFINITY, f32::max);
    let max_gap = gap_ratio * (bottom - top).max(1.0);

    let mut phrases: Vec<Phrase> = Vec::new();
    for word in words {
        match phrases.last_mut() {
            Some(phrase) if word.bbox.x0 - phrase.x1 <= max_gap => {
                phrase.text.push(' ');
                phrase.text.push_str(&word.text);
                phrase.x1 = phrase.x1.max(word.bbox.x1);
            }
            _ => phrases.push(Phrase {
                text: word.text.clone(),
                x0: word.bbox.x0,
                x1: word.bbox.x1,
            }),
        }
    }
    TextLine {
        top,
        bottom,
        phrases,
    }
}

fn median(values: &mut [f32]) -> f32 {
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Start a new block wherever the gap to the previous line is larger than
/// `gap_ratio` × the median line height.
fn split_blocks(lines: Vec<TextLine>, gap_ratio: f32) -> Vec<Vec<TextLine>> {
    let mut heights: Vec<f32> = lines.iter().map(|l| l.bottom - l.top).collect();
    let max_gap = gap_ratio * median(&mut heights);

    let mut blocks: Vec<Vec<TextLine>> = Vec::new();
    let mut previous_bottom = f32::NEG_INFINITY;
    for line in lines {
        let gap = line.top - previous_bottom;
        previous_bottom = line.bottom;
        match blocks.last_mut() {
            Some(block) if gap <= max_gap => block.push(line),
            _ => blocks.push(vec![line]),
        }
    }
    blocks
}

/// Most frequent phrase count; ties go to the wider layout.
///
/// Wrapped descriptions and footnotes produce many one-phrase lines, so a
/// mode of 1 is taken again over the multi-phrase lines when there are any.
fn column_count(block: &[TextLine]) -> usize {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for line in block {
        *counts.entry(line.phrases.len()).or_default() += 1;
    }
    let mode = |counts: &HashMap<usize, usize>| {
        counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))
            .map(|(&ncols, _)| ncols)
            .unwrap_or(0)
    };

    let ncols = mode(&counts);
    if ncols == 1 {
        counts.remove(&1);
        if !counts.is_empty() {
            return mode(&counts);
        }
    }
    ncols
}

fn build_grid(block: &[TextLine]) -> Vec<RawRow> {
    let ncols = column_count(block);

    // Column spans from the lines that agree with the column count.
    let mut spans = vec![(f32::INFINITY, f32::NEG_INFINITY); ncols];
    for line in block.iter().filter(|l| l.phrases.len() == ncols) {
        for (span, phrase) in spans.iter_mut().zip(&line.phrases) {
            span.0 = span.0.min(phrase.x0);
            span.1 = span.1.max(phrase.x1);
        }
    }
    let boundaries: Vec<f32> = spans
        .windows(2)
        .map(|pair| (pair[0].1 + pair[1].0) / 2.0)
        .collect();

    block
        .iter()
        .map(|line| {
            let mut row: Vec<String> = vec![String::new(); ncols];
            for phrase in &line.phrases {
                let col = boundaries
                    .iter()
                    .filter(|&&b| b < phrase.center())
                    .count();
                let cell = &mut row[col];
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(&phrase.text);
            }
            row.into_iter().map(Some).collect()
        })
        .collect()
}
