use std::ops::Range;

use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::richtext::{Document, SegmentStyle};

pub const COLOR_BODY: Color = Color::Rgb(205, 214, 244);
pub const COLOR_LINK: Color = Color::Rgb(137, 180, 250);
pub const COLOR_CODE: Color = Color::Rgb(148, 226, 213);
pub const COLOR_CODE_BG: Color = Color::Rgb(49, 50, 68);
pub const COLOR_HEADING_2: Color = Color::Rgb(249, 226, 175);
pub const COLOR_HEADING_3: Color = Color::Rgb(203, 166, 247);

#[derive(Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, doc: &Document) -> Text<'static> {
        let mut writer = LineWriter::default();
        for segment in doc.segments() {
            writer.push(&segment.text, self.segment_style(&segment.style));
        }
        writer.into_text()
    }

    /// Renders with the selection highlighted and a visible cursor, for the
    /// composer preview.
    pub fn render_with_selection(
        &self,
        doc: &Document,
        selection: Range<usize>,
        cursor: usize,
    ) -> Text<'static> {
        let mut writer = LineWriter::default();
        let mut offset = 0usize;
        for segment in doc.segments() {
            let base = self.segment_style(&segment.style);
            let mut run = String::new();
            let mut run_marked = false;
            for ch in segment.text.chars() {
                let marked = selection.contains(&offset) || offset == cursor;
                if marked != run_marked && !run.is_empty() {
                    writer.push(&run, mark(base, run_marked));
                    run.clear();
                }
                run_marked = marked;
                run.push(ch);
                offset += 1;
            }
            if !run.is_empty() {
                writer.push(&run, mark(base, run_marked));
            }
        }
        if cursor >= offset {
            writer.push(" ", mark(Style::default().fg(COLOR_BODY), true));
        }
        writer.into_text()
    }

    /// Style flags compose additively; no combination is rejected.
    pub fn segment_style(&self, style: &SegmentStyle) -> Style {
        let mut out = Style::default().fg(COLOR_BODY);
        if style.h2 {
            out = out
                .fg(COLOR_HEADING_2)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        if style.h3 {
            out = out.fg(COLOR_HEADING_3).add_modifier(Modifier::BOLD);
        }
        if style.code {
            out = out.fg(COLOR_CODE).bg(COLOR_CODE_BG);
        }
        if style.bold {
            out = out.add_modifier(Modifier::BOLD);
        }
        if style.italic {
            out = out.add_modifier(Modifier::ITALIC);
        }
        if style.strikethrough {
            out = out.add_modifier(Modifier::CROSSED_OUT);
        }
        if style.underline {
            out = out.add_modifier(Modifier::UNDERLINED);
        }
        if style.link.is_some() {
            out = out.fg(COLOR_LINK).add_modifier(Modifier::UNDERLINED);
        }
        out
    }
}

fn mark(style: Style, marked: bool) -> Style {
    if marked {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

#[derive(Default)]
struct LineWriter {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl LineWriter {
    fn push(&mut self, text: &str, style: Style) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            if !first.is_empty() {
                self.current.push(Span::styled(first.to_string(), style));
            }
        }
        for part in parts {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
            if !part.is_empty() {
                self.current.push(Span::styled(part.to_string(), style));
            }
        }
    }

    fn into_text(mut self) -> Text<'static> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
        Text {
            lines: self.lines,
            alignment: Some(Alignment::Left),
            style: Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::Segment;

    #[test]
    fn bold_link_carries_both_flags() {
        let doc = Document::from_segments(vec![Segment::styled(
            "hi",
            SegmentStyle {
                bold: true,
                link: Some("https://example.com".into()),
                ..SegmentStyle::default()
            },
        )]);
        let text = Renderer::new().render(&doc);
        let span = &text.lines[0].spans[0];
        assert_eq!(span.content.as_ref(), "hi");
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert!(span.style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(span.style.fg, Some(COLOR_LINK));
    }

    #[test]
    fn every_flag_maps_to_a_modifier_or_colour() {
        let renderer = Renderer::new();
        let strike = renderer.segment_style(&SegmentStyle {
            strikethrough: true,
            italic: true,
            ..SegmentStyle::default()
        });
        assert!(strike.add_modifier.contains(Modifier::CROSSED_OUT));
        assert!(strike.add_modifier.contains(Modifier::ITALIC));

        let code = renderer.segment_style(&SegmentStyle {
            code: true,
            ..SegmentStyle::default()
        });
        assert_eq!(code.bg, Some(COLOR_CODE_BG));

        let heading = renderer.segment_style(&SegmentStyle {
            h3: true,
            ..SegmentStyle::default()
        });
        assert_eq!(heading.fg, Some(COLOR_HEADING_3));
        assert!(heading.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn newlines_start_new_lines() {
        let doc = Document::plain("one\ntwo\n\nthree");
        let text = Renderer::new().render(&doc);
        assert_eq!(text.lines.len(), 4);
        assert!(text.lines[2].spans.is_empty());
        assert_eq!(text.lines[3].spans[0].content.as_ref(), "three");
    }

    #[test]
    fn selection_is_reversed() {
        let doc = Document::plain("abcd");
        let text = Renderer::new().render_with_selection(&doc, 1..3, 3);
        let spans = &text.lines[0].spans;
        assert_eq!(spans[0].content.as_ref(), "a");
        assert_eq!(spans[1].content.as_ref(), "bcd");
        assert!(spans[1].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn cursor_at_end_is_drawn() {
        let doc = Document::plain("ab");
        let text = Renderer::new().render_with_selection(&doc, 2..2, 2);
        let spans = &text.lines[0].spans;
        assert_eq!(spans.last().unwrap().content.as_ref(), " ");
    }
}
