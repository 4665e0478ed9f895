//! Styled-segment documents.
//!
//! A [`Document`] is an ordered list of text runs, each carrying its own set
//! of style flags. All positions are character offsets into the plain text.

use std::fmt;

use once_cell::sync::Lazy;
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RichTextError {
    #[error("link url is empty")]
    EmptyUrl,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentStyle {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub h2: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub h3: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SegmentStyle {
    pub fn is_plain(&self) -> bool {
        *self == SegmentStyle::default()
    }

    /// Whether an inline format is active. List formats are never flags.
    pub fn has(&self, format: Format) -> bool {
        match format {
            Format::Bold => self.bold,
            Format::Italic => self.italic,
            Format::Strikethrough => self.strikethrough,
            Format::Underline => self.underline,
            Format::Code => self.code,
            Format::Heading2 => self.h2,
            Format::Heading3 => self.h3,
            Format::BulletList | Format::NumberedList => false,
        }
    }

    fn set(&mut self, format: Format, on: bool) {
        match format {
            Format::Bold => self.bold = on,
            Format::Italic => self.italic = on,
            Format::Strikethrough => self.strikethrough = on,
            Format::Underline => self.underline = on,
            Format::Code => self.code = on,
            Format::Heading2 => self.h2 = on,
            Format::Heading3 => self.h3 = on,
            Format::BulletList | Format::NumberedList => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    #[serde(flatten)]
    pub style: SegmentStyle,
}

impl Segment {
    pub fn plain<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            style: SegmentStyle::default(),
        }
    }

    pub fn styled<S: Into<String>>(text: S, style: SegmentStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Heading2,
    Heading3,
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    BulletList,
    NumberedList,
}

impl Format {
    pub fn label(self) -> &'static str {
        match self {
            Format::Heading2 => "Heading 2",
            Format::Heading3 => "Heading 3",
            Format::Bold => "Bold",
            Format::Italic => "Italic",
            Format::Strikethrough => "Strikethrough",
            Format::Underline => "Underline",
            Format::Code => "Code",
            Format::BulletList => "Bulleted list",
            Format::NumberedList => "Numbered list",
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, Format::BulletList | Format::NumberedList)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seed files may give a body as a bare string or as a list of segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DocumentRepr {
    Plain(String),
    Segments(Vec<Segment>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DocumentRepr", into = "DocumentRepr")]
pub struct Document {
    segments: Vec<Segment>,
}

impl From<DocumentRepr> for Document {
    fn from(repr: DocumentRepr) -> Self {
        match repr {
            DocumentRepr::Plain(text) => Document::plain(text),
            DocumentRepr::Segments(segments) => Document::from_segments(segments),
        }
    }
}

impl From<Document> for DocumentRepr {
    fn from(doc: Document) -> Self {
        if doc.segments.iter().all(|segment| segment.style.is_plain()) {
            DocumentRepr::Plain(doc.plain_text())
        } else {
            DocumentRepr::Segments(doc.segments)
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain<S: Into<String>>(text: S) -> Self {
        Self::from_segments(vec![Segment::plain(text)])
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut doc = Self { segments };
        doc.normalize();
        doc
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.segments.iter().map(Segment::char_len).sum()
    }

    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect()
    }

    pub fn text_in(&self, start: usize, end: usize) -> String {
        let (start, end) = self.clamp(start, end);
        self.plain_text()
            .chars()
            .skip(start)
            .take(end - start)
            .collect()
    }

    /// Toggles `format` over the selection. Empty selections are ignored.
    ///
    /// Inline formats are cleared when every selected run already has them and
    /// set otherwise. List formats prefix each touched line with a marker.
    pub fn apply_format(&mut self, start: usize, end: usize, format: Format) {
        let (start, end) = self.clamp(start, end);
        if start == end {
            return;
        }
        if format.is_list() {
            self.prefix_lines(start, end, format);
            return;
        }

        let first = self.split_at(start);
        let last = self.split_at(end);
        let selected = &mut self.segments[first..last];
        let enable = !selected.iter().all(|segment| segment.style.has(format));
        for segment in selected {
            segment.style.set(format, enable);
        }
        self.normalize();
    }

    /// Turns the selection into a link, or inserts new link text at `start`
    /// when the selection is empty.
    pub fn insert_link(
        &mut self,
        start: usize,
        end: usize,
        url: &str,
        display_text: Option<&str>,
    ) -> Result<(), RichTextError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RichTextError::EmptyUrl);
        }
        let (start, end) = self.clamp(start, end);

        if start != end {
            let first = self.split_at(start);
            let last = self.split_at(end);
            for segment in &mut self.segments[first..last] {
                segment.style.link = Some(url.to_string());
            }
        } else {
            let text = display_text
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .unwrap_or(url);
            let style = SegmentStyle {
                link: Some(url.to_string()),
                ..SegmentStyle::default()
            };
            let index = self.split_at(start);
            self.segments.insert(index, Segment::styled(text, style));
        }
        self.normalize();
        Ok(())
    }

    /// Inserts typed text, continuing the style of the run it lands in.
    pub fn insert_text(&mut self, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let (pos, _) = self.clamp(pos, pos);
        let index = self.split_at(pos);
        let style = if index > 0 {
            self.segments[index - 1].style.clone()
        } else {
            self.segments
                .first()
                .map(|segment| segment.style.clone())
                .unwrap_or_default()
        };
        self.segments.insert(index, Segment::styled(text, style));
        self.normalize();
    }

    pub fn delete_range(&mut self, start: usize, end: usize) {
        let (start, end) = self.clamp(start, end);
        if start == end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        self.segments.drain(first..last);
        self.normalize();
    }

    /// Parses markdown-style input into segments.
    pub fn from_markdown(input: &str) -> Self {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(input, opts);
        let mut reader = MarkdownReader::default();
        reader.read(parser);
        reader.finish()
    }

    /// Plain text with bare `http(s)://` urls turned into link runs.
    pub fn autolinked(text: &str) -> Self {
        static URL_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"https?://[^\s<>()\]]+").expect("valid url regex"));

        let mut segments = Vec::new();
        let mut last = 0;
        for found in URL_RE.find_iter(text) {
            let url = found
                .as_str()
                .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'));
            let end = found.start() + url.len();
            if found.start() > last {
                segments.push(Segment::plain(&text[last..found.start()]));
            }
            segments.push(Segment::styled(
                url,
                SegmentStyle {
                    link: Some(url.to_string()),
                    ..SegmentStyle::default()
                },
            ));
            last = end;
        }
        if last < text.len() {
            segments.push(Segment::plain(&text[last..]));
        }
        Self::from_segments(segments)
    }

    fn clamp(&self, start: usize, end: usize) -> (usize, usize) {
        let len = self.char_len();
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        (start.min(len), end.min(len))
    }

    /// Ensures a run boundary at `pos` and returns the index of the first run
    /// starting there (or `segments.len()` at the end).
    fn split_at(&mut self, pos: usize) -> usize {
        let mut offset = 0;
        for index in 0..self.segments.len() {
            let len = self.segments[index].char_len();
            if pos == offset {
                return index;
            }
            if pos < offset + len {
                let segment = &mut self.segments[index];
                let byte = segment
                    .text
                    .char_indices()
                    .nth(pos - offset)
                    .map(|(byte, _)| byte)
                    .unwrap_or(segment.text.len());
                let tail = segment.text.split_off(byte);
                let style = segment.style.clone();
                self.segments.insert(index + 1, Segment::styled(tail, style));
                return index + 1;
            }
            offset += len;
        }
        self.segments.len()
    }

    fn prefix_lines(&mut self, start: usize, end: usize, format: Format) {
        let chars: Vec<char> = self.plain_text().chars().collect();
        let mut line_start = chars[..start]
            .iter()
            .rposition(|c| *c == '\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let mut starts = vec![line_start];
        while let Some(newline) = chars[line_start..end].iter().position(|c| *c == '\n') {
            line_start += newline + 1;
            if line_start >= end {
                break;
            }
            starts.push(line_start);
        }

        for (number, pos) in starts.iter().enumerate().rev() {
            let marker = match format {
                Format::NumberedList => format!("{}. ", number + 1),
                _ => "• ".to_string(),
            };
            let index = self.split_at(*pos);
            self.segments.insert(index, Segment::plain(marker));
        }
        self.normalize();
    }

    fn push(&mut self, text: &str, style: SegmentStyle) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.segments.push(Segment::styled(text, style)),
        }
    }

    fn normalize(&mut self) {
        let segments = std::mem::take(&mut self.segments);
        for segment in segments {
            self.push(&segment.text, segment.style);
        }
    }
}

#[derive(Default)]
struct MarkdownReader {
    doc: Document,
    bold: usize,
    italic: usize,
    strikethrough: usize,
    heading: Option<HeadingLevel>,
    link: Option<String>,
    code_block: bool,
    list_stack: Vec<Option<u64>>,
    pending_break: bool,
}

impl MarkdownReader {
    fn read<'a, I>(&mut self, parser: I)
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => self.text(text, false),
                Event::Code(code) => self.text(code, true),
                Event::SoftBreak => self.text(CowStr::Borrowed(" "), false),
                Event::HardBreak => self.text(CowStr::Borrowed("\n"), false),
                Event::Rule => self.pending_break = true,
                _ => {}
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => self.heading = Some(level),
            Tag::Strong => self.bold += 1,
            Tag::Emphasis => self.italic += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.into_string()),
            Tag::CodeBlock(_) => self.code_block = true,
            Tag::List(start) => self.list_stack.push(start),
            Tag::Item => {
                let marker = match self.list_stack.last_mut() {
                    Some(Some(index)) => {
                        let marker = format!("{index}. ");
                        *index += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.break_if_pending();
                self.doc.push(&marker, SegmentStyle::default());
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.heading = None;
                self.pending_break = true;
            }
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => self.link = None,
            TagEnd::CodeBlock => {
                self.code_block = false;
                self.pending_break = true;
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                self.pending_break = true;
            }
            TagEnd::Paragraph | TagEnd::Item => self.pending_break = true,
            _ => {}
        }
    }

    fn break_if_pending(&mut self) {
        if self.pending_break && !self.doc.is_empty() {
            self.doc.push("\n", SegmentStyle::default());
        }
        self.pending_break = false;
    }

    fn text(&mut self, text: CowStr<'_>, inline_code: bool) {
        self.break_if_pending();
        let text = if self.code_block {
            text.trim_end_matches('\n').to_string()
        } else {
            text.into_string()
        };
        let style = SegmentStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strikethrough: self.strikethrough > 0,
            underline: false,
            code: inline_code || self.code_block,
            h2: matches!(self.heading, Some(HeadingLevel::H1 | HeadingLevel::H2)),
            h3: matches!(
                self.heading,
                Some(HeadingLevel::H3 | HeadingLevel::H4 | HeadingLevel::H5 | HeadingLevel::H6)
            ),
            link: self.link.clone(),
        };
        self.doc.push(&text, style);
    }

    fn finish(self) -> Document {
        self.doc
    }
}
