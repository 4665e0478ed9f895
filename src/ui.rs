use std::collections::HashSet;
use std::fs;
use std::io::{self, Stdout};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use textwrap::{wrap, Options as WrapOptions};
use unicode_width::UnicodeWidthStr;

use crate::comments::WalkEntry;
use crate::composer::{CommentDraft, FileUpload, Platform, PostComposer, VideoUpload};
use crate::feed::{Feed, FeedFilter, FeedOp};
use crate::model::{Attachment, AttachmentKind, Comment, CommentId, Post, PostId, Viewer};
use crate::render::Renderer;
use crate::richtext::Format;

const COLOR_BG: Color = Color::Rgb(30, 30, 46);
const COLOR_PANEL_BG: Color = Color::Rgb(24, 24, 36);
const COLOR_PANEL_FOCUSED_BG: Color = Color::Rgb(49, 50, 68);
const COLOR_PANEL_SELECTED_BG: Color = Color::Rgb(69, 71, 90);
const COLOR_BORDER_IDLE: Color = Color::Rgb(49, 50, 68);
const COLOR_BORDER_FOCUSED: Color = Color::Rgb(137, 180, 250);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
const COLOR_ACCENT: Color = Color::Rgb(137, 180, 250);
const COLOR_SUCCESS: Color = Color::Rgb(166, 227, 161);
const COLOR_ERROR: Color = Color::Rgb(243, 139, 168);

const COMMENT_DEPTH_COLORS: [Color; 6] = [
    Color::Rgb(250, 179, 135),
    Color::Rgb(166, 227, 161),
    Color::Rgb(203, 166, 247),
    Color::Rgb(245, 194, 231),
    Color::Rgb(137, 220, 235),
    Color::Rgb(249, 226, 175),
];

const ICON_PINNED: &str = "📌";
const ICON_SAVED: &str = "★";
const ICON_COMMENTS: &str = "💬";
const ICON_VIEWS: &str = "👁";
const ICON_ATTACHMENT: &str = "📎";
const CURSOR: &str = "▏";

const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "webm", "mkv", "m4v"];

const EMOJI_COLUMNS: usize = 8;
const EMOJIS: [&str; 48] = [
    "😀", "😃", "😄", "😁", "😆", "😅", "🤣", "😂",
    "🙂", "😉", "😊", "😇", "🥰", "😍", "🤩", "😘",
    "😋", "😜", "🤪", "🤗", "🤔", "🤨", "😐", "🙄",
    "😴", "😎", "🤓", "🥳", "😮", "😢", "😭", "😱",
    "👋", "👌", "👍", "👎", "👏", "🙌", "🙏", "💪",
    "🧡", "💛", "💚", "💙", "💜", "🔥", "🎉", "💡",
];

fn comment_depth_color(depth: usize) -> Color {
    COMMENT_DEPTH_COLORS[depth % COMMENT_DEPTH_COLORS.len()]
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(100 - percent_x - (100 - percent_x) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(100 - percent_y - (100 - percent_y) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Pane {
    Posts,
    Content,
    Comments,
}

impl Pane {
    const ALL: [Pane; 3] = [Pane::Posts, Pane::Content, Pane::Comments];

    fn title(self) -> &'static str {
        match self {
            Pane::Posts => "Posts",
            Pane::Content => "Content",
            Pane::Comments => "Comments",
        }
    }

    fn next(self) -> Self {
        match self {
            Pane::Posts => Pane::Content,
            Pane::Content => Pane::Comments,
            Pane::Comments => Pane::Comments,
        }
    }

    fn previous(self) -> Self {
        match self {
            Pane::Posts => Pane::Posts,
            Pane::Content => Pane::Posts,
            Pane::Comments => Pane::Content,
        }
    }
}

struct ChannelPicker {
    post: PostId,
    current: Option<String>,
    query: String,
    selected: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ComposerField {
    Title,
    Body,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PromptKind {
    Link,
    Media,
    Banner,
    Attachment,
}

impl PromptKind {
    fn label(self) -> &'static str {
        match self {
            PromptKind::Link => "Link (url [text])",
            PromptKind::Media => "Attach (path or video url)",
            PromptKind::Banner => "Banner image (path)",
            PromptKind::Attachment => "Attach (path)",
        }
    }
}

struct Prompt {
    kind: PromptKind,
    input: String,
}

impl Prompt {
    fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }
}

struct ComposerForm {
    field: ComposerField,
    prompt: Option<Prompt>,
    /// Highlighted cell while the emoji grid is open.
    emoji: Option<usize>,
}

enum Popup {
    Channels(ChannelPicker),
    Comment { prompt: Option<Prompt> },
    Composer(ComposerForm),
}

/// Cursor and selection over the composer body, in characters.
#[derive(Debug, Default, Clone)]
struct BodyEditor {
    cursor: usize,
    anchor: Option<usize>,
}

impl BodyEditor {
    fn selection(&self) -> Range<usize> {
        match self.anchor {
            Some(anchor) => anchor.min(self.cursor)..anchor.max(self.cursor),
            None => self.cursor..self.cursor,
        }
    }

    fn move_to(&mut self, pos: usize, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = pos;
        if self.anchor == Some(self.cursor) {
            self.anchor = None;
        }
    }

    fn collapse_to(&mut self, pos: usize) {
        self.anchor = None;
        self.cursor = pos;
    }

    fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len);
        self.anchor = self.anchor.map(|anchor| anchor.min(len));
    }
}

fn comment_lines(
    entry: &WalkEntry<'_>,
    width: usize,
    indicator: &str,
    meta_style: Style,
    body_style: Style,
    hidden_replies: Option<usize>,
) -> Vec<Line<'static>> {
    let comment = &entry.node.comment;
    let indent_units = "  ".repeat(entry.depth);
    let indicator_prefix = format!("{indent_units}{indicator} ");
    let spacer = " ".repeat(indicator.chars().count());
    let rest_prefix = format!("{indent_units}{spacer} ");
    let body_prefix = format!("{indent_units}{spacer}  ");

    let like_marker = if comment.user_liked { "♥" } else { "♡" };
    let likes = comment.likes;
    let mut header = format!(
        "{like_marker} {} · {likes} likes · {}",
        comment.author.name, comment.timestamp
    );
    if let Some(hidden) = hidden_replies.filter(|hidden| *hidden > 0) {
        let suffix = if hidden == 1 { "reply" } else { "replies" };
        header.push_str(&format!(" · {hidden} hidden {suffix}"));
    }

    let mut lines = wrap_with_prefixes(
        &header,
        width,
        indicator_prefix.as_str(),
        rest_prefix.as_str(),
        meta_style,
    );

    if comment.content.trim().is_empty() && comment.attachments.is_empty() {
        lines.extend(wrap_with_prefix(
            "(no comment body)",
            width,
            body_prefix.as_str(),
            body_style,
        ));
        return lines;
    }

    for raw_line in comment.content.lines() {
        if raw_line.trim().is_empty() {
            lines.push(Line::from(Span::styled(String::new(), body_style)));
            continue;
        }
        lines.extend(wrap_with_prefix(
            raw_line.trim(),
            width,
            body_prefix.as_str(),
            body_style,
        ));
    }

    for attachment in &comment.attachments {
        let label = format!("{ICON_ATTACHMENT} {}", attachment.name);
        lines.extend(wrap_with_prefix(&label, width, body_prefix.as_str(), body_style));
    }

    lines
}

fn wrap_with_prefixes(
    text: &str,
    width: usize,
    first_prefix: &str,
    rest_prefix: &str,
    style: Style,
) -> Vec<Line<'static>> {
    if text.trim().is_empty() {
        return vec![Line::from(Span::styled(String::new(), style))];
    }

    if width == 0 {
        let mut line = String::with_capacity(first_prefix.len() + text.len());
        line.push_str(first_prefix);
        line.push_str(text);
        return vec![Line::from(Span::styled(line, style))];
    }

    let min_width = first_prefix
        .chars()
        .count()
        .max(rest_prefix.chars().count())
        .saturating_add(1);
    let wrap_width = width.max(min_width);
    let options = WrapOptions::new(wrap_width)
        .break_words(false)
        .initial_indent(first_prefix)
        .subsequent_indent(rest_prefix);

    wrap(text, options)
        .into_iter()
        .map(|cow| Line::from(Span::styled(cow.into_owned(), style)))
        .collect()
}

fn wrap_plain(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    wrap_with_prefixes(text, width, "", "", style)
}

fn wrap_with_prefix(text: &str, width: usize, prefix: &str, style: Style) -> Vec<Line<'static>> {
    wrap_with_prefixes(text, width, prefix, prefix, style)
}

fn pad_lines_to_width(lines: &mut [Line<'static>], width: u16) {
    let width = width as usize;
    if width == 0 {
        return;
    }

    for line in lines {
        let mut current_width = 0usize;
        for span in &line.spans {
            current_width =
                current_width.saturating_add(UnicodeWidthStr::width(span.content.as_ref()));
        }
        if current_width >= width {
            continue;
        }
        let pad_style = line.spans.last().map(|span| span.style).unwrap_or_default();
        let padding = " ".repeat(width - current_width);
        line.spans.push(Span::styled(padding, pad_style));
    }
}

/// Channels matching `query`, best match first. An empty query keeps the
/// configured order.
fn filter_channels<'a>(channels: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return channels.iter().map(String::as_str).collect();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, usize, &str)> = channels
        .iter()
        .enumerate()
        .filter_map(|(idx, channel)| {
            matcher
                .fuzzy_match(channel, query)
                .map(|score| (score, idx, channel.as_str()))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, channel)| channel).collect()
}

fn post_headline(post: &Post) -> String {
    if let Some(title) = post.title.as_deref().filter(|title| !title.trim().is_empty()) {
        return title.trim().to_string();
    }
    let text = post.content.plain_text();
    let first = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    if first.is_empty() {
        "(untitled post)".to_string()
    } else {
        first.trim().to_string()
    }
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f < KB {
        format!("{bytes} B")
    } else if bytes_f < KB * KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{:.1} MB", bytes_f / (KB * KB))
    }
}

fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

fn is_alt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::ALT)
}

pub struct Options {
    pub status_message: String,
    pub posts: Vec<Post>,
    pub viewer: Viewer,
    pub filter: FeedFilter,
    pub feed_channels: Vec<String>,
    pub composer_channels: Vec<String>,
    pub default_channel: String,
    pub schedule_step: Duration,
    pub replies_expanded: bool,
}

pub struct Model {
    status_message: String,
    feed: Feed,
    viewer: Viewer,
    filter: FeedFilter,
    visible_posts: Vec<Arc<Post>>,
    selected_post: usize,
    selected_comment: usize,
    toggled_threads: HashSet<CommentId>,
    replies_expanded: bool,
    content_scroll: u16,
    focused_pane: Pane,
    renderer: Renderer,
    feed_channels: Vec<String>,
    composer_channels: Vec<String>,
    schedule_step: Duration,
    popup: Option<Popup>,
    composer: PostComposer,
    editor: BodyEditor,
    comment_draft: CommentDraft,
    needs_redraw: bool,
}

impl Model {
    pub fn new(opts: Options) -> Self {
        let feed = Feed::new(opts.posts);
        let visible_posts = feed.view(opts.filter, &opts.viewer);
        Self {
            status_message: opts.status_message,
            feed,
            viewer: opts.viewer,
            filter: opts.filter,
            visible_posts,
            selected_post: 0,
            selected_comment: 0,
            toggled_threads: HashSet::new(),
            replies_expanded: opts.replies_expanded,
            content_scroll: 0,
            focused_pane: Pane::Posts,
            renderer: Renderer::new(),
            feed_channels: opts.feed_channels,
            composer_channels: opts.composer_channels,
            schedule_step: opts.schedule_step,
            popup: None,
            composer: PostComposer::new(&opts.default_channel),
            editor: BodyEditor::default(),
            comment_draft: CommentDraft::new(),
            needs_redraw: true,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(120);

        loop {
            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                tracing::debug!(error = %err, "key handler failed");
                                self.status_message = format!("Error: {}", err);
                            }
                        }
                        self.mark_dirty();
                    }
                    Event::Resize(..) => self.mark_dirty(),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn current_post(&self) -> Option<Arc<Post>> {
        self.visible_posts.get(self.selected_post).cloned()
    }

    /// Recomputes the filtered view, keeping the selected post when it is
    /// still visible.
    fn refresh_view(&mut self) {
        let current = self.current_post().map(|post| post.id.clone());
        self.visible_posts = self.feed.view(self.filter, &self.viewer);
        let position = current
            .as_ref()
            .and_then(|id| self.visible_posts.iter().position(|post| &post.id == id));
        match position {
            Some(index) => self.selected_post = index,
            None => {
                self.selected_post = self
                    .selected_post
                    .min(self.visible_posts.len().saturating_sub(1));
                self.reset_post_scroll();
            }
        }
        let comment_count = self.visible_comment_ids().len();
        self.selected_comment = self.selected_comment.min(comment_count.saturating_sub(1));
    }

    fn select_post_id(&mut self, id: &PostId) -> bool {
        match self.visible_posts.iter().position(|post| &post.id == id) {
            Some(index) => {
                self.selected_post = index;
                self.reset_post_scroll();
                true
            }
            None => false,
        }
    }

    fn reset_post_scroll(&mut self) {
        self.selected_comment = 0;
        self.content_scroll = 0;
    }

    fn apply_op(&mut self, op: FeedOp) -> Result<()> {
        self.feed = self.feed.apply(op)?;
        self.refresh_view();
        Ok(())
    }

    fn thread_collapsed(&self, id: &CommentId) -> bool {
        self.replies_expanded == self.toggled_threads.contains(id)
    }

    fn collapsed_threads(&self, post: &Post) -> HashSet<CommentId> {
        post.comments
            .walk(&HashSet::new())
            .into_iter()
            .filter(|entry| !entry.node.children.is_empty())
            .map(|entry| entry.node.comment.id.clone())
            .filter(|id| self.thread_collapsed(id))
            .collect()
    }

    fn visible_comment_ids(&self) -> Vec<CommentId> {
        let Some(post) = self.current_post() else {
            return Vec::new();
        };
        let collapsed = self.collapsed_threads(&post);
        post.comments
            .walk(&collapsed)
            .into_iter()
            .map(|entry| entry.node.comment.id.clone())
            .collect()
    }

    fn selected_comment_id(&self) -> Option<CommentId> {
        self.visible_comment_ids().get(self.selected_comment).cloned()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if let Some(popup) = self.popup.take() {
            self.popup = match popup {
                Popup::Channels(picker) => self.handle_channel_key(picker, key)?,
                Popup::Comment { prompt } => self.handle_comment_key(prompt, key)?,
                Popup::Composer(form) => self.handle_composer_key(form, key)?,
            };
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('c') if is_ctrl(&key) => return Ok(true),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.previous();
                self.status_message = self.focus_status();
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
                self.status_message = self.focus_status();
            }
            KeyCode::Char('j') | KeyCode::Down => self.navigate_in_focus(1),
            KeyCode::Char('k') | KeyCode::Up => self.navigate_in_focus(-1),
            KeyCode::PageDown => self.navigate_in_focus(5),
            KeyCode::PageUp => self.navigate_in_focus(-5),
            KeyCode::Char('f') => {
                self.filter = self.filter.next();
                self.refresh_view();
                self.status_message = format!(
                    "Showing {} ({} posts).",
                    self.filter.label(),
                    self.visible_posts.len()
                );
            }
            KeyCode::Char('v') => self.toggle_like()?,
            KeyCode::Char('s') => self.toggle_save()?,
            KeyCode::Char('p') => self.toggle_pin()?,
            KeyCode::Char('d') => self.toggle_comments_enabled()?,
            KeyCode::Char('m') => self.open_channel_picker(),
            KeyCode::Char('c') => self.open_comment_composer(None)?,
            KeyCode::Char('r') => {
                let target = self.selected_comment_id();
                if self.focused_pane != Pane::Comments || target.is_none() {
                    self.status_message = "Select a comment to reply to.".to_string();
                } else {
                    self.open_comment_composer(target)?;
                }
            }
            KeyCode::Enter => {
                if self.focused_pane == Pane::Comments {
                    self.toggle_selected_thread();
                } else {
                    self.focused_pane = self.focused_pane.next();
                    self.status_message = self.focus_status();
                }
            }
            KeyCode::Char('n') => self.open_post_composer(),
            _ => {}
        }
        Ok(false)
    }

    /// Errors inside a popup are shown without closing it.
    fn report_error(&mut self, err: &anyhow::Error) {
        tracing::debug!(error = %err, "popup action failed");
        self.status_message = format!("Error: {}", err);
    }

    fn focus_status(&self) -> String {
        format!("Focused {} pane.", self.focused_pane.title())
    }

    fn navigate_in_focus(&mut self, delta: i32) {
        match self.focused_pane {
            Pane::Posts => {
                if self.visible_posts.is_empty() {
                    return;
                }
                let last = self.visible_posts.len() - 1;
                let next = step_index(self.selected_post, delta, last);
                if next != self.selected_post {
                    self.selected_post = next;
                    self.reset_post_scroll();
                }
            }
            Pane::Content => {
                self.content_scroll = if delta < 0 {
                    self.content_scroll.saturating_sub(delta.unsigned_abs() as u16)
                } else {
                    self.content_scroll.saturating_add(delta as u16)
                };
            }
            Pane::Comments => {
                let count = self.visible_comment_ids().len();
                if count == 0 {
                    return;
                }
                self.selected_comment = step_index(self.selected_comment, delta, count - 1);
            }
        }
    }

    fn require_post(&self) -> Result<Arc<Post>> {
        self.current_post().context("no post selected")
    }

    fn toggle_like(&mut self) -> Result<()> {
        let post = self.require_post()?;
        if self.focused_pane == Pane::Comments {
            if let Some(comment) = self.selected_comment_id() {
                self.apply_op(FeedOp::ToggleCommentLike {
                    post: post.id.clone(),
                    comment: comment.clone(),
                })?;
                let liked = self
                    .current_post()
                    .and_then(|post| post.comments.get(&comment).map(|node| node.comment.user_liked))
                    .unwrap_or(false);
                self.status_message = if liked {
                    "Liked comment.".to_string()
                } else {
                    "Removed like from comment.".to_string()
                };
                return Ok(());
            }
        }
        self.apply_op(FeedOp::ToggleLike(post.id.clone()))?;
        let liked = self
            .feed
            .get(&post.id)
            .map(|post| post.is_liked())
            .unwrap_or(false);
        self.status_message = if liked {
            "Liked post.".to_string()
        } else {
            "Removed like.".to_string()
        };
        Ok(())
    }

    fn toggle_save(&mut self) -> Result<()> {
        let post = self.require_post()?;
        self.apply_op(FeedOp::ToggleSave(post.id.clone()))?;
        self.status_message = if post.is_saved {
            "Removed from saved posts.".to_string()
        } else {
            "Saved post.".to_string()
        };
        Ok(())
    }

    fn toggle_pin(&mut self) -> Result<()> {
        let post = self.require_post()?;
        self.apply_op(FeedOp::TogglePin(post.id.clone()))?;
        self.status_message = if post.is_pinned {
            "Unpinned post.".to_string()
        } else {
            "Pinned post to the top of the feed.".to_string()
        };
        Ok(())
    }

    fn toggle_comments_enabled(&mut self) -> Result<()> {
        let post = self.require_post()?;
        self.apply_op(FeedOp::ToggleCommentsEnabled(post.id.clone()))?;
        self.status_message = if post.comments_disabled {
            "Comments turned on.".to_string()
        } else {
            "Comments turned off.".to_string()
        };
        Ok(())
    }

    fn toggle_selected_thread(&mut self) {
        let Some(post) = self.current_post() else {
            return;
        };
        let Some(id) = self.selected_comment_id() else {
            self.status_message = "No comment selected.".to_string();
            return;
        };
        let replies = post.comments.descendant_count(&id);
        if replies == 0 {
            self.status_message = "Comment has no replies.".to_string();
            return;
        }
        let collapsed_before = self.thread_collapsed(&id);
        if !self.toggled_threads.remove(&id) {
            self.toggled_threads.insert(id);
        }
        let suffix = if replies == 1 { "reply" } else { "replies" };
        self.status_message = if collapsed_before {
            format!("Showing {replies} {suffix}.")
        } else {
            format!("Collapsed {replies} {suffix}.")
        };
    }

    fn expand_thread(&mut self, id: &CommentId) {
        if self.thread_collapsed(id) && !self.toggled_threads.remove(id) {
            self.toggled_threads.insert(id.clone());
        }
    }

    fn open_channel_picker(&mut self) {
        let Some(post) = self.current_post() else {
            self.status_message = "No post selected.".to_string();
            return;
        };
        let current = post.location.clone();
        let selected = current
            .as_deref()
            .and_then(|channel| self.feed_channels.iter().position(|name| name == channel))
            .unwrap_or(0);
        self.popup = Some(Popup::Channels(ChannelPicker {
            post: post.id.clone(),
            current,
            query: String::new(),
            selected,
        }));
        self.status_message = "Move post: type to filter, Enter to choose.".to_string();
    }

    fn handle_channel_key(
        &mut self,
        mut picker: ChannelPicker,
        key: KeyEvent,
    ) -> Result<Option<Popup>> {
        match key.code {
            KeyCode::Esc => {
                self.status_message = "Channel unchanged.".to_string();
                return Ok(None);
            }
            KeyCode::Enter => {
                let matches = filter_channels(&self.feed_channels, &picker.query);
                let Some(channel) = matches.get(picker.selected).map(|name| name.to_string())
                else {
                    self.status_message = "No channel matches.".to_string();
                    return Ok(Some(Popup::Channels(picker)));
                };
                let moved = self.apply_op(FeedOp::ReassignChannel {
                    post: picker.post.clone(),
                    channel: channel.clone(),
                });
                if let Err(err) = moved {
                    self.report_error(&err);
                    return Ok(Some(Popup::Channels(picker)));
                }
                self.status_message = format!("Moved post to {channel}.");
                return Ok(None);
            }
            KeyCode::Down => picker.selected = picker.selected.saturating_add(1),
            KeyCode::Up => picker.selected = picker.selected.saturating_sub(1),
            KeyCode::Backspace => {
                picker.query.pop();
                picker.selected = 0;
            }
            KeyCode::Char(ch) if !is_ctrl(&key) => {
                picker.query.push(ch);
                picker.selected = 0;
            }
            _ => {}
        }
        let count = filter_channels(&self.feed_channels, &picker.query).len();
        picker.selected = picker.selected.min(count.saturating_sub(1));
        Ok(Some(Popup::Channels(picker)))
    }

    fn open_comment_composer(&mut self, reply_to: Option<CommentId>) -> Result<()> {
        let post = self.require_post()?;
        if post.comments_disabled {
            self.status_message = "Comments are turned off for this post.".to_string();
            return Ok(());
        }
        match reply_to {
            Some(id) => self.comment_draft.begin_reply(&post.comments, &id)?,
            None => self.comment_draft.cancel_reply(),
        }
        self.popup = Some(Popup::Comment { prompt: None });
        self.status_message = self.comment_draft.placeholder();
        Ok(())
    }

    fn handle_comment_key(
        &mut self,
        mut prompt: Option<Prompt>,
        key: KeyEvent,
    ) -> Result<Option<Popup>> {
        if let Some(active) = prompt.as_mut() {
            match key.code {
                KeyCode::Esc => return Ok(Some(Popup::Comment { prompt: None })),
                KeyCode::Enter => {
                    let path = active.input.trim().to_string();
                    if !path.is_empty() {
                        let attachment = Attachment::from_path(Path::new(&path));
                        self.status_message = format!("Attached {}.", attachment.name);
                        self.comment_draft.add_attachment(attachment);
                    }
                    return Ok(Some(Popup::Comment { prompt: None }));
                }
                KeyCode::Backspace => {
                    active.input.pop();
                }
                KeyCode::Char(ch) => active.input.push(ch),
                _ => {}
            }
            return Ok(Some(Popup::Comment { prompt }));
        }

        match key.code {
            KeyCode::Esc => {
                self.comment_draft.cancel_reply();
                self.status_message = "Comment draft kept.".to_string();
                return Ok(None);
            }
            KeyCode::Enter => {
                match self.submit_comment() {
                    Ok(true) => return Ok(None),
                    Ok(false) => {}
                    Err(err) => self.report_error(&err),
                }
            }
            KeyCode::Char('a') if is_ctrl(&key) => {
                return Ok(Some(Popup::Comment {
                    prompt: Some(Prompt::new(PromptKind::Attachment)),
                }));
            }
            KeyCode::Char('x') if is_ctrl(&key) => {
                if let Some(last) = self.comment_draft.attachments().last().map(|a| a.id.clone()) {
                    self.comment_draft.remove_attachment(&last);
                    self.status_message = "Removed attachment.".to_string();
                }
            }
            KeyCode::Backspace => {
                self.comment_draft.text.pop();
            }
            KeyCode::Char(ch) if !is_ctrl(&key) => self.comment_draft.text.push(ch),
            _ => {}
        }
        Ok(Some(Popup::Comment { prompt: None }))
    }

    /// Returns false when there was nothing to send.
    fn submit_comment(&mut self) -> Result<bool> {
        let post = self.require_post()?;
        let Some(submission) = self.comment_draft.submit() else {
            self.status_message = "Write something or attach a file first.".to_string();
            return Ok(false);
        };
        let comment = Comment::authored(&self.viewer, &submission.content, submission.attachments);
        let reply_to = submission.reply_to.clone();
        self.apply_op(FeedOp::AddComment {
            post: post.id.clone(),
            comment,
            reply_to: reply_to.clone(),
        })?;
        if let Some(parent) = reply_to.as_ref() {
            self.expand_thread(parent);
        }
        self.status_message = if reply_to.is_some() {
            "Reply posted.".to_string()
        } else {
            "Comment posted.".to_string()
        };
        Ok(true)
    }

    fn open_post_composer(&mut self) {
        self.popup = Some(Popup::Composer(ComposerForm {
            field: ComposerField::Title,
            prompt: None,
            emoji: None,
        }));
        self.editor.clamp(self.composer.body.char_len());
        self.status_message = "New post: Tab switches field, Ctrl-p publishes.".to_string();
    }

    fn handle_composer_key(
        &mut self,
        mut form: ComposerForm,
        key: KeyEvent,
    ) -> Result<Option<Popup>> {
        if let Some(index) = form.emoji {
            form.emoji = self.pick_emoji(index, key);
            return Ok(Some(Popup::Composer(form)));
        }

        if let Some(prompt) = form.prompt.as_mut() {
            match key.code {
                KeyCode::Esc => form.prompt = None,
                KeyCode::Enter => {
                    let kind = prompt.kind;
                    let input = prompt.input.trim().to_string();
                    form.prompt = None;
                    if !input.is_empty() {
                        if let Err(err) = self.complete_composer_prompt(kind, &input) {
                            self.report_error(&err);
                        }
                    }
                }
                KeyCode::Backspace => {
                    prompt.input.pop();
                }
                KeyCode::Char(ch) => prompt.input.push(ch),
                _ => {}
            }
            return Ok(Some(Popup::Composer(form)));
        }

        if is_ctrl(&key) {
            match key.code {
                KeyCode::Char('p') => {
                    return Ok(match self.publish() {
                        Ok(true) => None,
                        Ok(false) => Some(Popup::Composer(form)),
                        Err(err) => {
                            self.report_error(&err);
                            Some(Popup::Composer(form))
                        }
                    })
                }
                KeyCode::Char('g') => self.cycle_composer_channel(),
                KeyCode::Char('d') => {
                    self.composer.schedule_later(self.schedule_step);
                    if let Some(when) = self.composer.scheduled_for() {
                        self.status_message =
                            format!("Scheduled for {}.", when.format("%d/%m/%Y %H:%M"));
                    }
                }
                KeyCode::Char('l') => form.prompt = Some(Prompt::new(PromptKind::Link)),
                KeyCode::Char('a') => form.prompt = Some(Prompt::new(PromptKind::Media)),
                KeyCode::Char('e') => form.emoji = Some(0),
                _ => {
                    if form.field == ComposerField::Body {
                        self.edit_body(key);
                    }
                }
            }
            return Ok(Some(Popup::Composer(form)));
        }

        match key.code {
            KeyCode::Esc => {
                self.status_message = "Draft kept. Press n to continue writing.".to_string();
                return Ok(None);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                form.field = match form.field {
                    ComposerField::Title => ComposerField::Body,
                    ComposerField::Body => ComposerField::Title,
                };
            }
            KeyCode::Char('b') if is_alt(&key) => {
                form.prompt = Some(Prompt::new(PromptKind::Banner));
            }
            KeyCode::Char('d') if is_alt(&key) => {
                self.composer.clear_schedule();
                self.status_message = "Publishing immediately.".to_string();
            }
            _ => match form.field {
                ComposerField::Title => match key.code {
                    KeyCode::Backspace => {
                        self.composer.title.pop();
                    }
                    KeyCode::Enter => form.field = ComposerField::Body,
                    KeyCode::Char(ch) if !is_alt(&key) => self.composer.title.push(ch),
                    _ => {}
                },
                ComposerField::Body => self.edit_body(key),
            },
        }
        Ok(Some(Popup::Composer(form)))
    }

    fn edit_body(&mut self, key: KeyEvent) {
        let len = self.composer.body.char_len();
        let extend = key.modifiers.contains(KeyModifiers::SHIFT);
        let cursor = self.editor.cursor;
        match key.code {
            KeyCode::Left => self.editor.move_to(cursor.saturating_sub(1), extend),
            KeyCode::Right => self.editor.move_to((cursor + 1).min(len), extend),
            KeyCode::Home => self.editor.move_to(0, extend),
            KeyCode::End => self.editor.move_to(len, extend),
            KeyCode::Backspace => {
                let selection = self.editor.selection();
                if !selection.is_empty() {
                    self.composer.body.delete_range(selection.start, selection.end);
                    self.editor.collapse_to(selection.start);
                } else if cursor > 0 {
                    self.composer.body.delete_range(cursor - 1, cursor);
                    self.editor.collapse_to(cursor - 1);
                }
            }
            KeyCode::Delete => {
                let selection = self.editor.selection();
                if !selection.is_empty() {
                    self.composer.body.delete_range(selection.start, selection.end);
                    self.editor.collapse_to(selection.start);
                } else if cursor < len {
                    self.composer.body.delete_range(cursor, cursor + 1);
                }
            }
            KeyCode::Enter => self.type_text("\n"),
            KeyCode::Char(ch) if is_ctrl(&key) => {
                let format = match ch {
                    'b' => Format::Bold,
                    't' => Format::Italic,
                    's' => Format::Strikethrough,
                    'u' => Format::Underline,
                    'k' => Format::Code,
                    _ => return,
                };
                self.apply_format(format);
            }
            KeyCode::Char(ch) if is_alt(&key) => {
                let format = match ch {
                    '2' => Format::Heading2,
                    '3' => Format::Heading3,
                    'l' => Format::BulletList,
                    'o' => Format::NumberedList,
                    _ => return,
                };
                self.apply_format(format);
            }
            KeyCode::Char(ch) => self.type_text(ch.encode_utf8(&mut [0u8; 4])),
            _ => {}
        }
    }

    /// Moves around the emoji grid; Enter types the highlighted emoji at the
    /// cursor. Returns the new highlight, or `None` once the grid closes.
    fn pick_emoji(&mut self, index: usize, key: KeyEvent) -> Option<usize> {
        let last = EMOJIS.len() - 1;
        match key.code {
            KeyCode::Esc => None,
            KeyCode::Enter => {
                let emoji = EMOJIS[index.min(last)];
                self.type_text(emoji);
                self.status_message = format!("Inserted {emoji}.");
                None
            }
            KeyCode::Left => Some(index.saturating_sub(1)),
            KeyCode::Right => Some((index + 1).min(last)),
            KeyCode::Up => Some(index.saturating_sub(EMOJI_COLUMNS)),
            KeyCode::Down => Some((index + EMOJI_COLUMNS).min(last)),
            _ => Some(index),
        }
    }

    fn type_text(&mut self, text: &str) {
        let selection = self.editor.selection();
        if !selection.is_empty() {
            self.composer.body.delete_range(selection.start, selection.end);
        }
        self.composer.body.insert_text(selection.start, text);
        self.editor
            .collapse_to(selection.start + text.chars().count());
    }

    fn apply_format(&mut self, format: Format) {
        let selection = self.editor.selection();
        if selection.is_empty() {
            self.status_message = format!("Select text with Shift+←/→ to apply {format}.");
            return;
        }
        let picked = self.composer.body.text_in(selection.start, selection.end);
        self.composer
            .body
            .apply_format(selection.start, selection.end, format);
        if format.is_list() {
            let len = self.composer.body.char_len();
            self.editor.collapse_to(self.editor.cursor.min(len));
        }
        self.status_message = format!("Toggled {format} on \"{picked}\".");
    }

    fn complete_composer_prompt(&mut self, kind: PromptKind, input: &str) -> Result<()> {
        match kind {
            PromptKind::Link => {
                let (url, text) = match input.split_once(char::is_whitespace) {
                    Some((url, text)) => (url, Some(text.trim())),
                    None => (input, None),
                };
                let selection = self.editor.selection();
                let before = self.composer.body.char_len();
                self.composer
                    .body
                    .insert_link(selection.start, selection.end, url, text)?;
                let end = if selection.is_empty() {
                    let inserted = self.composer.body.char_len().saturating_sub(before);
                    self.editor.collapse_to(selection.start + inserted);
                    selection.start + inserted
                } else {
                    selection.end
                };
                let linked = self.composer.body.text_in(selection.start, end);
                self.status_message = format!("Linked \"{linked}\" to {url}.");
            }
            PromptKind::Banner => {
                self.composer.add_banner_images(vec![input.to_string()])?;
                self.status_message = "Added banner image.".to_string();
            }
            PromptKind::Media => self.attach_media(input)?,
            PromptKind::Attachment => {}
        }
        Ok(())
    }

    fn attach_media(&mut self, input: &str) -> Result<()> {
        if input.starts_with("http://") || input.starts_with("https://") {
            let platform = Platform::detect(input).with_context(|| {
                let supported: Vec<&str> = Platform::ALL.iter().map(|p| p.name()).collect();
                format!("{input} is not a video link; supported: {}", supported.join(", "))
            })?;
            self.composer.add_video_link(platform, input)?;
            self.status_message = format!("Added {} link.", platform.name());
            return Ok(());
        }

        let path = Path::new(input);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string());
        if is_video_path(path) {
            self.composer.add_videos(vec![VideoUpload {
                uri: input.to_string(),
                thumbnail: String::new(),
            }])?;
        } else if AttachmentKind::from_path(path) == AttachmentKind::Image {
            self.composer.add_body_images(vec![input.to_string()])?;
        } else {
            let size = fs::metadata(path)
                .map(|meta| format_size(meta.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            self.composer.add_files(vec![FileUpload {
                name: name.clone(),
                size,
                uri: input.to_string(),
            }])?;
        }
        self.status_message = format!("Attached {name}.");
        Ok(())
    }

    fn cycle_composer_channel(&mut self) {
        if self.composer_channels.is_empty() {
            return;
        }
        let next = self
            .composer_channels
            .iter()
            .position(|name| name == self.composer.channel())
            .map(|idx| (idx + 1) % self.composer_channels.len())
            .unwrap_or(0);
        let channel = self.composer_channels[next].clone();
        self.composer.set_channel(&channel);
        self.status_message = format!("Posting to {channel}.");
    }

    /// Returns false when the draft was not ready.
    fn publish(&mut self) -> Result<bool> {
        if !self.composer.can_publish() {
            self.status_message = "Write something or add an image before publishing.".to_string();
            return Ok(false);
        }
        let post = self.composer.publish(&self.viewer)?;
        let id = post.id.clone();
        self.feed = self.feed.with_post(post);
        self.editor = BodyEditor::default();
        self.refresh_view();
        self.status_message = if self.select_post_id(&id) {
            self.focused_pane = Pane::Posts;
            "Post published.".to_string()
        } else {
            format!("Post published; it is hidden by the {} filter.", self.filter.label())
        };
        Ok(true)
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(COLOR_BG)), full);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        let status_line = Paragraph::new(self.status_message.clone()).style(
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .bg(COLOR_PANEL_FOCUSED_BG)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, layout[0]);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(layout[1]);

        for (pane, area) in Pane::ALL.iter().zip(main_chunks.iter()) {
            match pane {
                Pane::Posts => self.draw_posts(frame, *area),
                Pane::Content => self.draw_content(frame, *area),
                Pane::Comments => self.draw_comments(frame, *area),
            }
        }

        let footer = Paragraph::new(self.footer_text())
            .style(
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .bg(COLOR_PANEL_BG)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, layout[2]);

        match &self.popup {
            Some(Popup::Channels(picker)) => self.draw_channel_picker(frame, layout[1], picker),
            Some(Popup::Comment { prompt }) => {
                self.draw_comment_composer(frame, layout[1], prompt.as_ref())
            }
            Some(Popup::Composer(form)) => self.draw_post_composer(frame, layout[1], form),
            None => {}
        }
    }

    fn pane_block(&self, pane: Pane) -> Block<'static> {
        let focused = self.focused_pane == pane;
        let border_style = if focused {
            Style::default().fg(COLOR_BORDER_FOCUSED)
        } else {
            Style::default().fg(COLOR_BORDER_IDLE)
        };
        let title_style = if focused {
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_TEXT_SECONDARY)
        };
        let title = match pane {
            Pane::Posts => format!("{} · {}", pane.title(), self.filter.label()),
            _ => pane.title().to_string(),
        };
        Block::default()
            .title(Span::styled(title, title_style))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(COLOR_PANEL_BG))
            .padding(Padding::uniform(1))
    }

    fn popup_block(title: &str) -> Block<'static> {
        Block::default()
            .title(Span::styled(
                title.to_string(),
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_ACCENT))
            .style(Style::default().bg(COLOR_PANEL_BG))
            .padding(Padding::horizontal(1))
    }

    fn draw_posts(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = self.pane_block(Pane::Posts);
        let inner = block.inner(area);
        let width = inner.width.max(1) as usize;
        let focused = self.focused_pane == Pane::Posts;

        if self.visible_posts.is_empty() {
            let empty = Paragraph::new(Text::from(wrap_plain(
                "No posts match this filter. Press f to change it.",
                width,
                Style::default().fg(COLOR_TEXT_SECONDARY),
            )))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let mut items: Vec<ListItem> = Vec::with_capacity(self.visible_posts.len());
        for (idx, post) in self.visible_posts.iter().enumerate() {
            let selected = idx == self.selected_post;
            let background = if selected && focused {
                COLOR_PANEL_SELECTED_BG
            } else if selected {
                COLOR_PANEL_FOCUSED_BG
            } else {
                COLOR_PANEL_BG
            };
            let mut badges = String::new();
            if post.is_pinned {
                badges.push_str(ICON_PINNED);
                badges.push(' ');
            }
            if post.is_saved {
                badges.push_str(ICON_SAVED);
                badges.push(' ');
            }
            let title_style = Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .bg(background)
                .add_modifier(Modifier::BOLD);
            let meta_style = Style::default().fg(COLOR_TEXT_SECONDARY).bg(background);
            let heart_style = if post.is_liked() {
                Style::default().fg(COLOR_ERROR).bg(background)
            } else {
                meta_style
            };

            let headline = format!("{badges}{}", post_headline(post));
            let mut lines: Vec<Line<'static>> = wrap_plain(&headline, width, title_style)
                .into_iter()
                .take(2)
                .collect();
            let channel = post.location.as_deref().unwrap_or("General");
            lines.extend(wrap_plain(
                &format!("{} · {} · {}", post.author.name, channel, post.timestamp),
                width,
                meta_style,
            ));
            let heart = if post.is_liked() { "♥" } else { "♡" };
            lines.push(Line::from(vec![
                Span::styled(format!("{heart} {}", post.total_reactions), heart_style),
                Span::styled(
                    format!(
                        "  {ICON_COMMENTS} {}  {ICON_VIEWS} {}",
                        post.comments_count, post.views
                    ),
                    meta_style,
                ),
            ]));
            lines.push(Line::from(Span::styled(String::new(), meta_style)));
            pad_lines_to_width(&mut lines, inner.width);
            items.push(ListItem::new(lines));
        }

        let mut state = ListState::default().with_selected(Some(self.selected_post));
        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn content_text(&self, post: &Post, width: usize) -> Text<'static> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let meta_style = Style::default().fg(COLOR_TEXT_SECONDARY);
        let mut author = post.author.name.clone();
        if let Some(role) = post.author.role.as_deref() {
            author.push_str(&format!(" ({role})"));
        }
        lines.push(Line::from(vec![
            Span::styled(
                author,
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    " · {} · {}",
                    post.location.as_deref().unwrap_or("General"),
                    post.timestamp
                ),
                meta_style,
            ),
        ]));
        if post.is_pinned {
            lines.push(Line::from(Span::styled(
                format!("{ICON_PINNED} Pinned"),
                Style::default().fg(COLOR_SUCCESS),
            )));
        }
        lines.push(Line::default());

        if let Some(title) = post.title.as_deref() {
            lines.extend(wrap_plain(
                title,
                width,
                Style::default()
                    .fg(COLOR_TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::default());
        }

        lines.extend(self.renderer.render(&post.content).lines);

        if let Some(media) = post.media.as_ref() {
            lines.push(Line::default());
            lines.extend(wrap_plain(
                &media.summary(),
                width,
                Style::default().fg(COLOR_ACCENT),
            ));
        }

        lines.push(Line::default());
        let mut reactions: Vec<Span<'static>> = Vec::new();
        for reaction in &post.reactions {
            let style = if reaction.user_reacted {
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                meta_style
            };
            reactions.push(Span::styled(
                format!("{} {}  ", reaction.kind.emoji(), reaction.count),
                style,
            ));
        }
        lines.push(Line::from(reactions));
        lines.push(Line::from(Span::styled(
            format!(
                "{} reactions · {} comments · {} shares · {} views",
                post.total_reactions, post.comments_count, post.shares, post.views
            ),
            meta_style,
        )));
        if post.comments_disabled {
            lines.push(Line::from(Span::styled(
                "Comments are turned off.",
                Style::default().fg(COLOR_ERROR),
            )));
        }
        Text::from(lines)
    }

    fn draw_content(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = self.pane_block(Pane::Content);
        let inner = block.inner(area);
        let text = match self.current_post() {
            Some(post) => self.content_text(&post, inner.width.max(1) as usize),
            None => Text::from("Nothing selected."),
        };
        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(COLOR_TEXT_PRIMARY))
            .wrap(Wrap { trim: false })
            .scroll((self.content_scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_comments(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = self.pane_block(Pane::Comments);
        let inner = block.inner(area);
        let width = inner.width.max(1) as usize;
        let focused = self.focused_pane == Pane::Comments;

        let status_style = Style::default()
            .fg(COLOR_TEXT_SECONDARY)
            .bg(COLOR_PANEL_BG)
            .add_modifier(Modifier::BOLD);
        let Some(post) = self.current_post() else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };
        let status = if post.comments_disabled {
            format!("{} comments · comments are turned off", post.comments_count)
        } else if post.comments.is_empty() {
            "No comments yet. Press c to start the conversation.".to_string()
        } else {
            format!("{} comments", post.comments_count)
        };
        let mut status_lines = wrap_plain(&status, width, status_style);
        status_lines.push(Line::from(Span::styled(String::new(), status_style)));
        pad_lines_to_width(&mut status_lines, inner.width);

        let collapsed = self.collapsed_threads(&post);
        let entries = post.comments.walk(&collapsed);
        let mut items: Vec<ListItem> = Vec::with_capacity(entries.len() + 1);
        items.push(ListItem::new(status_lines));
        for (idx, entry) in entries.iter().enumerate() {
            let selected = idx == self.selected_comment;
            let highlight = focused && selected;
            let background = if highlight {
                COLOR_PANEL_SELECTED_BG
            } else {
                COLOR_PANEL_BG
            };
            let mut meta_style = Style::default()
                .fg(comment_depth_color(entry.depth))
                .bg(background);
            if highlight {
                meta_style = meta_style.add_modifier(Modifier::BOLD);
            }
            let body_color = if highlight || selected {
                COLOR_TEXT_PRIMARY
            } else {
                COLOR_TEXT_SECONDARY
            };
            let body_style = Style::default().fg(body_color).bg(background);

            let id = &entry.node.comment.id;
            let has_replies = !entry.node.children.is_empty();
            let is_collapsed = collapsed.contains(id);
            let indicator = match (has_replies, is_collapsed) {
                (false, _) => "   ",
                (true, true) => "[+]",
                (true, false) => "[-]",
            };
            let hidden = is_collapsed.then(|| post.comments.descendant_count(id));
            let mut lines = comment_lines(entry, width, indicator, meta_style, body_style, hidden);
            lines.push(Line::from(Span::styled(String::new(), body_style)));
            pad_lines_to_width(&mut lines, inner.width);
            items.push(ListItem::new(lines));
        }

        let selected = (!entries.is_empty()).then_some(self.selected_comment + 1);
        let mut state = ListState::default().with_selected(selected);
        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_channel_picker(&self, frame: &mut Frame<'_>, area: Rect, picker: &ChannelPicker) {
        let popup_area = centered_rect(40, 60, area);
        frame.render_widget(Clear, popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Filter: ", Style::default().fg(COLOR_TEXT_SECONDARY)),
                Span::styled(
                    format!("{}{CURSOR}", picker.query),
                    Style::default().fg(COLOR_TEXT_PRIMARY),
                ),
            ]),
            Line::default(),
        ];
        let matches = filter_channels(&self.feed_channels, &picker.query);
        if matches.is_empty() {
            lines.push(Line::from(Span::styled(
                "No channel matches.",
                Style::default().fg(COLOR_TEXT_SECONDARY),
            )));
        }
        for (idx, channel) in matches.iter().enumerate() {
            let selected = idx == picker.selected;
            let marker = if selected { "›" } else { " " };
            let current = if picker.current.as_deref() == Some(*channel) {
                " ✓"
            } else {
                ""
            };
            let style = if selected {
                Style::default()
                    .fg(COLOR_TEXT_PRIMARY)
                    .bg(COLOR_PANEL_SELECTED_BG)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(COLOR_TEXT_SECONDARY)
            };
            lines.push(Line::from(Span::styled(
                format!("{marker} {channel}{current}"),
                style,
            )));
        }
        let popup = Paragraph::new(Text::from(lines))
            .block(Self::popup_block("Move to channel"))
            .wrap(Wrap { trim: false });
        frame.render_widget(popup, popup_area);
    }

    fn prompt_line(prompt: &Prompt) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{}: ", prompt.kind.label()),
                Style::default().fg(COLOR_ACCENT),
            ),
            Span::styled(
                format!("{}{CURSOR}", prompt.input),
                Style::default().fg(COLOR_TEXT_PRIMARY),
            ),
        ])
    }

    fn draw_comment_composer(&self, frame: &mut Frame<'_>, area: Rect, prompt: Option<&Prompt>) {
        let popup_area = centered_rect(60, 45, area);
        frame.render_widget(Clear, popup_area);
        let width = popup_area.width.saturating_sub(4).max(1) as usize;

        let mut lines: Vec<Line<'static>> = Vec::new();
        if let Some(target) = self.comment_draft.reply_target() {
            lines.push(Line::from(Span::styled(
                format!("Replying to {} · Esc cancels", target.author),
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::default());
        }
        if self.comment_draft.text.is_empty() {
            lines.push(Line::from(Span::styled(
                self.comment_draft.placeholder(),
                Style::default().fg(COLOR_TEXT_SECONDARY),
            )));
        } else {
            let body = format!("{}{CURSOR}", self.comment_draft.text);
            lines.extend(wrap_plain(
                &body,
                width,
                Style::default().fg(COLOR_TEXT_PRIMARY),
            ));
        }
        for attachment in self.comment_draft.attachments() {
            lines.push(Line::from(Span::styled(
                format!("{ICON_ATTACHMENT} {}", attachment.name),
                Style::default().fg(COLOR_TEXT_SECONDARY),
            )));
        }
        if let Some(prompt) = prompt {
            lines.push(Line::default());
            lines.push(Self::prompt_line(prompt));
        }
        let title = if self.comment_draft.reply_target().is_some() {
            "Reply"
        } else {
            "Comment"
        };
        let popup = Paragraph::new(Text::from(lines))
            .block(Self::popup_block(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(popup, popup_area);
    }

    fn draw_post_composer(&self, frame: &mut Frame<'_>, area: Rect, form: &ComposerForm) {
        let popup_area = centered_rect(80, 85, area);
        frame.render_widget(Clear, popup_area);
        let block = Self::popup_block(&format!("New post in {}", self.composer.channel()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let prompt_height = if form.emoji.is_some() {
            EMOJIS.len().div_ceil(EMOJI_COLUMNS) as u16
        } else if form.prompt.is_some() {
            1
        } else {
            0
        };
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(prompt_height),
            ])
            .split(inner);

        let field_block = |field: ComposerField, title: &str| {
            let focused = form.field == field && form.prompt.is_none() && form.emoji.is_none();
            let border = if focused {
                COLOR_BORDER_FOCUSED
            } else {
                COLOR_BORDER_IDLE
            };
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default().fg(COLOR_TEXT_SECONDARY),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
        };

        let title_text = if form.field == ComposerField::Title {
            format!("{}{CURSOR}", self.composer.title)
        } else {
            self.composer.title.clone()
        };
        frame.render_widget(
            Paragraph::new(title_text)
                .style(Style::default().fg(COLOR_TEXT_PRIMARY))
                .block(field_block(ComposerField::Title, "Title")),
            sections[0],
        );

        let body = if form.field == ComposerField::Body {
            self.renderer.render_with_selection(
                &self.composer.body,
                self.editor.selection(),
                self.editor.cursor,
            )
        } else {
            self.renderer.render(&self.composer.body)
        };
        frame.render_widget(
            Paragraph::new(body)
                .block(field_block(ComposerField::Body, "Body"))
                .wrap(Wrap { trim: false }),
            sections[1],
        );

        let schedule = match self.composer.scheduled_for() {
            Some(when) => format!("Scheduled for {}", when.format("%d/%m/%Y %H:%M")),
            None => "Publishes now".to_string(),
        };
        let media = format!(
            "Banners {} · Images {} · Videos {} · Links {} · Files {}",
            self.composer.banner_images().len(),
            self.composer.body_images().len(),
            self.composer.videos().len(),
            self.composer.video_links().len(),
            self.composer.files().len(),
        );
        let ready_style = if self.composer.can_publish() {
            Style::default().fg(COLOR_SUCCESS)
        } else {
            Style::default().fg(COLOR_TEXT_SECONDARY)
        };
        let info = Text::from(vec![
            Line::from(Span::styled(
                format!("Channel: {} · {}", self.composer.channel(), schedule),
                Style::default().fg(COLOR_TEXT_SECONDARY),
            )),
            Line::from(Span::styled(media, Style::default().fg(COLOR_TEXT_SECONDARY))),
            Line::from(Span::styled(
                if self.composer.can_publish() {
                    "Ready to publish"
                } else {
                    "Write something or add an image"
                },
                ready_style,
            )),
        ]);
        frame.render_widget(Paragraph::new(info), sections[2]);

        if let Some(selected) = form.emoji {
            frame.render_widget(Paragraph::new(Self::emoji_grid(selected)), sections[3]);
        } else if let Some(prompt) = form.prompt.as_ref() {
            frame.render_widget(Paragraph::new(Self::prompt_line(prompt)), sections[3]);
        }
    }

    fn emoji_grid(selected: usize) -> Text<'static> {
        let lines: Vec<Line<'static>> = EMOJIS
            .chunks(EMOJI_COLUMNS)
            .enumerate()
            .map(|(row, chunk)| {
                let spans: Vec<Span<'static>> = chunk
                    .iter()
                    .enumerate()
                    .map(|(col, emoji)| {
                        let style = if row * EMOJI_COLUMNS + col == selected {
                            Style::default().bg(COLOR_PANEL_SELECTED_BG)
                        } else {
                            Style::default()
                        };
                        Span::styled(format!(" {emoji} "), style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        Text::from(lines)
    }

    fn footer_text(&self) -> String {
        match &self.popup {
            Some(Popup::Channels(_)) => {
                return "Channels: type to filter · ↑/↓ select · Enter move · Esc cancel"
                    .to_string()
            }
            Some(Popup::Composer(ComposerForm { emoji: Some(_), .. })) => {
                return "Emoji: arrows move · Enter insert · Esc close".to_string()
            }
            Some(Popup::Comment { prompt: Some(_) })
            | Some(Popup::Composer(ComposerForm { prompt: Some(_), .. })) => {
                return "Enter confirm · Esc cancel".to_string()
            }
            Some(Popup::Comment { prompt: None }) => {
                return "Enter send · Ctrl-a attach · Ctrl-x drop attachment · Esc close"
                    .to_string()
            }
            Some(Popup::Composer(_)) => {
                return "Tab field · Shift+←/→ select · Ctrl-b/t/s/u/k bold/italic/strike/underline/code · Alt-2/3 heading · Alt-l/o list · Ctrl-l link · Ctrl-a attach · Ctrl-e emoji · Alt-b banner · Ctrl-g channel · Ctrl-d schedule · Ctrl-p publish · Esc close"
                    .to_string()
            }
            None => {}
        }

        let mut parts: Vec<String> = Vec::new();
        match self.focused_pane {
            Pane::Posts => {
                if self.visible_posts.is_empty() {
                    parts.push("No posts here".to_string());
                } else {
                    parts.push("Posts: j/k move".to_string());
                    parts.push("v like · s save · p pin · d comments on/off · m move".to_string());
                }
            }
            Pane::Content => {
                parts.push("Content: j/k scroll".to_string());
                parts.push("v like · c comment".to_string());
            }
            Pane::Comments => {
                parts.push("Comments: j/k move, Enter show replies".to_string());
                parts.push("v like · c comment · r reply".to_string());
            }
        }
        parts.push(format!("f filter ({})", self.filter.label()));
        parts.push("n new post".to_string());
        parts.push("q quit".to_string());
        parts.join(" · ")
    }
}

fn step_index(current: usize, delta: i32, last: usize) -> usize {
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        current.saturating_add(delta as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{mock_viewer, FeedSource, MockFeedSource, COMPOSER_CHANNELS, FEED_CHANNELS};

    fn model() -> Model {
        let source = MockFeedSource::default();
        Model::new(Options {
            status_message: String::new(),
            posts: source.load_posts().unwrap(),
            viewer: Viewer::new(source.current_user()),
            filter: FeedFilter::All,
            feed_channels: FEED_CHANNELS.iter().map(|s| s.to_string()).collect(),
            composer_channels: COMPOSER_CHANNELS.iter().map(|s| s.to_string()).collect(),
            default_channel: "General".to_string(),
            schedule_step: Duration::from_secs(3600),
            replies_expanded: false,
        })
    }

    fn press(model: &mut Model, code: KeyCode) -> bool {
        model
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn press_with(model: &mut Model, code: KeyCode, modifiers: KeyModifiers) {
        model.handle_key(KeyEvent::new(code, modifiers)).unwrap();
    }

    fn type_str(model: &mut Model, text: &str) {
        for ch in text.chars() {
            press(model, KeyCode::Char(ch));
        }
    }

    fn total_width(line: &Line<'_>) -> usize {
        line.spans
            .iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum()
    }

    #[test]
    fn pad_lines_extends_to_width() {
        let mut lines = vec![Line::from(vec![Span::raw("abc")])];
        pad_lines_to_width(&mut lines, 6);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[1].content.as_ref(), "   ");
        assert_eq!(total_width(&lines[0]), 6);
    }

    #[test]
    fn pad_lines_supports_wide_glyphs() {
        let mut lines = vec![Line::from(vec![Span::raw("🦀")])];
        pad_lines_to_width(&mut lines, 3);
        assert_eq!(total_width(&lines[0]), 3);
    }

    #[test]
    fn fuzzy_filter_ranks_channels() {
        let channels: Vec<String> = FEED_CHANNELS.iter().map(|s| s.to_string()).collect();
        let matches = filter_channels(&channels, "tech");
        assert_eq!(matches.first().copied(), Some("Technology"));
        assert_eq!(filter_channels(&channels, "").len(), channels.len());
        assert!(filter_channels(&channels, "zzzz").is_empty());
    }

    #[test]
    fn pinned_post_is_selected_first() {
        let model = model();
        let first = model.current_post().unwrap();
        assert!(first.is_pinned);
    }

    #[test]
    fn like_key_flips_heart() {
        let mut model = model();
        let before = model.current_post().unwrap();
        press(&mut model, KeyCode::Char('v'));
        let after = model.current_post().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.is_liked(), !before.is_liked());
        assert_eq!(after.total_reactions, after.reaction_sum());
    }

    #[test]
    fn filter_key_cycles_and_keeps_selection_valid() {
        let mut model = model();
        press(&mut model, KeyCode::Char('f'));
        assert_eq!(model.filter, FeedFilter::MyPosts);
        assert!(model
            .visible_posts
            .iter()
            .all(|post| post.author == mock_viewer()));
        press(&mut model, KeyCode::Char('f'));
        assert_eq!(model.filter, FeedFilter::Saved);
        assert!(model.visible_posts.iter().all(|post| post.is_saved));
        assert!(model.selected_post < model.visible_posts.len().max(1));
    }

    #[test]
    fn channel_picker_moves_post() {
        let mut model = model();
        let id = model.current_post().unwrap().id.clone();
        press(&mut model, KeyCode::Char('m'));
        type_str(&mut model, "tech");
        press(&mut model, KeyCode::Enter);
        assert!(model.popup.is_none());
        let post = model.feed.get(&id).unwrap();
        assert_eq!(post.location.as_deref(), Some("Technology"));
    }

    #[test]
    fn comment_is_posted_on_selected_post() {
        let mut model = model();
        let before = model.current_post().unwrap();
        press(&mut model, KeyCode::Char('c'));
        type_str(&mut model, "nice work");
        press(&mut model, KeyCode::Enter);
        assert!(model.popup.is_none());
        let after = model.current_post().unwrap();
        assert_eq!(after.comments_count, before.comments_count + 1);
        let last_root = after.comments.roots().last().unwrap();
        let node = after.comments.get(last_root).unwrap();
        assert_eq!(node.comment.content, "nice work");
        assert_eq!(node.comment.author, mock_viewer());
    }

    #[test]
    fn reply_expands_parent_thread() {
        let mut model = model();
        press(&mut model, KeyCode::Char('l'));
        press(&mut model, KeyCode::Char('l'));
        assert_eq!(model.focused_pane, Pane::Comments);
        let parent = model.selected_comment_id().unwrap();
        assert!(model.thread_collapsed(&parent));

        press(&mut model, KeyCode::Char('r'));
        type_str(&mut model, "agreed");
        press(&mut model, KeyCode::Enter);

        let post = model.current_post().unwrap();
        let children = post.comments.children(&parent);
        let reply = post.comments.get(children.last().unwrap()).unwrap();
        assert_eq!(reply.comment.content, "agreed");
        assert!(!model.thread_collapsed(&parent));
    }

    #[test]
    fn disabled_comments_block_the_composer() {
        let mut model = model();
        let locked = model
            .visible_posts
            .iter()
            .find(|post| post.comments_disabled)
            .unwrap()
            .id
            .clone();
        assert!(model.select_post_id(&locked));
        press(&mut model, KeyCode::Char('c'));
        assert!(model.popup.is_none());
        assert!(model.status_message.contains("turned off"));
    }

    #[test]
    fn replies_are_collapsed_until_expanded() {
        let mut model = model();
        let before = model.visible_comment_ids().len();
        press(&mut model, KeyCode::Char('l'));
        press(&mut model, KeyCode::Char('l'));
        press(&mut model, KeyCode::Enter);
        assert!(model.visible_comment_ids().len() > before);
    }

    #[test]
    fn composer_formats_and_publishes() {
        let mut model = model();
        let count = model.feed.len();
        press(&mut model, KeyCode::Char('n'));
        type_str(&mut model, "Hello");
        press(&mut model, KeyCode::Tab);
        type_str(&mut model, "make it bold");
        for _ in 0..4 {
            press_with(&mut model, KeyCode::Left, KeyModifiers::SHIFT);
        }
        press_with(&mut model, KeyCode::Char('b'), KeyModifiers::CONTROL);
        let segments = model.composer.body.segments().to_vec();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "bold");
        assert!(segments[1].style.bold);
        assert_eq!(model.status_message, "Toggled Bold on \"bold\".");

        press_with(&mut model, KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert!(model.popup.is_none());
        assert_eq!(model.feed.len(), count + 1);
        let published = model.current_post().unwrap();
        assert_eq!(published.title.as_deref(), Some("Hello"));
        assert_eq!(published.content.plain_text(), "make it bold");
        assert!(model.composer.title.is_empty());
    }

    #[test]
    fn banner_limit_keeps_composer_open() {
        let mut model = model();
        press(&mut model, KeyCode::Char('n'));
        for idx in 0..11 {
            press_with(&mut model, KeyCode::Char('b'), KeyModifiers::ALT);
            type_str(&mut model, &format!("banner-{idx}.png"));
            press(&mut model, KeyCode::Enter);
        }
        assert!(matches!(model.popup, Some(Popup::Composer(_))));
        assert_eq!(model.composer.banner_images().len(), 10);
        assert!(model.status_message.starts_with("Error:"));
    }

    #[test]
    fn unsupported_video_link_keeps_composer_open() {
        let mut model = model();
        press(&mut model, KeyCode::Char('n'));
        press_with(&mut model, KeyCode::Char('a'), KeyModifiers::CONTROL);
        type_str(&mut model, "https://example.com/clip");
        press(&mut model, KeyCode::Enter);
        assert!(matches!(model.popup, Some(Popup::Composer(_))));
        assert!(model.composer.video_links().is_empty());
        assert!(model.status_message.contains("example.com"));
        assert!(model.status_message.contains("YouTube, Vimeo, Loom, Instagram"));
    }

    #[test]
    fn emoji_grid_types_at_cursor() {
        let mut model = model();
        press(&mut model, KeyCode::Char('n'));
        press(&mut model, KeyCode::Tab);
        type_str(&mut model, "done ");
        press_with(&mut model, KeyCode::Char('e'), KeyModifiers::CONTROL);
        press(&mut model, KeyCode::Down);
        press(&mut model, KeyCode::Right);
        press(&mut model, KeyCode::Enter);
        assert!(matches!(
            model.popup,
            Some(Popup::Composer(ComposerForm { emoji: None, .. }))
        ));
        assert_eq!(
            model.composer.body.plain_text(),
            format!("done {}", EMOJIS[EMOJI_COLUMNS + 1])
        );
        assert_eq!(model.editor.cursor, 6);
    }

    #[test]
    fn empty_composer_stays_open() {
        let mut model = model();
        press(&mut model, KeyCode::Char('n'));
        press_with(&mut model, KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert!(matches!(model.popup, Some(Popup::Composer(_))));
    }

    #[test]
    fn link_prompt_inserts_link_text() {
        let mut model = model();
        press(&mut model, KeyCode::Char('n'));
        press(&mut model, KeyCode::Tab);
        press_with(&mut model, KeyCode::Char('l'), KeyModifiers::CONTROL);
        type_str(&mut model, "https://example.com docs");
        press(&mut model, KeyCode::Enter);
        let segments = model.composer.body.segments();
        assert_eq!(segments[0].text, "docs");
        assert_eq!(segments[0].style.link.as_deref(), Some("https://example.com"));
        assert_eq!(model.editor.cursor, 4);
        assert_eq!(model.status_message, "Linked \"docs\" to https://example.com.");
    }

    #[test]
    fn composer_channel_cycles() {
        let mut model = model();
        press(&mut model, KeyCode::Char('n'));
        press_with(&mut model, KeyCode::Char('g'), KeyModifiers::CONTROL);
        assert_eq!(model.composer.channel(), "Announcements");
    }

    #[test]
    fn comment_lines_report_hidden_replies() {
        let source = MockFeedSource::default();
        let posts = source.load_posts().unwrap();
        let post = posts.iter().find(|post| post.comments.len() > 2).unwrap();
        let entries = post.comments.walk(&HashSet::new());
        let root = &entries[0];
        let hidden = post.comments.descendant_count(&root.node.comment.id);
        let lines = comment_lines(root, 200, "[+]", Style::default(), Style::default(), Some(hidden));
        let header: String = lines[0]
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert!(header.contains("hidden"));
        assert!(header.contains(&root.node.comment.author.name));
    }

    #[test]
    fn quit_key_ends_loop() {
        let mut model = model();
        assert!(press(&mut model, KeyCode::Char('q')));
    }
}
