//! Draft state for new posts and new comments.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use url::Url;

use crate::comments::CommentTree;
use crate::model::{Attachment, CommentId, Media, Post, PostId, Viewer, JUST_NOW};
use crate::richtext::Document;

pub const MAX_BANNER_IMAGES: usize = 10;
pub const MAX_BODY_IMAGES: usize = 10;
pub const MAX_FILES: usize = 10;
pub const MAX_VIDEOS: usize = 5;
pub const MAX_VIDEO_LINKS: usize = 10;

pub const DEFAULT_CHANNEL: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    BannerImages,
    BodyImages,
    Files,
    Videos,
    VideoLinks,
}

impl MediaSlot {
    pub fn limit(self) -> usize {
        match self {
            MediaSlot::BannerImages => MAX_BANNER_IMAGES,
            MediaSlot::BodyImages => MAX_BODY_IMAGES,
            MediaSlot::Files => MAX_FILES,
            MediaSlot::Videos => MAX_VIDEOS,
            MediaSlot::VideoLinks => MAX_VIDEO_LINKS,
        }
    }
}

impl fmt::Display for MediaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaSlot::BannerImages => "banner images",
            MediaSlot::BodyImages => "body images",
            MediaSlot::Files => "files",
            MediaSlot::Videos => "videos",
            MediaSlot::VideoLinks => "video links",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    #[error("at most {limit} {kind} can be attached")]
    LimitExceeded { kind: MediaSlot, limit: usize },
    #[error("write something or add an image before publishing")]
    Empty,
    #[error("video link url is empty")]
    EmptyVideoUrl,
    #[error("comment {0} cannot be replied to")]
    UnknownReplyTarget(CommentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Vimeo,
    Loom,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::YouTube,
        Platform::Vimeo,
        Platform::Loom,
        Platform::Instagram,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Vimeo => "Vimeo",
            Platform::Loom => "Loom",
            Platform::Instagram => "Instagram",
        }
    }

    /// Guesses the platform from the url host.
    pub fn detect(raw: &str) -> Option<Platform> {
        let url = Url::parse(raw.trim()).ok()?;
        let host = url.host_str()?.trim_start_matches("www.").to_ascii_lowercase();
        let platform = match host.as_str() {
            "youtube.com" | "m.youtube.com" | "youtu.be" => Platform::YouTube,
            "vimeo.com" | "player.vimeo.com" => Platform::Vimeo,
            "loom.com" => Platform::Loom,
            "instagram.com" => Platform::Instagram,
            _ => return None,
        };
        Some(platform)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub size: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub uri: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLink {
    pub platform: Platform,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PostComposer {
    pub title: String,
    pub body: Document,
    channel: String,
    banner_images: Vec<String>,
    body_images: Vec<String>,
    files: Vec<FileUpload>,
    videos: Vec<VideoUpload>,
    video_links: Vec<VideoLink>,
    scheduled_for: Option<DateTime<Local>>,
    default_channel: String,
}

impl Default for PostComposer {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL)
    }
}

fn push_limited<T>(items: &mut Vec<T>, new: Vec<T>, slot: MediaSlot) -> Result<(), ComposerError> {
    let limit = slot.limit();
    if items.len() + new.len() > limit {
        return Err(ComposerError::LimitExceeded { kind: slot, limit });
    }
    items.extend(new);
    Ok(())
}

impl PostComposer {
    pub fn new(default_channel: &str) -> Self {
        Self {
            title: String::new(),
            body: Document::new(),
            channel: default_channel.to_string(),
            banner_images: Vec::new(),
            body_images: Vec::new(),
            files: Vec::new(),
            videos: Vec::new(),
            video_links: Vec::new(),
            scheduled_for: None,
            default_channel: default_channel.to_string(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn set_channel(&mut self, channel: &str) {
        self.channel = channel.to_string();
    }

    pub fn banner_images(&self) -> &[String] {
        &self.banner_images
    }

    pub fn body_images(&self) -> &[String] {
        &self.body_images
    }

    pub fn files(&self) -> &[FileUpload] {
        &self.files
    }

    pub fn videos(&self) -> &[VideoUpload] {
        &self.videos
    }

    pub fn video_links(&self) -> &[VideoLink] {
        &self.video_links
    }

    pub fn scheduled_for(&self) -> Option<DateTime<Local>> {
        self.scheduled_for
    }

    /// Adds a batch of images; the whole batch is refused if it would go over
    /// the limit.
    pub fn add_banner_images(&mut self, images: Vec<String>) -> Result<(), ComposerError> {
        push_limited(&mut self.banner_images, images, MediaSlot::BannerImages)
    }

    pub fn add_body_images(&mut self, images: Vec<String>) -> Result<(), ComposerError> {
        push_limited(&mut self.body_images, images, MediaSlot::BodyImages)
    }

    pub fn add_files(&mut self, files: Vec<FileUpload>) -> Result<(), ComposerError> {
        push_limited(&mut self.files, files, MediaSlot::Files)
    }

    pub fn add_videos(&mut self, videos: Vec<VideoUpload>) -> Result<(), ComposerError> {
        push_limited(&mut self.videos, videos, MediaSlot::Videos)
    }

    pub fn add_video_link(&mut self, platform: Platform, url: &str) -> Result<(), ComposerError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ComposerError::EmptyVideoUrl);
        }
        push_limited(
            &mut self.video_links,
            vec![VideoLink {
                platform,
                url: url.to_string(),
            }],
            MediaSlot::VideoLinks,
        )
    }

    pub fn remove(&mut self, slot: MediaSlot, index: usize) {
        fn remove_at<T>(items: &mut Vec<T>, index: usize) {
            if index < items.len() {
                items.remove(index);
            }
        }
        match slot {
            MediaSlot::BannerImages => remove_at(&mut self.banner_images, index),
            MediaSlot::BodyImages => remove_at(&mut self.body_images, index),
            MediaSlot::Files => remove_at(&mut self.files, index),
            MediaSlot::Videos => remove_at(&mut self.videos, index),
            MediaSlot::VideoLinks => remove_at(&mut self.video_links, index),
        }
    }

    /// Moves the schedule forward by `step`, starting from now.
    pub fn schedule_later(&mut self, step: Duration) {
        let base = self.scheduled_for.unwrap_or_else(Local::now);
        let step = chrono::Duration::from_std(step).unwrap_or_else(|_| chrono::Duration::hours(1));
        self.scheduled_for = Some(base + step);
    }

    pub fn clear_schedule(&mut self) {
        self.scheduled_for = None;
    }

    pub fn can_publish(&self) -> bool {
        !self.body.plain_text().trim().is_empty()
            || !self.banner_images.is_empty()
            || !self.body_images.is_empty()
    }

    /// Builds the post and clears the draft.
    pub fn publish(&mut self, viewer: &Viewer) -> Result<Post, ComposerError> {
        if !self.can_publish() {
            return Err(ComposerError::Empty);
        }
        let timestamp = match self.scheduled_for {
            Some(when) => format!("Scheduled for {}", when.format("%d/%m/%Y %H:%M")),
            None => JUST_NOW.to_string(),
        };
        let title = self.title.trim();
        let post = Post {
            id: PostId::generate(),
            author: viewer.user.clone(),
            timestamp,
            location: Some(self.channel.clone()),
            title: (!title.is_empty()).then(|| title.to_string()),
            content: self.body.clone(),
            media: self.primary_media(),
            reactions: Post::default_reactions(),
            total_reactions: 0,
            comments_count: 0,
            comments: CommentTree::new(),
            shares: 0,
            views: 0,
            is_pinned: false,
            is_saved: false,
            comments_disabled: false,
        };
        tracing::info!(post = %post.id, channel = %self.channel, "post published");
        self.reset();
        Ok(post)
    }

    pub fn reset(&mut self) {
        *self = Self::new(&self.default_channel);
    }

    fn primary_media(&self) -> Option<Media> {
        if let Some(url) = self.banner_images.first() {
            return Some(Media::Banner {
                url: url.clone(),
                caption: None,
            });
        }
        match self.body_images.len() {
            0 => {}
            1 => {
                return Some(Media::Image {
                    url: self.body_images[0].clone(),
                    caption: None,
                })
            }
            _ => {
                return Some(Media::Gallery {
                    urls: self.body_images.clone(),
                    caption: None,
                })
            }
        }
        if let Some(video) = self.videos.first() {
            return Some(Media::Video {
                url: video.uri.clone(),
                thumbnail: Some(video.thumbnail.clone()),
                title: None,
            });
        }
        if let Some(link) = self.video_links.first() {
            return Some(Media::Video {
                url: link.url.clone(),
                thumbnail: None,
                title: Some(link.platform.name().to_string()),
            });
        }
        self.files.first().map(|file| Media::File {
            url: file.uri.clone(),
            file_name: Some(file.name.clone()),
            file_size: Some(file.size.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub id: CommentId,
    pub author: String,
}

/// What a submitted comment draft turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSubmission {
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<CommentId>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub text: String,
    attachments: Vec<Attachment>,
    reply_to: Option<ReplyTarget>,
}

impl CommentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn reply_target(&self) -> Option<&ReplyTarget> {
        self.reply_to.as_ref()
    }

    pub fn begin_reply(&mut self, tree: &CommentTree, id: &CommentId) -> Result<(), ComposerError> {
        let node = tree
            .get(id)
            .ok_or_else(|| ComposerError::UnknownReplyTarget(id.clone()))?;
        self.reply_to = Some(ReplyTarget {
            id: id.clone(),
            author: node.comment.author.name.clone(),
        });
        Ok(())
    }

    pub fn cancel_reply(&mut self) {
        self.reply_to = None;
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn remove_attachment(&mut self, id: &str) {
        self.attachments.retain(|attachment| attachment.id != id);
    }

    pub fn placeholder(&self) -> String {
        match &self.reply_to {
            Some(target) => format!("Reply to {}...", target.author),
            None => "Write a comment...".to_string(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty() || !self.attachments.is_empty()
    }

    /// Hands back the submission and clears the draft, or `None` if there is
    /// nothing to send.
    pub fn submit(&mut self) -> Option<CommentSubmission> {
        if !self.can_submit() {
            return None;
        }
        let draft = std::mem::take(self);
        Some(CommentSubmission {
            content: draft.text,
            attachments: draft.attachments,
            reply_to: draft.reply_to.map(|target| target.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::SeedComment;
    use crate::model::{AttachmentKind, Comment, User};
    use std::path::Path;

    fn viewer() -> Viewer {
        Viewer::new(User::new("me", "Sam"))
    }

    fn images(count: usize) -> Vec<String> {
        (0..count).map(|idx| format!("img-{idx}.png")).collect()
    }

    #[test]
    fn eleventh_banner_image_is_refused() {
        let mut composer = PostComposer::default();
        composer.add_banner_images(images(10)).unwrap();
        let err = composer.add_banner_images(images(1)).unwrap_err();
        assert_eq!(
            err,
            ComposerError::LimitExceeded {
                kind: MediaSlot::BannerImages,
                limit: 10
            }
        );
        assert_eq!(composer.banner_images().len(), 10);
    }

    #[test]
    fn video_limit_is_five() {
        let mut composer = PostComposer::default();
        let videos = (0..6)
            .map(|idx| VideoUpload {
                uri: format!("v{idx}.mp4"),
                thumbnail: String::new(),
            })
            .collect();
        assert!(composer.add_videos(videos).is_err());
        assert!(composer.videos().is_empty());
    }

    #[test]
    fn empty_draft_cannot_publish() {
        let mut composer = PostComposer::default();
        composer.body = Document::plain("   ");
        assert!(!composer.can_publish());
        assert_eq!(composer.publish(&viewer()).unwrap_err(), ComposerError::Empty);
    }

    #[test]
    fn image_only_draft_can_publish_as_gallery() {
        let mut composer = PostComposer::new("Design");
        composer.add_body_images(images(3)).unwrap();
        let post = composer.publish(&viewer()).unwrap();
        assert!(matches!(post.media, Some(Media::Gallery { ref urls, .. }) if urls.len() == 3));
        assert_eq!(post.location.as_deref(), Some("Design"));
        assert_eq!(post.total_reactions, post.reaction_sum());
    }

    #[test]
    fn publish_resets_the_draft() {
        let mut composer = PostComposer::default();
        composer.title = "  Hello  ".into();
        composer.body = Document::plain("first post");
        composer.set_channel("Projects");
        let post = composer.publish(&viewer()).unwrap();
        assert_eq!(post.title.as_deref(), Some("Hello"));
        assert_eq!(post.author, viewer().user);
        assert_eq!(post.timestamp, JUST_NOW);
        assert!(composer.title.is_empty());
        assert!(composer.body.is_empty());
        assert_eq!(composer.channel(), DEFAULT_CHANNEL);
    }

    #[test]
    fn schedule_shows_in_timestamp() {
        let mut composer = PostComposer::default();
        composer.body = Document::plain("later");
        composer.schedule_later(Duration::from_secs(3600));
        assert!(composer.scheduled_for().is_some());
        let post = composer.publish(&viewer()).unwrap();
        assert!(post.timestamp.starts_with("Scheduled for "));
    }

    #[test]
    fn platform_detection_uses_host() {
        assert_eq!(
            Platform::detect("https://www.youtube.com/watch?v=abc"),
            Some(Platform::YouTube)
        );
        assert_eq!(Platform::detect("https://youtu.be/abc"), Some(Platform::YouTube));
        assert_eq!(Platform::detect("https://www.loom.com/share/x"), Some(Platform::Loom));
        assert_eq!(Platform::detect("https://example.com/video"), None);
        assert_eq!(Platform::detect("not a url"), None);
    }

    #[test]
    fn blank_video_link_is_refused() {
        let mut composer = PostComposer::default();
        assert_eq!(
            composer.add_video_link(Platform::Vimeo, "  "),
            Err(ComposerError::EmptyVideoUrl)
        );
    }

    fn tree() -> CommentTree {
        CommentTree::from_nested(vec![SeedComment {
            comment: Comment {
                id: CommentId::from("c1"),
                author: User::new("u2", "Morgan"),
                content: "hello".into(),
                attachments: Vec::new(),
                timestamp: "1h".into(),
                likes: 0,
                user_liked: false,
            },
            replies: Vec::new(),
        }])
    }

    #[test]
    fn reply_needs_existing_target() {
        let mut draft = CommentDraft::new();
        assert!(draft.begin_reply(&tree(), &CommentId::from("nope")).is_err());
        assert!(draft.reply_target().is_none());

        draft.begin_reply(&tree(), &CommentId::from("c1")).unwrap();
        assert_eq!(draft.placeholder(), "Reply to Morgan...");
        draft.cancel_reply();
        assert_eq!(draft.placeholder(), "Write a comment...");
    }

    #[test]
    fn submit_takes_the_draft() {
        let mut draft = CommentDraft::new();
        assert!(draft.submit().is_none());

        draft.begin_reply(&tree(), &CommentId::from("c1")).unwrap();
        draft.add_attachment(Attachment::from_path(Path::new("/tmp/brief.pdf")));
        assert!(draft.can_submit());
        let submission = draft.submit().unwrap();
        assert_eq!(submission.reply_to, Some(CommentId::from("c1")));
        assert_eq!(submission.attachments[0].kind, AttachmentKind::Pdf);
        assert!(draft.reply_target().is_none());
        assert!(draft.attachments().is_empty());
    }

    #[test]
    fn attachments_can_be_removed() {
        let mut draft = CommentDraft::new();
        let attachment = Attachment::from_path(Path::new("photo.png"));
        let id = attachment.id.clone();
        draft.add_attachment(attachment);
        draft.remove_attachment(&id);
        assert!(draft.attachments().is_empty());
        assert!(!draft.can_submit());
    }
}
