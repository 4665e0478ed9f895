use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::comments::CommentTree;
use crate::richtext::Document;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(value: S) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(PostId);
string_id!(CommentId);

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Time-based identifier. The sequence suffix keeps ids minted within the same
/// millisecond distinct.
fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{millis}-{seq}")
}

impl CommentId {
    pub fn generate() -> Self {
        Self(generate_id("c"))
    }
}

impl PostId {
    pub fn generate() -> Self {
        Self(generate_id("p"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_admin: bool,
}

impl User {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
            role: None,
            is_admin: false,
        }
    }
}

/// The person using the client. Passed to every operation that authors
/// content or depends on who is looking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user: User,
}

impl Viewer {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn is_author_of(&self, post: &Post) -> bool {
        post.author.id == self.user.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    ThumbsUp,
    Heart,
    Idea,
    Party,
    Fire,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::ThumbsUp,
        ReactionKind::Heart,
        ReactionKind::Idea,
        ReactionKind::Party,
        ReactionKind::Fire,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            ReactionKind::ThumbsUp => "👍",
            ReactionKind::Heart => "❤️",
            ReactionKind::Idea => "💡",
            ReactionKind::Party => "🎉",
            ReactionKind::Fire => "🔥",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub kind: ReactionKind,
    pub count: i64,
    #[serde(default)]
    pub user_reacted: bool,
}

impl Reaction {
    pub fn empty(kind: ReactionKind) -> Self {
        Self {
            kind,
            count: 0,
            user_reacted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Pdf,
}

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "heic", "svg"];

impl AttachmentKind {
    /// Anything that does not look like an image is treated as a document.
    pub fn from_path(path: &Path) -> Self {
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                IMAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if is_image {
            AttachmentKind::Image
        } else {
            AttachmentKind::Pdf
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
}

impl Attachment {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            id: generate_id("a"),
            kind: AttachmentKind::from_path(path),
            url: path.display().to_string(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Media {
    Banner {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Video {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumbnail: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    File {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_size: Option<String>,
    },
    Gallery {
        urls: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl Media {
    pub fn summary(&self) -> String {
        match self {
            Media::Banner { url, .. } => format!("[banner] {url}"),
            Media::Image { url, caption } => match caption {
                Some(caption) => format!("[image] {caption} ({url})"),
                None => format!("[image] {url}"),
            },
            Media::Video { url, title, .. } => match title {
                Some(title) => format!("[video] {title} ({url})"),
                None => format!("[video] {url}"),
            },
            Media::File {
                url,
                file_name,
                file_size,
            } => {
                let name = file_name.as_deref().unwrap_or(url.as_str());
                match file_size {
                    Some(size) => format!("[file] {name} · {size}"),
                    None => format!("[file] {name}"),
                }
            }
            Media::Gallery { urls, .. } => {
                let count = urls.len();
                let suffix = if count == 1 { "image" } else { "images" };
                format!("[gallery] {count} {suffix}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: User,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    pub timestamp: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub user_liked: bool,
}

pub const JUST_NOW: &str = "just now";

impl Comment {
    /// A fresh comment written by the viewer.
    pub fn authored(viewer: &Viewer, content: &str, attachments: Vec<Attachment>) -> Self {
        Self {
            id: CommentId::generate(),
            author: viewer.user.clone(),
            content: content.to_string(),
            attachments,
            timestamp: JUST_NOW.to_string(),
            likes: 0,
            user_liked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: User,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub total_reactions: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub comments: CommentTree,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub comments_disabled: bool,
}

impl Post {
    pub fn reaction(&self, kind: ReactionKind) -> Option<&Reaction> {
        self.reactions.iter().find(|reaction| reaction.kind == kind)
    }

    pub fn is_liked(&self) -> bool {
        self.reaction(ReactionKind::Heart)
            .map(|reaction| reaction.user_reacted)
            .unwrap_or(false)
    }

    pub fn reaction_sum(&self) -> i64 {
        self.reactions.iter().map(|reaction| reaction.count).sum()
    }

    pub fn default_reactions() -> Vec<Reaction> {
        ReactionKind::ALL.iter().copied().map(Reaction::empty).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn attachment_kind_follows_extension() {
        assert_eq!(
            AttachmentKind::from_path(&PathBuf::from("/tmp/photo.JPG")),
            AttachmentKind::Image
        );
        assert_eq!(
            AttachmentKind::from_path(&PathBuf::from("notes.pdf")),
            AttachmentKind::Pdf
        );
        assert_eq!(
            AttachmentKind::from_path(&PathBuf::from("README")),
            AttachmentKind::Pdf
        );
    }

    #[test]
    fn generated_ids_are_distinct() {
        let first = CommentId::generate();
        let second = CommentId::generate();
        assert!(first.as_str().starts_with('c'));
        assert_ne!(first, second);
    }

    #[test]
    fn media_summary_counts_gallery() {
        let media = Media::Gallery {
            urls: vec!["a.png".into(), "b.png".into()],
            caption: None,
        };
        assert_eq!(media.summary(), "[gallery] 2 images");
    }

    #[test]
    fn media_tag_round_trips_through_yaml() {
        let yaml = "type: file\nurl: handbook.pdf\nfile_name: Handbook\nfile_size: 2.4 MB\n";
        let media: Media = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(media.summary(), "[file] Handbook · 2.4 MB");
    }
}
