use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::comments::{CommentTree, SeedComment};
use crate::model::{
    Attachment, AttachmentKind, Comment, CommentId, Media, Post, PostId, Reaction, ReactionKind,
    User,
};
use crate::richtext::Document;

pub const FEED_CHANNELS: [&str; 9] = [
    "Productivity",
    "Announcements",
    "Design",
    "Business",
    "Technology",
    "Product",
    "Content",
    "Resources",
    "Reflections",
];

pub const COMPOSER_CHANNELS: [&str; 5] = [
    "General",
    "Announcements",
    "Discussions",
    "Projects",
    "Resources",
];

pub trait FeedSource: Send + Sync {
    fn load_posts(&self) -> Result<Vec<Post>>;
    fn current_user(&self) -> User;
}

/// On-disk seed: an optional viewer plus the posts with their nested comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedFormat {
    Yaml,
    Json,
}

impl SeedFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(SeedFormat::Yaml),
            Some("json") => Ok(SeedFormat::Json),
            _ => bail!(
                "seed file {} must end in .yaml, .yml or .json",
                path.display()
            ),
        }
    }
}

pub struct FileFeedSource {
    seed: SeedFile,
    fallback_user: User,
}

impl FileFeedSource {
    pub fn open(path: &Path, fallback_user: User) -> Result<Self> {
        let format = SeedFormat::from_path(path)?;
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read seed file {}", path.display()))?;
        let seed: SeedFile = match format {
            SeedFormat::Yaml => serde_yaml::from_str(&raw)
                .with_context(|| format!("parse seed file {}", path.display()))?,
            SeedFormat::Json => serde_json::from_str(&raw)
                .with_context(|| format!("parse seed file {}", path.display()))?,
        };
        tracing::info!(path = %path.display(), posts = seed.posts.len(), "seed file loaded");
        Ok(Self {
            seed,
            fallback_user,
        })
    }
}

impl FeedSource for FileFeedSource {
    fn load_posts(&self) -> Result<Vec<Post>> {
        for post in &self.seed.posts {
            let sum = post.reaction_sum();
            if sum != post.total_reactions {
                tracing::warn!(
                    post = %post.id,
                    total = post.total_reactions,
                    sum,
                    "reaction total does not match per-kind counts"
                );
            }
        }
        Ok(self.seed.posts.clone())
    }

    fn current_user(&self) -> User {
        self.seed
            .viewer
            .clone()
            .unwrap_or_else(|| self.fallback_user.clone())
    }
}

pub struct MockFeedSource {
    viewer: User,
}

impl Default for MockFeedSource {
    fn default() -> Self {
        Self::new(mock_viewer())
    }
}

impl MockFeedSource {
    pub fn new(viewer: User) -> Self {
        Self { viewer }
    }
}

impl FeedSource for MockFeedSource {
    fn load_posts(&self) -> Result<Vec<Post>> {
        Ok(mock_posts(&self.viewer))
    }

    fn current_user(&self) -> User {
        self.viewer.clone()
    }
}

/// Writes the built-in seed as YAML.
pub fn export_seed(path: &Path) -> Result<()> {
    let viewer = mock_viewer();
    let seed = SeedFile {
        posts: mock_posts(&viewer),
        viewer: Some(viewer),
    };
    let yaml = serde_yaml::to_string(&seed).context("serialize seed")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create seed directory {}", parent.display()))?;
    }
    fs::write(path, yaml).with_context(|| format!("write seed file {}", path.display()))?;
    Ok(())
}

pub fn mock_viewer() -> User {
    User {
        role: Some("Community member".to_string()),
        ..User::new("viewer", "Jordan Lee")
    }
}

fn person(id: &str, name: &str, role: &str) -> User {
    User {
        role: Some(role.to_string()),
        ..User::new(id, name)
    }
}

fn reactions(counts: [i64; 5], liked: bool) -> (Vec<Reaction>, i64) {
    let reactions: Vec<Reaction> = ReactionKind::ALL
        .iter()
        .zip(counts)
        .map(|(kind, count)| Reaction {
            kind: *kind,
            count,
            user_reacted: liked && *kind == ReactionKind::Heart,
        })
        .collect();
    let total = counts.iter().sum();
    (reactions, total)
}

fn comment(id: &str, author: &User, content: &str, timestamp: &str, likes: i64) -> Comment {
    Comment {
        id: CommentId::from(id),
        author: author.clone(),
        content: content.to_string(),
        attachments: Vec::new(),
        timestamp: timestamp.to_string(),
        likes,
        user_liked: false,
    }
}

fn thread(comment: Comment, replies: Vec<SeedComment>) -> SeedComment {
    SeedComment { comment, replies }
}

fn mock_posts(viewer: &User) -> Vec<Post> {
    let avery = User {
        is_admin: true,
        ..person("u-avery", "Avery Chen", "Community lead")
    };
    let priya = person("u-priya", "Priya Nair", "Product designer");
    let marcus = person("u-marcus", "Marcus Hill", "Founder");
    let elena = person("u-elena", "Elena Ruiz", "Engineer");

    let welcome_comments = CommentTree::from_nested(vec![
        thread(
            comment("c-101", &priya, "So glad this space exists!", "2h", 12),
            vec![thread(
                comment("c-102", &avery, "Happy to have you here, Priya.", "2h", 4),
                vec![thread(
                    comment("c-103", &priya, "Already found three great threads.", "1h", 1),
                    Vec::new(),
                )],
            )],
        ),
        thread(
            comment("c-104", &marcus, "Is there a schedule for the live sessions?", "1h", 3),
            Vec::new(),
        ),
    ]);
    let welcome_count = welcome_comments.len() as i64;
    let (welcome_reactions, welcome_total) = reactions([14, 22, 3, 9, 1], true);

    let design_comments = CommentTree::from_nested(vec![thread(
        Comment {
            attachments: vec![Attachment {
                id: "att-1".to_string(),
                kind: AttachmentKind::Image,
                url: "https://images.example.com/wireframe.png".to_string(),
                name: "wireframe.png".to_string(),
            }],
            ..comment("c-201", &elena, "Here is the wireframe I mentioned.", "5h", 6)
        },
        vec![thread(
            comment("c-202", viewer, "The spacing on the cards looks much better.", "4h", 2),
            Vec::new(),
        )],
    )]);
    let design_count = design_comments.len() as i64;
    let (design_reactions, design_total) = reactions([5, 11, 7, 0, 2], false);

    let (launch_reactions, launch_total) = reactions([31, 18, 4, 12, 9], false);
    let (notes_reactions, notes_total) = reactions([2, 3, 1, 0, 0], false);
    let (review_reactions, review_total) = reactions([0, 4, 0, 0, 0], false);

    vec![
        Post {
            id: PostId::from("p-1"),
            author: avery.clone(),
            timestamp: "3h".to_string(),
            location: Some("Announcements".to_string()),
            title: Some("Welcome to the community".to_string()),
            content: Document::from_markdown(
                "## Start here\nIntroduce yourself in **Discussions** and read the \
                 [guidelines](https://community.example.com/guidelines) before posting.",
            ),
            media: Some(Media::Banner {
                url: "https://images.example.com/welcome-banner.png".to_string(),
                caption: Some("Welcome aboard".to_string()),
            }),
            reactions: welcome_reactions,
            total_reactions: welcome_total,
            comments_count: welcome_count,
            comments: welcome_comments,
            shares: 8,
            views: 1240,
            is_pinned: true,
            is_saved: false,
            comments_disabled: false,
        },
        Post {
            id: PostId::from("p-2"),
            author: priya,
            timestamp: "6h".to_string(),
            location: Some("Design".to_string()),
            title: Some("Card layout exploration".to_string()),
            content: Document::from_markdown(
                "Three takes on the feed card. I *think* option two reads best, \
                 but ~~option one~~ still has fans.",
            ),
            media: Some(Media::Gallery {
                urls: vec![
                    "https://images.example.com/card-1.png".to_string(),
                    "https://images.example.com/card-2.png".to_string(),
                    "https://images.example.com/card-3.png".to_string(),
                ],
                caption: None,
            }),
            reactions: design_reactions,
            total_reactions: design_total,
            comments_count: design_count,
            comments: design_comments,
            shares: 2,
            views: 430,
            is_pinned: false,
            is_saved: true,
            comments_disabled: false,
        },
        Post {
            id: PostId::from("p-3"),
            author: marcus,
            timestamp: "1d".to_string(),
            location: Some("Business".to_string()),
            title: Some("Launch recap".to_string()),
            content: Document::autolinked(
                "We shipped! Full walkthrough here: https://vimeo.com/123456789.",
            ),
            media: Some(Media::Video {
                url: "https://vimeo.com/123456789".to_string(),
                thumbnail: Some("https://images.example.com/launch-thumb.png".to_string()),
                title: Some("Launch walkthrough".to_string()),
            }),
            reactions: launch_reactions,
            total_reactions: launch_total,
            comments_count: 0,
            comments: CommentTree::new(),
            shares: 15,
            views: 3100,
            is_pinned: false,
            is_saved: false,
            comments_disabled: true,
        },
        Post {
            id: PostId::from("p-4"),
            author: viewer.clone(),
            timestamp: "2d".to_string(),
            location: Some("Productivity".to_string()),
            title: None,
            content: Document::from_markdown(
                "My weekly planning template, use `Ctrl+D` to duplicate a row.",
            ),
            media: Some(Media::File {
                url: "https://files.example.com/weekly-plan.pdf".to_string(),
                file_name: Some("weekly-plan.pdf".to_string()),
                file_size: Some("240 KB".to_string()),
            }),
            reactions: notes_reactions,
            total_reactions: notes_total,
            comments_count: 0,
            comments: CommentTree::new(),
            shares: 1,
            views: 96,
            is_pinned: false,
            is_saved: false,
            comments_disabled: false,
        },
        Post {
            id: PostId::from("p-5"),
            author: elena,
            timestamp: "3d".to_string(),
            location: Some("Reflections".to_string()),
            title: Some("What I learned from a month of code review".to_string()),
            content: Document::plain(
                "Small pull requests get better reviews.\nAsk for the review you want.",
            ),
            media: Some(Media::Image {
                url: "https://images.example.com/review.png".to_string(),
                caption: Some("Review turnaround by PR size".to_string()),
            }),
            reactions: review_reactions,
            total_reactions: review_total,
            comments_count: 0,
            comments: CommentTree::new(),
            shares: 0,
            views: 210,
            is_pinned: false,
            is_saved: false,
            comments_disabled: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn mock_totals_match_reactions() {
        let posts = MockFeedSource::default().load_posts().unwrap();
        assert_eq!(posts.len(), 5);
        for post in &posts {
            assert_eq!(post.total_reactions, post.reaction_sum(), "{}", post.id);
            assert_eq!(post.comments_count, post.comments.len() as i64, "{}", post.id);
        }
        assert!(posts.iter().any(|post| post.is_pinned));
    }

    #[test]
    fn exported_seed_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.yaml");
        export_seed(&path).unwrap();

        let source = FileFeedSource::open(&path, User::new("x", "Fallback")).unwrap();
        let posts = source.load_posts().unwrap();
        assert_eq!(posts, MockFeedSource::default().load_posts().unwrap());
        assert_eq!(source.current_user(), mock_viewer());
    }

    #[test]
    fn json_seed_with_plain_content() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"posts": [{{
                "id": "p-9",
                "author": {{"id": "u1", "name": "Kim"}},
                "timestamp": "1h",
                "content": "hello there",
                "comments": [{{
                    "id": "c1",
                    "author": {{"id": "u2", "name": "Lou"}},
                    "content": "hi",
                    "timestamp": "1h",
                    "replies": [{{
                        "id": "c2",
                        "author": {{"id": "u1", "name": "Kim"}},
                        "content": "hey",
                        "timestamp": "1h"
                    }}]
                }}]
            }}]}}"#
        )
        .unwrap();

        let source = FileFeedSource::open(file.path(), User::new("me", "Me")).unwrap();
        let posts = source.load_posts().unwrap();
        assert_eq!(posts[0].content.plain_text(), "hello there");
        assert_eq!(posts[0].comments.len(), 2);
        assert_eq!(
            posts[0].comments.children(&CommentId::from("c1")),
            &[CommentId::from("c2")]
        );
        assert_eq!(source.current_user().name, "Me");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let err = FileFeedSource::open(file.path(), User::new("me", "Me"))
            .err()
            .unwrap();
        assert!(err.to_string().contains(".yaml"));
    }
}
