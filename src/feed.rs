//! The post collection and its state transitions.
//!
//! A [`Feed`] is immutable: every operation returns a new feed in which only
//! the affected post has been replaced. All other posts are shared with the
//! input through `Arc`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::comments::CommentTreeError;
use crate::model::{Attachment, Comment, CommentId, Post, PostId, ReactionKind, Viewer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("post {0} not found")]
    UnknownPost(PostId),
    #[error("comment {comment} not found on post {post}")]
    UnknownComment { post: PostId, comment: CommentId },
    #[error("post {post} has no {kind} reaction")]
    MissingReaction { post: PostId, kind: ReactionKind },
    #[error("comment {comment} already exists on post {post}")]
    DuplicateComment { post: PostId, comment: CommentId },
    #[error("comments are disabled on post {0}")]
    CommentsDisabled(PostId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedFilter {
    #[default]
    All,
    MyPosts,
    Saved,
}

impl FeedFilter {
    pub const ALL: [FeedFilter; 3] = [FeedFilter::All, FeedFilter::MyPosts, FeedFilter::Saved];

    pub fn label(self) -> &'static str {
        match self {
            FeedFilter::All => "Latest activity",
            FeedFilter::MyPosts => "My posts",
            FeedFilter::Saved => "Saved",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FeedFilter::All => FeedFilter::MyPosts,
            FeedFilter::MyPosts => FeedFilter::Saved,
            FeedFilter::Saved => FeedFilter::All,
        }
    }

    fn keeps(self, post: &Post, viewer: &Viewer) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::MyPosts => viewer.is_author_of(post),
            FeedFilter::Saved => post.is_saved,
        }
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedOp {
    ToggleLike(PostId),
    ToggleSave(PostId),
    TogglePin(PostId),
    ToggleCommentsEnabled(PostId),
    ReassignChannel {
        post: PostId,
        channel: String,
    },
    /// `comment` is already fully built, so applying the op is deterministic.
    AddComment {
        post: PostId,
        comment: Comment,
        reply_to: Option<CommentId>,
    },
    ToggleCommentLike {
        post: PostId,
        comment: CommentId,
    },
}

impl FeedOp {
    pub fn post_id(&self) -> &PostId {
        match self {
            FeedOp::ToggleLike(post)
            | FeedOp::ToggleSave(post)
            | FeedOp::TogglePin(post)
            | FeedOp::ToggleCommentsEnabled(post) => post,
            FeedOp::ReassignChannel { post, .. }
            | FeedOp::AddComment { post, .. }
            | FeedOp::ToggleCommentLike { post, .. } => post,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Feed {
    posts: Vec<Arc<Post>>,
}

impl Feed {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: posts.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Posts in insertion order.
    pub fn posts(&self) -> &[Arc<Post>] {
        &self.posts
    }

    pub fn get(&self, id: &PostId) -> Option<&Arc<Post>> {
        self.posts.iter().find(|post| &post.id == id)
    }

    /// Pinned posts first; order inside each group is preserved.
    pub fn sorted(&self) -> Vec<Arc<Post>> {
        let mut posts = self.posts.clone();
        posts.sort_by_key(|post| !post.is_pinned);
        posts
    }

    pub fn view(&self, filter: FeedFilter, viewer: &Viewer) -> Vec<Arc<Post>> {
        let mut posts: Vec<Arc<Post>> = self
            .posts
            .iter()
            .filter(|post| filter.keeps(post, viewer))
            .cloned()
            .collect();
        posts.sort_by_key(|post| !post.is_pinned);
        posts
    }

    /// Puts a freshly published post at the head of the feed.
    pub fn with_post(&self, post: Post) -> Feed {
        let mut posts = Vec::with_capacity(self.posts.len() + 1);
        posts.push(Arc::new(post));
        posts.extend(self.posts.iter().cloned());
        Feed { posts }
    }

    pub fn apply(&self, op: FeedOp) -> Result<Feed, FeedError> {
        let index = self
            .posts
            .iter()
            .position(|post| &post.id == op.post_id())
            .ok_or_else(|| FeedError::UnknownPost(op.post_id().clone()))?;
        let mut post = Post::clone(&self.posts[index]);

        match op {
            FeedOp::ToggleLike(_) => toggle_heart(&mut post)?,
            FeedOp::ToggleSave(_) => post.is_saved = !post.is_saved,
            FeedOp::TogglePin(_) => post.is_pinned = !post.is_pinned,
            FeedOp::ToggleCommentsEnabled(_) => post.comments_disabled = !post.comments_disabled,
            FeedOp::ReassignChannel { channel, .. } => post.location = Some(channel),
            FeedOp::AddComment {
                comment, reply_to, ..
            } => insert_comment(&mut post, comment, reply_to)?,
            FeedOp::ToggleCommentLike { comment, .. } => {
                post.comments
                    .toggle_like(&comment)
                    .map_err(|_| FeedError::UnknownComment {
                        post: post.id.clone(),
                        comment,
                    })?
            }
        }

        let mut posts = self.posts.clone();
        posts[index] = Arc::new(post);
        Ok(Feed { posts })
    }

    pub fn toggle_like(&self, id: &PostId) -> Feed {
        self.apply_or_keep(FeedOp::ToggleLike(id.clone()))
    }

    pub fn toggle_save(&self, id: &PostId) -> Feed {
        self.apply_or_keep(FeedOp::ToggleSave(id.clone()))
    }

    pub fn toggle_pin(&self, id: &PostId) -> Feed {
        self.apply_or_keep(FeedOp::TogglePin(id.clone()))
    }

    pub fn toggle_comments_enabled(&self, id: &PostId) -> Feed {
        self.apply_or_keep(FeedOp::ToggleCommentsEnabled(id.clone()))
    }

    pub fn reassign_channel(&self, id: &PostId, channel: &str) -> Feed {
        self.apply_or_keep(FeedOp::ReassignChannel {
            post: id.clone(),
            channel: channel.to_string(),
        })
    }

    pub fn add_comment(
        &self,
        id: &PostId,
        viewer: &Viewer,
        content: &str,
        attachments: Vec<Attachment>,
        reply_to: Option<&CommentId>,
    ) -> Feed {
        self.apply_or_keep(FeedOp::AddComment {
            post: id.clone(),
            comment: Comment::authored(viewer, content, attachments),
            reply_to: reply_to.cloned(),
        })
    }

    pub fn toggle_comment_like(&self, id: &PostId, comment: &CommentId) -> Feed {
        self.apply_or_keep(FeedOp::ToggleCommentLike {
            post: id.clone(),
            comment: comment.clone(),
        })
    }

    fn apply_or_keep(&self, op: FeedOp) -> Feed {
        match self.apply(op) {
            Ok(feed) => feed,
            Err(err) => {
                tracing::debug!(error = %err, "feed operation ignored");
                self.clone()
            }
        }
    }
}

fn toggle_heart(post: &mut Post) -> Result<(), FeedError> {
    let heart = post
        .reactions
        .iter_mut()
        .find(|reaction| reaction.kind == ReactionKind::Heart)
        .ok_or_else(|| FeedError::MissingReaction {
            post: post.id.clone(),
            kind: ReactionKind::Heart,
        })?;
    let reacted = !heart.user_reacted;
    let delta = if reacted { 1 } else { -1 };
    heart.user_reacted = reacted;
    heart.count += delta;
    post.total_reactions += delta;
    Ok(())
}

fn insert_comment(
    post: &mut Post,
    comment: Comment,
    reply_to: Option<CommentId>,
) -> Result<(), FeedError> {
    if post.comments_disabled {
        return Err(FeedError::CommentsDisabled(post.id.clone()));
    }
    match post.comments.insert(reply_to.as_ref(), comment) {
        Ok(()) => {
            post.comments_count += 1;
            Ok(())
        }
        Err(CommentTreeError::UnknownComment(comment)) => Err(FeedError::UnknownComment {
            post: post.id.clone(),
            comment,
        }),
        Err(CommentTreeError::DuplicateComment(comment)) => Err(FeedError::DuplicateComment {
            post: post.id.clone(),
            comment,
        }),
    }
}
