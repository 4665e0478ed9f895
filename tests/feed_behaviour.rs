use std::sync::Arc;

use feed_tui::composer::{ComposerError, MediaSlot, PostComposer, MAX_VIDEOS};
use feed_tui::composer::VideoUpload;
use feed_tui::data::{mock_viewer, FeedSource, MockFeedSource};
use feed_tui::feed::{Feed, FeedError, FeedFilter, FeedOp};
use feed_tui::model::{PostId, Viewer};
use feed_tui::richtext::{Document, Format};

fn sample() -> (Feed, Viewer) {
    let source = MockFeedSource::default();
    let feed = Feed::new(source.load_posts().unwrap());
    (feed, Viewer::new(source.current_user()))
}

#[test]
fn pinned_posts_lead_every_view() {
    let (feed, viewer) = sample();
    for filter in FeedFilter::ALL {
        let view = feed.view(filter, &viewer);
        let first_unpinned = view.iter().position(|post| !post.is_pinned).unwrap_or(view.len());
        assert!(view[first_unpinned..].iter().all(|post| !post.is_pinned));
    }
}

#[test]
fn liking_twice_restores_the_post() {
    let (feed, _) = sample();
    let id = feed.posts()[1].id.clone();
    let once = feed.apply(FeedOp::ToggleLike(id.clone())).unwrap();
    let twice = once.apply(FeedOp::ToggleLike(id.clone())).unwrap();
    assert_eq!(**twice.get(&id).unwrap(), **feed.get(&id).unwrap());
    let changed = once.get(&id).unwrap();
    assert_eq!(changed.total_reactions, changed.reaction_sum());
}

#[test]
fn untouched_posts_are_shared() {
    let (feed, _) = sample();
    let target = feed.posts()[0].id.clone();
    let next = feed.apply(FeedOp::ToggleSave(target.clone())).unwrap();
    for (before, after) in feed.posts().iter().zip(next.posts()) {
        if before.id == target {
            assert!(!Arc::ptr_eq(before, after));
        } else {
            assert!(Arc::ptr_eq(before, after));
        }
    }
}

#[test]
fn unknown_post_is_reported() {
    let (feed, _) = sample();
    let err = feed
        .apply(FeedOp::TogglePin(PostId::new("missing")))
        .unwrap_err();
    assert_eq!(err, FeedError::UnknownPost(PostId::new("missing")));
}

#[test]
fn my_posts_only_holds_viewer_posts() {
    let (feed, viewer) = sample();
    let mine = feed.view(FeedFilter::MyPosts, &viewer);
    assert!(!mine.is_empty());
    assert!(mine.iter().all(|post| post.author.id == mock_viewer().id));
}

#[test]
fn bold_toggles_back_to_plain() {
    let mut doc = Document::plain("hello world");
    doc.apply_format(0, 5, Format::Bold);
    assert_eq!(doc.segments().len(), 2);
    doc.apply_format(0, 5, Format::Bold);
    assert_eq!(doc, Document::plain("hello world"));
}

#[test]
fn link_over_selection_keeps_text() {
    let mut doc = Document::plain("read the docs");
    doc.insert_link(9, 13, "https://example.com", None).unwrap();
    assert_eq!(doc.plain_text(), "read the docs");
    let last = doc.segments().last().unwrap();
    assert_eq!(last.text, "docs");
    assert_eq!(last.style.link.as_deref(), Some("https://example.com"));
}

#[test]
fn composer_refuses_batches_over_the_limit() {
    let mut composer = PostComposer::new("General");
    let batch: Vec<VideoUpload> = (0..=MAX_VIDEOS)
        .map(|idx| VideoUpload {
            uri: format!("clip-{idx}.mp4"),
            thumbnail: String::new(),
        })
        .collect();
    let err = composer.add_videos(batch).unwrap_err();
    assert_eq!(
        err,
        ComposerError::LimitExceeded {
            kind: MediaSlot::Videos,
            limit: MAX_VIDEOS,
        }
    );
    assert!(composer.videos().is_empty());
}

#[test]
fn published_post_joins_the_feed() {
    let (feed, viewer) = sample();
    let mut composer = PostComposer::new("General");
    composer.body = Document::plain("Shipping the beta today");
    let post = composer.publish(&viewer).unwrap();
    let next = feed.with_post(post);
    assert_eq!(next.len(), feed.len() + 1);
    let mine = next.view(FeedFilter::MyPosts, &viewer);
    assert!(mine
        .iter()
        .any(|post| post.content.plain_text() == "Shipping the beta today"));
}
