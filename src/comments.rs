//! Arena-backed comment tree.
//!
//! Comments are stored in a flat table keyed by id; each node keeps its parent
//! and the ordered ids of its replies, and the top-level order lives in a
//! separate list. Looking up a reply target is a single table lookup.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Comment, CommentId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentTreeError {
    #[error("comment {0} not found")]
    UnknownComment(CommentId),
    #[error("comment {0} already exists")]
    DuplicateComment(CommentId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub comment: Comment,
    pub parent: Option<CommentId>,
    pub children: Vec<CommentId>,
}

/// Nested shape used by seed files: a comment with its replies inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedComment {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<SeedComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SeedComment>", into = "Vec<SeedComment>")]
pub struct CommentTree {
    nodes: HashMap<CommentId, CommentNode>,
    roots: Vec<CommentId>,
}

/// One row of a depth-first walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'a> {
    pub node: &'a CommentNode,
    pub depth: usize,
}

impl CommentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &CommentId) -> Option<&CommentNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> &[CommentId] {
        &self.roots
    }

    pub fn children(&self, id: &CommentId) -> &[CommentId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Appends `comment` to the top level, or to the replies of `parent`.
    pub fn insert(
        &mut self,
        parent: Option<&CommentId>,
        comment: Comment,
    ) -> Result<(), CommentTreeError> {
        if self.nodes.contains_key(&comment.id) {
            return Err(CommentTreeError::DuplicateComment(comment.id));
        }
        let id = comment.id.clone();
        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or_else(|| CommentTreeError::UnknownComment(parent_id.clone()))?;
                parent_node.children.push(id.clone());
            }
            None => self.roots.push(id.clone()),
        }
        self.nodes.insert(
            id,
            CommentNode {
                comment,
                parent: parent.cloned(),
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Flips the viewer's like on one comment and moves its count with it.
    pub fn toggle_like(&mut self, id: &CommentId) -> Result<(), CommentTreeError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| CommentTreeError::UnknownComment(id.clone()))?;
        let liked = !node.comment.user_liked;
        node.comment.user_liked = liked;
        node.comment.likes += if liked { 1 } else { -1 };
        Ok(())
    }

    pub fn descendant_count(&self, id: &CommentId) -> usize {
        let mut total = 0;
        let mut stack: Vec<&CommentId> = self.children(id).iter().collect();
        while let Some(next) = stack.pop() {
            total += 1;
            stack.extend(self.children(next).iter());
        }
        total
    }

    /// Pre-order walk. Replies of ids in `collapsed` are skipped.
    pub fn walk(&self, collapsed: &HashSet<CommentId>) -> Vec<WalkEntry<'_>> {
        let mut entries = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(&CommentId, usize)> =
            self.roots.iter().rev().map(|id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let node = match self.nodes.get(id) {
                Some(node) => node,
                None => continue,
            };
            entries.push(WalkEntry { node, depth });
            if collapsed.contains(id) {
                continue;
            }
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        entries
    }

    pub fn from_nested(seed: Vec<SeedComment>) -> Self {
        let mut tree = Self::new();
        let mut stack: Vec<(Option<CommentId>, SeedComment)> =
            seed.into_iter().rev().map(|comment| (None, comment)).collect();
        while let Some((parent, seed)) = stack.pop() {
            let SeedComment { comment, replies } = seed;
            let id = comment.id.clone();
            if let Err(err) = tree.insert(parent.as_ref(), comment) {
                let dropped_replies: usize = replies.iter().map(SeedComment::size).sum();
                tracing::warn!(
                    error = %err,
                    dropped_replies,
                    "skipping seed comment together with its replies"
                );
                continue;
            }
            for reply in replies.into_iter().rev() {
                stack.push((Some(id.clone()), reply));
            }
        }
        tree
    }

    pub fn to_nested(&self) -> Vec<SeedComment> {
        self.roots
            .iter()
            .filter_map(|id| self.nested_from(id))
            .collect()
    }

    fn nested_from(&self, id: &CommentId) -> Option<SeedComment> {
        let node = self.nodes.get(id)?;
        Some(SeedComment {
            comment: node.comment.clone(),
            replies: node
                .children
                .iter()
                .filter_map(|child| self.nested_from(child))
                .collect(),
        })
    }
}

impl SeedComment {
    /// This comment plus every reply below it.
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(SeedComment::size).sum::<usize>()
    }
}

impl From<Vec<SeedComment>> for CommentTree {
    fn from(seed: Vec<SeedComment>) -> Self {
        CommentTree::from_nested(seed)
    }
}

impl From<CommentTree> for Vec<SeedComment> {
    fn from(tree: CommentTree) -> Self {
        tree.to_nested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;

    fn comment(id: &str, content: &str) -> Comment {
        Comment {
            id: CommentId::from(id),
            author: User::new("u1", "Riley"),
            content: content.to_string(),
            attachments: Vec::new(),
            timestamp: "1h".to_string(),
            likes: 2,
            user_liked: false,
        }
    }

    fn seed(id: &str, replies: Vec<SeedComment>) -> SeedComment {
        SeedComment {
            comment: comment(id, id),
            replies,
        }
    }

    fn sample() -> CommentTree {
        CommentTree::from_nested(vec![
            seed("a", vec![seed("a1", vec![seed("a1x", vec![])]), seed("a2", vec![])]),
            seed("b", vec![]),
        ])
    }

    fn walk_ids(tree: &CommentTree, collapsed: &HashSet<CommentId>) -> Vec<(String, usize)> {
        tree.walk(collapsed)
            .into_iter()
            .map(|entry| (entry.node.comment.id.to_string(), entry.depth))
            .collect()
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let tree = sample();
        assert_eq!(
            walk_ids(&tree, &HashSet::new()),
            vec![
                ("a".to_string(), 0),
                ("a1".to_string(), 1),
                ("a1x".to_string(), 2),
                ("a2".to_string(), 1),
                ("b".to_string(), 0),
            ]
        );
    }

    #[test]
    fn walk_skips_collapsed_replies() {
        let tree = sample();
        let collapsed: HashSet<CommentId> = [CommentId::from("a")].into_iter().collect();
        assert_eq!(
            walk_ids(&tree, &collapsed),
            vec![("a".to_string(), 0), ("b".to_string(), 0)]
        );
    }

    #[test]
    fn insert_reply_appends_to_parent() {
        let mut tree = sample();
        tree.insert(Some(&CommentId::from("a1x")), comment("new", "yo"))
            .unwrap();
        assert_eq!(tree.children(&CommentId::from("a1x")), &[CommentId::from("new")]);
        assert_eq!(
            tree.get(&CommentId::from("new")).unwrap().parent,
            Some(CommentId::from("a1x"))
        );
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn insert_under_unknown_parent_fails() {
        let mut tree = sample();
        let err = tree
            .insert(Some(&CommentId::from("missing")), comment("new", "yo"))
            .unwrap_err();
        assert_eq!(err, CommentTreeError::UnknownComment(CommentId::from("missing")));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut tree = sample();
        let err = tree.insert(None, comment("b", "again")).unwrap_err();
        assert_eq!(err, CommentTreeError::DuplicateComment(CommentId::from("b")));
    }

    #[test]
    fn duplicate_seed_drops_its_whole_subtree() {
        let dup = seed("b", vec![seed("b1", vec![seed("b1x", vec![])])]);
        assert_eq!(dup.size(), 3);
        let tree = CommentTree::from_nested(vec![
            seed("a", vec![seed("a1", vec![])]),
            seed("b", vec![]),
            dup,
        ]);
        assert_eq!(tree.len(), 3);
        assert!(!tree.contains(&CommentId::from("b1")));
        assert!(!tree.contains(&CommentId::from("b1x")));
        assert_eq!(tree.roots().len(), 2);
        assert!(tree.children(&CommentId::from("b")).is_empty());
    }

    #[test]
    fn toggle_like_moves_count() {
        let mut tree = sample();
        let id = CommentId::from("a2");
        tree.toggle_like(&id).unwrap();
        let node = tree.get(&id).unwrap();
        assert!(node.comment.user_liked);
        assert_eq!(node.comment.likes, 3);
        tree.toggle_like(&id).unwrap();
        let node = tree.get(&id).unwrap();
        assert!(!node.comment.user_liked);
        assert_eq!(node.comment.likes, 2);
    }

    #[test]
    fn descendants_are_counted_across_levels() {
        let tree = sample();
        assert_eq!(tree.descendant_count(&CommentId::from("a")), 3);
        assert_eq!(tree.descendant_count(&CommentId::from("b")), 0);
    }

    #[test]
    fn nested_shape_survives_yaml() {
        let tree = sample();
        let yaml = serde_yaml::to_string(&tree).unwrap();
        let parsed: CommentTree = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, tree);
    }
}
