// =====================================================================
// File: render.rs
//
// Description:
//   Turns the tree into something a person can look at.
//
//   - `TreeView` / `render_tree`: indented text drawing with the current
//     highlight applied.
//   - `to_json`: the tree snapshot as `{ id, keys, children, isLeaf }`.
//
//   Text layout:
//
//     * [10]          <- "* " marks the highlighted node
//     ├── [5]
//     └=> [<20>]      <- "=>" is the followed edge, <k> the highlighted key
// =====================================================================
use std::fmt;

use crate::btree::Node;
use crate::trace::Highlight;

/// Display adapter drawing a subtree with a highlight applied.
pub struct TreeView<'a> {
    root: &'a Node,
    highlight: Highlight,
}

impl<'a> TreeView<'a> {
    pub fn new(root: &'a Node, highlight: Highlight) -> Self {
        Self { root, highlight }
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &Node,
        prefix: &str,
    ) -> fmt::Result {
        if self.highlight.node(node) {
            f.write_str("* ")?;
        }
        f.write_str("[")?;
        for (i, key) in node.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if self.highlight.key(node, i) {
                write!(f, "<{key}>")?;
            } else {
                write!(f, "{key}")?;
            }
        }
        writeln!(f, "]")?;

        let last = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().enumerate() {
            let (branch, indent) = if i == last { ("└", "    ") } else { ("├", "│   ") };
            let edge = if self.highlight.child(node, i) { "=> " } else { "── " };
            write!(f, "{prefix}{branch}{edge}")?;
            self.write_node(f, child, &format!("{prefix}{indent}"))?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.root, "")
    }
}

/// Draw the tree rooted at `root` as indented text.
pub fn render_tree(root: &Node, highlight: Highlight) -> String {
    TreeView::new(root, highlight).to_string()
}

/// Serialize the tree rooted at `root` as pretty-printed JSON.
pub fn to_json(root: &Node) -> serde_json::Result<String> {
    serde_json::to_string_pretty(root)
}
