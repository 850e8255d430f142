//! Dynamic bounding-volume tree.
//!
//! Binary tree of AABBs stored in a flat node arena with a free list. Leaves
//! hold user data; branches hold the union of their children. Insertion walks
//! down choosing the child whose box grows the least (perimeter heuristic)
//! and refits ancestors on the way back up, rotating any node whose subtrees
//! differ in height by more than one. Removal splices the sibling into the
//! grandparent. Proxy ids stay valid until their leaf is removed.

use crate::math::{Aabb, Bounds};

/// Handle to a leaf in a [`DynamicAabbTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProxyId(u32);

impl ProxyId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
enum NodeKind<T> {
    Leaf(T),
    Branch { left: usize, right: usize },
    Free { next: Option<usize> },
}

#[derive(Debug)]
struct Node<T> {
    aabb: Aabb,
    parent: Option<usize>,
    /// Leaves are 0
    height: u32,
    kind: NodeKind<T>,
}

/// Dynamic AABB tree for overlap queries
#[derive(Debug)]
pub struct DynamicAabbTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<usize>,
    free: Option<usize>,
    leaf_count: usize,
}

impl<T> Default for DynamicAabbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DynamicAabbTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            free: None,
            leaf_count: 0,
        }
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Remove every proxy. Outstanding ids become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.free = None;
        self.leaf_count = 0;
    }

    /// Data stored at a proxy, if it is a live leaf
    pub fn get(&self, id: ProxyId) -> Option<&T> {
        match self.nodes.get(id.index()).map(|n| &n.kind) {
            Some(NodeKind::Leaf(data)) => Some(data),
            _ => None,
        }
    }

    /// Box stored at a proxy, if it is a live leaf
    pub fn aabb(&self, id: ProxyId) -> Option<Aabb> {
        self.get(id)?;
        Some(self.nodes[id.index()].aabb)
    }

    /// Height of the tree, 0 for a single leaf or an empty tree
    pub fn height(&self) -> u32 {
        self.root.map_or(0, |r| self.nodes[r].height)
    }

    /// Box enclosing everything in the tree
    pub fn root_aabb(&self) -> Option<Aabb> {
        self.root.map(|r| self.nodes[r].aabb)
    }

    /// Insert a leaf and return its proxy id
    pub fn insert(&mut self, aabb: Aabb, data: T) -> ProxyId {
        let leaf = self.allocate(Node { aabb, parent: None, height: 0, kind: NodeKind::Leaf(data) });
        self.leaf_count += 1;

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return ProxyId(leaf as u32);
        };

        let sibling = self.find_sibling(root, &aabb);
        let old_parent = self.nodes[sibling].parent;
        let branch_aabb = self.nodes[sibling].aabb.merged(&aabb);
        let branch = self.allocate(Node {
            aabb: branch_aabb,
            parent: old_parent,
            height: self.nodes[sibling].height + 1,
            kind: NodeKind::Branch { left: sibling, right: leaf },
        });
        self.nodes[sibling].parent = Some(branch);
        self.nodes[leaf].parent = Some(branch);

        match old_parent {
            Some(p) => self.replace_child(p, sibling, branch),
            None => self.root = Some(branch),
        }
        self.refit_from(Some(branch));

        ProxyId(leaf as u32)
    }

    /// Remove a leaf, returning its data. Unknown ids return `None`.
    pub fn remove(&mut self, id: ProxyId) -> Option<T> {
        let leaf = id.index();
        if !matches!(self.nodes.get(leaf).map(|n| &n.kind), Some(NodeKind::Leaf(_))) {
            return None;
        }

        match self.nodes[leaf].parent {
            None => self.root = None,
            Some(parent) => {
                let sibling = match self.nodes[parent].kind {
                    NodeKind::Branch { left, right } => if left == leaf { right } else { left },
                    _ => unreachable!("leaf parent is always a branch"),
                };
                let grand = self.nodes[parent].parent;
                self.nodes[sibling].parent = grand;
                match grand {
                    Some(g) => {
                        self.replace_child(g, parent, sibling);
                        self.refit_from(Some(g));
                    }
                    None => self.root = Some(sibling),
                }
                self.release(parent);
            }
        }

        self.leaf_count -= 1;
        match self.release(leaf) {
            NodeKind::Leaf(data) => Some(data),
            _ => None,
        }
    }

    /// Visit every leaf whose box overlaps `bounds` (touching counts).
    pub fn for_each_overlapping<F>(&self, bounds: &Bounds, mut visit: F)
    where
        F: FnMut(ProxyId, &T),
    {
        let Some(root) = self.root else { return };
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !bounds.intersects_aabb(&node.aabb) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(data) => visit(ProxyId(index as u32), data),
                NodeKind::Branch { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
                NodeKind::Free { .. } => {}
            }
        }
    }

    /// Collect the data of every overlapping leaf into `out`.
    ///
    /// When `clear` is set the buffer is emptied first, otherwise results are
    /// appended.
    pub fn query(&self, bounds: &Bounds, out: &mut Vec<T>, clear: bool)
    where
        T: Clone,
    {
        if clear {
            out.clear();
        }
        self.for_each_overlapping(bounds, |_, data| out.push(data.clone()));
    }

    /// Iterate all leaves
    pub fn iter(&self) -> impl Iterator<Item = (ProxyId, &T)> {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match &n.kind {
            NodeKind::Leaf(data) => Some((ProxyId(i as u32), data)),
            _ => None,
        })
    }

    fn allocate(&mut self, node: Node<T>) -> usize {
        match self.free {
            Some(index) => {
                self.free = match self.nodes[index].kind {
                    NodeKind::Free { next } => next,
                    _ => None,
                };
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) -> NodeKind<T> {
        let node = &mut self.nodes[index];
        node.parent = None;
        let kind = std::mem::replace(&mut node.kind, NodeKind::Free { next: self.free });
        self.free = Some(index);
        kind
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if let NodeKind::Branch { left, right } = &mut self.nodes[parent].kind {
            if *left == old {
                *left = new;
            } else {
                *right = new;
            }
        }
    }

    fn find_sibling(&self, root: usize, aabb: &Aabb) -> usize {
        let mut index = root;
        loop {
            let node = &self.nodes[index];
            let NodeKind::Branch { left, right } = node.kind else {
                return index;
            };

            let combined = node.aabb.merged(aabb).perimeter();
            let cost_here = 2.0 * combined;
            let inherited = 2.0 * (combined - node.aabb.perimeter());
            let child_cost = |child: usize| {
                let c = &self.nodes[child];
                let grown = c.aabb.merged(aabb).perimeter();
                match c.kind {
                    NodeKind::Leaf(_) => grown + inherited,
                    _ => grown - c.aabb.perimeter() + inherited,
                }
            };
            let cost_left = child_cost(left);
            let cost_right = child_cost(right);

            if cost_here < cost_left && cost_here < cost_right {
                return index;
            }
            index = if cost_left <= cost_right { left } else { right };
        }
    }

    /// Walk to the root, rebalancing and recomputing boxes and heights
    fn refit_from(&mut self, start: Option<usize>) {
        let mut current = start;
        while let Some(index) = current {
            let index = self.balance(index);
            self.update_branch(index);
            current = self.nodes[index].parent;
        }
    }

    fn update_branch(&mut self, index: usize) {
        if let NodeKind::Branch { left, right } = self.nodes[index].kind {
            let (l, r) = (&self.nodes[left], &self.nodes[right]);
            let aabb = l.aabb.merged(&r.aabb);
            let height = 1 + l.height.max(r.height);
            self.nodes[index].aabb = aabb;
            self.nodes[index].height = height;
        }
    }

    /// Rotate the taller child of `a` above it when the subtrees are
    /// unbalanced. Returns the node now occupying `a`'s position.
    fn balance(&mut self, a: usize) -> usize {
        let NodeKind::Branch { left, right } = self.nodes[a].kind else {
            return a;
        };
        let diff = self.nodes[right].height as i64 - self.nodes[left].height as i64;
        if diff > 1 {
            self.rotate_up(a, right)
        } else if diff < -1 {
            self.rotate_up(a, left)
        } else {
            a
        }
    }

    fn rotate_up(&mut self, a: usize, up: usize) -> usize {
        let NodeKind::Branch { left: f, right: g } = self.nodes[up].kind else {
            return a;
        };
        let (taller, shorter) = if self.nodes[f].height > self.nodes[g].height { (f, g) } else { (g, f) };

        let grand = self.nodes[a].parent;
        self.nodes[up].parent = grand;
        match grand {
            Some(p) => self.replace_child(p, a, up),
            None => self.root = Some(up),
        }

        self.nodes[a].parent = Some(up);
        self.nodes[up].kind = NodeKind::Branch { left: a, right: taller };
        self.replace_child(a, up, shorter);
        self.nodes[shorter].parent = Some(a);

        self.update_branch(a);
        self.update_branch(up);
        up
    }
}
