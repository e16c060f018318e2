use crate::diagram::{Diagram, HalfEdgeKey, SiteKey};
use crate::event::EventId;
use crate::geometry::Point;
use crate::metric::Metric;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct ArcKey;
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Color {
    Red,
    Black,
}

/// A beachline arc.
///
/// Carries the owning site, the two half edges being traced out by the
/// arc's breakpoints, the pending circle event that would squeeze the arc
/// out, and the node's position in the tree plus prev/next threading.
struct ArcNode {
    site: SiteKey,
    left_half_edge: Option<HalfEdgeKey>,
    right_half_edge: Option<HalfEdgeKey>,
    event: Option<EventId>,

    parent: Option<ArcKey>,
    left: Option<ArcKey>,
    right: Option<ArcKey>,
    prev: Option<ArcKey>,
    next: Option<ArcKey>,
    color: Color,
}

impl ArcNode {
    fn new(site: SiteKey) -> Self {
        ArcNode {
            site,
            left_half_edge: None,
            right_half_edge: None,
            event: None,
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
            color: Color::Red,
        }
    }
}

/// The beachline: the ordered sequence of arcs forming the lower envelope
/// of the parabolas focused at the processed sites.
///
/// Stored as a red-black tree over arena-allocated nodes, threaded with
/// prev/next pointers so neighbour access is O(1). The tree carries no
/// keys: arcs are ordered by their breakpoint spans, which move with the
/// sweep, so ordered positions are only ever computed on the fly during
/// `arc_above` and all structural updates are splices relative to an
/// existing node.
pub struct Beachline {
    arcs: SlotMap<ArcKey, ArcNode>,
    root: Option<ArcKey>,
}

impl Beachline {
    pub fn new() -> Self {
        Beachline {
            arcs: SlotMap::with_key(),
            root: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Creates the initial arc. Must only be called on an empty beachline.
    pub fn set_root(&mut self, site: SiteKey) -> ArcKey {
        let node = self.arcs.insert(ArcNode::new(site));
        self.arcs[node].color = Color::Black;
        self.root = Some(node);
        node
    }

    pub fn leftmost(&self) -> Option<ArcKey> {
        self.root.map(|root| self.minimum(root))
    }

    pub fn prev(&self, arc: ArcKey) -> Option<ArcKey> {
        self.arcs[arc].prev
    }

    pub fn next(&self, arc: ArcKey) -> Option<ArcKey> {
        self.arcs[arc].next
    }

    pub fn get_site(&self, arc: ArcKey) -> SiteKey {
        self.arcs[arc].site
    }

    pub fn get_left_half_edge(&self, arc: ArcKey) -> Option<HalfEdgeKey> {
        self.arcs[arc].left_half_edge
    }

    pub fn set_left_half_edge(&mut self, arc: ArcKey, half_edge: Option<HalfEdgeKey>) {
        self.arcs[arc].left_half_edge = half_edge;
    }

    pub fn get_right_half_edge(&self, arc: ArcKey) -> Option<HalfEdgeKey> {
        self.arcs[arc].right_half_edge
    }

    pub fn set_right_half_edge(&mut self, arc: ArcKey, half_edge: Option<HalfEdgeKey>) {
        self.arcs[arc].right_half_edge = half_edge;
    }

    pub fn get_event(&self, arc: ArcKey) -> Option<EventId> {
        self.arcs[arc].event
    }

    pub fn set_event(&mut self, arc: ArcKey, event: Option<EventId>) {
        self.arcs[arc].event = event;
    }

    /// Locates the arc vertically above `point` with the sweepline at
    /// `sweep_y`.
    ///
    /// Descends from the root comparing `point.x` against the breakpoints
    /// the node shares with its in-order neighbours, computed on the fly
    /// through the metric. A breakpoint only counts as passed when it is
    /// strictly left of `point.x`, so each arc effectively owns the
    /// half-open span `(breakpoint_left, breakpoint_right]`; with several
    /// breakpoints coinciding (cocircular sites) this resolves the tie to
    /// the leftmost containing arc.
    pub fn arc_above(
        &self,
        point: Point,
        sweep_y: f64,
        diagram: &Diagram,
        metric: &dyn Metric,
    ) -> ArcKey {
        let mut node = self.root.unwrap();
        loop {
            let breakpoint_left = match self.arcs[node].prev {
                Some(prev) => metric.compute_breakpoint(
                    diagram.get_site_point(self.arcs[prev].site),
                    diagram.get_site_point(self.arcs[node].site),
                    sweep_y,
                ),
                None => f64::NEG_INFINITY,
            };
            let breakpoint_right = match self.arcs[node].next {
                Some(next) => metric.compute_breakpoint(
                    diagram.get_site_point(self.arcs[node].site),
                    diagram.get_site_point(self.arcs[next].site),
                    sweep_y,
                ),
                None => f64::INFINITY,
            };

            if point.x <= breakpoint_left {
                node = self.arcs[node].left.unwrap();
            } else if point.x > breakpoint_right {
                node = self.arcs[node].right.unwrap();
            } else {
                return node;
            }
        }
    }

    /// Swaps the arc's payload for a fresh one owning `site`, preserving
    /// the node's tree position and neighbour threading.
    pub fn replace(&mut self, arc: ArcKey, site: SiteKey) {
        let node = &mut self.arcs[arc];
        node.site = site;
        node.left_half_edge = None;
        node.right_half_edge = None;
        node.event = None;
    }

    /// Splits `arc` in three around a new site.
    ///
    /// The middle arc owns `site`; the outer arcs inherit the split arc's
    /// site, and its left and right half edges pass to the left and right
    /// fragment respectively. Returns `(left, middle, right)`.
    pub fn break_arc(&mut self, arc: ArcKey, site: SiteKey) -> (ArcKey, ArcKey, ArcKey) {
        let old_site = self.arcs[arc].site;
        let old_left_half_edge = self.arcs[arc].left_half_edge;
        let old_right_half_edge = self.arcs[arc].right_half_edge;

        self.replace(arc, site);

        let left = self.insert_before(arc, old_site);
        self.arcs[left].left_half_edge = old_left_half_edge;

        let right = self.insert_after(arc, old_site);
        self.arcs[right].right_half_edge = old_right_half_edge;

        (left, arc, right)
    }

    /// Splices a new arc for `site` immediately before `pivot`.
    pub fn insert_before(&mut self, pivot: ArcKey, site: SiteKey) -> ArcKey {
        let node = self.arcs.insert(ArcNode::new(site));
        if self.arcs[pivot].left.is_none() {
            self.arcs[pivot].left = Some(node);
            self.arcs[node].parent = Some(pivot);
        } else {
            let pred = self.maximum(self.arcs[pivot].left.unwrap());
            self.arcs[pred].right = Some(node);
            self.arcs[node].parent = Some(pred);
        }

        let prev = self.arcs[pivot].prev;
        self.arcs[node].prev = prev;
        self.arcs[node].next = Some(pivot);
        if let Some(prev) = prev {
            self.arcs[prev].next = Some(node);
        }
        self.arcs[pivot].prev = Some(node);

        self.insert_fixup(node);
        node
    }

    /// Splices a new arc for `site` immediately after `pivot`.
    pub fn insert_after(&mut self, pivot: ArcKey, site: SiteKey) -> ArcKey {
        let node = self.arcs.insert(ArcNode::new(site));
        if self.arcs[pivot].right.is_none() {
            self.arcs[pivot].right = Some(node);
            self.arcs[node].parent = Some(pivot);
        } else {
            let succ = self.minimum(self.arcs[pivot].right.unwrap());
            self.arcs[succ].left = Some(node);
            self.arcs[node].parent = Some(succ);
        }

        let next = self.arcs[pivot].next;
        self.arcs[node].next = next;
        self.arcs[node].prev = Some(pivot);
        if let Some(next) = next {
            self.arcs[next].prev = Some(node);
        }
        self.arcs[pivot].next = Some(node);

        self.insert_fixup(node);
        node
    }

    /// Removes an arc, keeping the prev/next threading of its neighbours
    /// consistent.
    pub fn delete(&mut self, node: ArcKey) {
        let prev = self.arcs[node].prev;
        let next = self.arcs[node].next;
        if let Some(prev) = prev {
            self.arcs[prev].next = next;
        }
        if let Some(next) = next {
            self.arcs[next].prev = prev;
        }

        let node_left = self.arcs[node].left;
        let node_right = self.arcs[node].right;
        let mut removed_color = self.arcs[node].color;
        let fixup_child;
        let fixup_parent;

        if node_left.is_none() {
            fixup_child = node_right;
            fixup_parent = self.arcs[node].parent;
            self.transplant(node, node_right);
        } else if node_right.is_none() {
            fixup_child = node_left;
            fixup_parent = self.arcs[node].parent;
            self.transplant(node, node_left);
        } else {
            // Two children: the in-order successor takes the node's place.
            let successor = self.minimum(node_right.unwrap());
            removed_color = self.arcs[successor].color;
            fixup_child = self.arcs[successor].right;
            if self.arcs[successor].parent == Some(node) {
                fixup_parent = Some(successor);
            } else {
                fixup_parent = self.arcs[successor].parent;
                self.transplant(successor, self.arcs[successor].right);
                let right = self.arcs[node].right.unwrap();
                self.arcs[successor].right = Some(right);
                self.arcs[right].parent = Some(successor);
            }
            self.transplant(node, Some(successor));
            let left = self.arcs[node].left.unwrap();
            self.arcs[successor].left = Some(left);
            self.arcs[left].parent = Some(successor);
            self.arcs[successor].color = self.arcs[node].color;
        }

        self.arcs.remove(node);
        if removed_color == Color::Black {
            self.delete_fixup(fixup_child, fixup_parent);
        }
    }

    fn color(&self, node: Option<ArcKey>) -> Color {
        node.map_or(Color::Black, |node| self.arcs[node].color)
    }

    fn minimum(&self, mut node: ArcKey) -> ArcKey {
        while let Some(left) = self.arcs[node].left {
            node = left;
        }
        node
    }

    fn maximum(&self, mut node: ArcKey) -> ArcKey {
        while let Some(right) = self.arcs[node].right {
            node = right;
        }
        node
    }

    fn rotate_left(&mut self, x: ArcKey) {
        let y = self.arcs[x].right.unwrap();
        let y_left = self.arcs[y].left;
        self.arcs[x].right = y_left;
        if let Some(child) = y_left {
            self.arcs[child].parent = Some(x);
        }
        let x_parent = self.arcs[x].parent;
        self.arcs[y].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(parent) => {
                if self.arcs[parent].left == Some(x) {
                    self.arcs[parent].left = Some(y);
                } else {
                    self.arcs[parent].right = Some(y);
                }
            }
        }
        self.arcs[y].left = Some(x);
        self.arcs[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: ArcKey) {
        let y = self.arcs[x].left.unwrap();
        let y_right = self.arcs[y].right;
        self.arcs[x].left = y_right;
        if let Some(child) = y_right {
            self.arcs[child].parent = Some(x);
        }
        let x_parent = self.arcs[x].parent;
        self.arcs[y].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(parent) => {
                if self.arcs[parent].left == Some(x) {
                    self.arcs[parent].left = Some(y);
                } else {
                    self.arcs[parent].right = Some(y);
                }
            }
        }
        self.arcs[y].right = Some(x);
        self.arcs[x].parent = Some(y);
    }

    fn insert_fixup(&mut self, mut node: ArcKey) {
        while self.color(self.arcs[node].parent) == Color::Red {
            let parent = self.arcs[node].parent.unwrap();
            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.arcs[parent].parent.unwrap();
            if self.arcs[grandparent].left == Some(parent) {
                let uncle = self.arcs[grandparent].right;
                if self.color(uncle) == Color::Red {
                    self.arcs[parent].color = Color::Black;
                    self.arcs[uncle.unwrap()].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    node = grandparent;
                } else {
                    if self.arcs[parent].right == Some(node) {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let parent = self.arcs[node].parent.unwrap();
                    let grandparent = self.arcs[parent].parent.unwrap();
                    self.arcs[parent].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.arcs[grandparent].left;
                if self.color(uncle) == Color::Red {
                    self.arcs[parent].color = Color::Black;
                    self.arcs[uncle.unwrap()].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    node = grandparent;
                } else {
                    if self.arcs[parent].left == Some(node) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = self.arcs[node].parent.unwrap();
                    let grandparent = self.arcs[parent].parent.unwrap();
                    self.arcs[parent].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root.unwrap();
        self.arcs[root].color = Color::Black;
    }

    /// Replaces the subtree rooted at `node` with the subtree rooted at
    /// `replacement`.
    fn transplant(&mut self, node: ArcKey, replacement: Option<ArcKey>) {
        let parent = self.arcs[node].parent;
        match parent {
            None => self.root = replacement,
            Some(parent) => {
                if self.arcs[parent].left == Some(node) {
                    self.arcs[parent].left = replacement;
                } else {
                    self.arcs[parent].right = replacement;
                }
            }
        }
        if let Some(replacement) = replacement {
            self.arcs[replacement].parent = parent;
        }
    }

    // The fixup child may be nil, so its parent is tracked explicitly.
    fn delete_fixup(&mut self, mut node: Option<ArcKey>, mut parent: Option<ArcKey>) {
        while node != self.root && self.color(node) == Color::Black {
            let p = match parent {
                Some(p) => p,
                None => break,
            };
            if self.arcs[p].left == node {
                let mut sibling = self.arcs[p].right.unwrap();
                if self.arcs[sibling].color == Color::Red {
                    self.arcs[sibling].color = Color::Black;
                    self.arcs[p].color = Color::Red;
                    self.rotate_left(p);
                    sibling = self.arcs[p].right.unwrap();
                }
                if self.color(self.arcs[sibling].left) == Color::Black
                    && self.color(self.arcs[sibling].right) == Color::Black
                {
                    self.arcs[sibling].color = Color::Red;
                    node = Some(p);
                    parent = self.arcs[p].parent;
                } else {
                    if self.color(self.arcs[sibling].right) == Color::Black {
                        if let Some(left) = self.arcs[sibling].left {
                            self.arcs[left].color = Color::Black;
                        }
                        self.arcs[sibling].color = Color::Red;
                        self.rotate_right(sibling);
                        sibling = self.arcs[p].right.unwrap();
                    }
                    self.arcs[sibling].color = self.arcs[p].color;
                    self.arcs[p].color = Color::Black;
                    if let Some(right) = self.arcs[sibling].right {
                        self.arcs[right].color = Color::Black;
                    }
                    self.rotate_left(p);
                    node = self.root;
                    parent = None;
                }
            } else {
                let mut sibling = self.arcs[p].left.unwrap();
                if self.arcs[sibling].color == Color::Red {
                    self.arcs[sibling].color = Color::Black;
                    self.arcs[p].color = Color::Red;
                    self.rotate_right(p);
                    sibling = self.arcs[p].left.unwrap();
                }
                if self.color(self.arcs[sibling].left) == Color::Black
                    && self.color(self.arcs[sibling].right) == Color::Black
                {
                    self.arcs[sibling].color = Color::Red;
                    node = Some(p);
                    parent = self.arcs[p].parent;
                } else {
                    if self.color(self.arcs[sibling].left) == Color::Black {
                        if let Some(right) = self.arcs[sibling].right {
                            self.arcs[right].color = Color::Black;
                        }
                        self.arcs[sibling].color = Color::Red;
                        self.rotate_left(sibling);
                        sibling = self.arcs[p].left.unwrap();
                    }
                    self.arcs[sibling].color = self.arcs[p].color;
                    self.arcs[p].color = Color::Black;
                    if let Some(left) = self.arcs[sibling].left {
                        self.arcs[left].color = Color::Black;
                    }
                    self.rotate_right(p);
                    node = self.root;
                    parent = None;
                }
            }
        }
        if let Some(node) = node {
            self.arcs[node].color = Color::Black;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_order(beachline: &Beachline) -> Vec<ArcKey> {
        fn walk(beachline: &Beachline, node: Option<ArcKey>, out: &mut Vec<ArcKey>) {
            if let Some(node) = node {
                walk(beachline, beachline.arcs[node].left, out);
                out.push(node);
                walk(beachline, beachline.arcs[node].right, out);
            }
        }
        let mut out = vec![];
        walk(beachline, beachline.root, &mut out);
        out
    }

    fn threaded_order(beachline: &Beachline) -> Vec<ArcKey> {
        let mut out = vec![];
        let mut current = beachline.leftmost();
        while let Some(arc) = current {
            out.push(arc);
            current = beachline.next(arc);
        }
        out
    }

    fn dummy_sites(count: usize) -> (Diagram, Vec<SiteKey>) {
        let points: Vec<Point> = (0..count).map(|i| Point::new(i as f64, 0.0)).collect();
        let diagram = Diagram::new(&points);
        let sites = diagram.site_keys();
        (diagram, sites)
    }

    #[test]
    fn splices_keep_threading_and_tree_order_in_sync() {
        let (_, sites) = dummy_sites(6);
        let mut beachline = Beachline::new();
        let root = beachline.set_root(sites[0]);
        let b = beachline.insert_after(root, sites[1]);
        let c = beachline.insert_after(b, sites[2]);
        let a = beachline.insert_before(root, sites[3]);
        beachline.insert_before(c, sites[4]);
        beachline.insert_after(a, sites[5]);

        assert_eq!(beachline.len(), 6);
        assert_eq!(in_order(&beachline), threaded_order(&beachline));
        let order: Vec<_> = threaded_order(&beachline)
            .into_iter()
            .map(|arc| beachline.get_site(arc))
            .collect();
        assert_eq!(order, vec![sites[3], sites[5], sites[0], sites[1], sites[4], sites[2]]);
    }

    #[test]
    fn delete_unlinks_neighbours() {
        let (_, sites) = dummy_sites(3);
        let mut beachline = Beachline::new();
        let root = beachline.set_root(sites[0]);
        let b = beachline.insert_after(root, sites[1]);
        let c = beachline.insert_after(b, sites[2]);

        beachline.delete(b);
        assert_eq!(beachline.next(root), Some(c));
        assert_eq!(beachline.prev(c), Some(root));
        assert_eq!(in_order(&beachline), threaded_order(&beachline));
    }

    #[test]
    fn heavy_churn_keeps_the_tree_consistent() {
        let (_, sites) = dummy_sites(2);
        let mut beachline = Beachline::new();
        let mut arcs = vec![beachline.set_root(sites[0])];
        // Grow from alternating ends, then carve out the middle.
        for i in 1..32 {
            let arc = if i % 2 == 0 {
                beachline.insert_before(arcs[0], sites[i % 2])
            } else {
                beachline.insert_after(*arcs.last().unwrap(), sites[i % 2])
            };
            if i % 2 == 0 {
                arcs.insert(0, arc);
            } else {
                arcs.push(arc);
            }
            assert_eq!(in_order(&beachline), threaded_order(&beachline));
        }
        for arc in arcs.drain(8..24) {
            beachline.delete(arc);
            assert_eq!(in_order(&beachline), threaded_order(&beachline));
        }
        assert_eq!(beachline.len(), 16);
    }

    #[test]
    fn break_arc_passes_edges_to_the_fragments() {
        let points = [Point::new(0.0, 1.0), Point::new(0.5, 0.0)];
        let mut diagram = Diagram::new(&points);
        let sites = diagram.site_keys();
        let faces = diagram.face_keys();
        let (left_edge, right_edge) = diagram.add_edge(faces[0], faces[0]);

        let mut beachline = Beachline::new();
        let root = beachline.set_root(sites[0]);
        beachline.set_left_half_edge(root, Some(left_edge));
        beachline.set_right_half_edge(root, Some(right_edge));

        let (left, middle, right) = beachline.break_arc(root, sites[1]);
        assert_eq!(middle, root);
        assert_eq!(beachline.get_site(left), sites[0]);
        assert_eq!(beachline.get_site(middle), sites[1]);
        assert_eq!(beachline.get_site(right), sites[0]);
        assert_eq!(beachline.get_left_half_edge(left), Some(left_edge));
        assert_eq!(beachline.get_right_half_edge(right), Some(right_edge));
        assert_eq!(beachline.get_left_half_edge(middle), None);
        assert_eq!(beachline.get_right_half_edge(middle), None);
        assert_eq!(threaded_order(&beachline), vec![left, middle, right]);
    }

    #[test]
    fn arc_above_descends_by_breakpoints() {
        use crate::metric::Euclidean;

        let points = [Point::new(0.0, 2.0), Point::new(1.0, 1.0)];
        let diagram = Diagram::new(&points);
        let sites = diagram.site_keys();

        let mut beachline = Beachline::new();
        let root = beachline.set_root(sites[0]);
        let (left, middle, right) = beachline.break_arc(root, sites[1]);

        // The two parabolas cross at x = 0 and x = 4 with the sweep at 0.
        let above = beachline.arc_above(Point::new(-1.0, 0.0), 0.0, &diagram, &Euclidean);
        assert_eq!(above, left);
        let above = beachline.arc_above(Point::new(2.0, 0.0), 0.0, &diagram, &Euclidean);
        assert_eq!(above, middle);
        let above = beachline.arc_above(Point::new(5.0, 0.0), 0.0, &diagram, &Euclidean);
        assert_eq!(above, right);
        // A query exactly on a breakpoint stays with the left arc.
        let above = beachline.arc_above(Point::new(0.0, 0.0), 0.0, &diagram, &Euclidean);
        assert_eq!(above, left);
    }
}
