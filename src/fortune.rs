use crate::beachline::{ArcKey, Beachline};
use crate::boundingbox::BoundingBox;
use crate::diagram::{Diagram, SiteKey};
use crate::error::Error;
use crate::event::{EventKind, EventQueue};
use crate::geometry::{get_det, get_orthogonal, Point};
use crate::metric::{named_metric, Euclidean, Metric};
use cgmath::EuclideanSpace;
use log::{debug, trace, warn};

/// The sweepline driver.
///
/// Owns the diagram under construction, the beachline and the event queue,
/// and runs the sweep from the topmost site downward. After `construct`
/// and `bound` the diagram is read-only for observers.
pub struct FortuneAlgorithm {
    diagram: Diagram,
    beachline: Beachline,
    events: EventQueue,
    metric: Box<dyn Metric>,
}

impl std::fmt::Debug for FortuneAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FortuneAlgorithm").finish_non_exhaustive()
    }
}

impl FortuneAlgorithm {
    /// Sets up a sweep over `points` with the Euclidean metric.
    pub fn new(points: &[Point]) -> Self {
        Self::with_metric(points, Box::new(Euclidean))
    }

    /// Sets up a sweep over `points` with a caller-supplied metric.
    pub fn with_metric(points: &[Point], metric: Box<dyn Metric>) -> Self {
        FortuneAlgorithm {
            diagram: Diagram::new(points),
            beachline: Beachline::new(),
            events: EventQueue::new(),
            metric,
        }
    }

    /// Sets up a sweep over `points` with a registered metric, failing if
    /// no metric is registered under `name`.
    pub fn with_named_metric(points: &[Point], name: &str) -> Result<Self, Error> {
        match named_metric(name) {
            Some(metric) => Ok(Self::with_metric(points, metric)),
            None => Err(Error::UnknownMetric(name.to_owned())),
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }

    /// Runs the sweep to completion.
    ///
    /// Processes events in decreasing-y order: site events split or extend
    /// the beachline, circle events contract it and create the diagram's
    /// interior vertices. Edges traced by the arcs that survive the sweep
    /// stay dangling until `bound`.
    pub fn construct(&mut self) {
        if cfg!(debug_assertions) && all_sites_collinear(&self.diagram) {
            warn!("all sites are collinear, the bounded cells will be degenerate");
        }

        for site in self.diagram.site_keys() {
            let y = self.diagram.get_site_point(site).y;
            self.events.push_site_event(y, site);
        }

        while let Some(event) = self.events.pop() {
            match event.kind {
                EventKind::Site { site } => {
                    trace!("site event at y = {}", event.y);
                    self.handle_site_event(site, event.y);
                }
                EventKind::Circle { point, arc } => {
                    trace!("circle event at y = {}", event.y);
                    self.handle_circle_event(arc, point, event.y);
                }
            }
        }
    }

    fn handle_site_event(&mut self, site: SiteKey, sweep_y: f64) {
        let point = self.diagram.get_site_point(site);

        if self.beachline.is_empty() {
            self.beachline.set_root(site);
            return;
        }

        let arc_above =
            self.beachline
                .arc_above(point, sweep_y, &self.diagram, self.metric.as_ref());
        if let Some(event) = self.beachline.get_event(arc_above) {
            self.events.invalidate(event);
            self.beachline.set_event(arc_above, None);
        }

        let above_point = self.diagram.get_site_point(self.beachline.get_site(arc_above));
        if above_point.y == point.y {
            // The located arc's focus lies on the sweepline, so the arc is
            // a vertical ray and cannot be split; the new arc goes beside
            // it instead. Only reachable while every processed site shares
            // the new site's y.
            self.insert_beside(arc_above, site, point.x < above_point.x, sweep_y);
            return;
        }

        let (left, middle, right) = self.beachline.break_arc(arc_above, site);

        let left_face = self.diagram.get_site_face(self.beachline.get_site(left));
        let middle_face = self.diagram.get_site_face(site);
        let (half_edge_1, half_edge_2) = self.diagram.add_edge(left_face, middle_face);

        // The outer fragments belong to the same site, so the new pair is
        // shared by both breakpoints flanking the middle arc.
        self.beachline.set_right_half_edge(left, Some(half_edge_1));
        self.beachline.set_left_half_edge(middle, Some(half_edge_2));
        self.beachline.set_right_half_edge(middle, Some(half_edge_2));
        self.beachline.set_left_half_edge(right, Some(half_edge_1));

        if let Some(prev) = self.beachline.prev(left) {
            self.add_circle_event(prev, left, middle, sweep_y);
        }
        if let Some(next) = self.beachline.next(right) {
            self.add_circle_event(middle, right, next, sweep_y);
        }
    }

    /// Splices an arc for `site` next to `pivot`, for the degenerate case
    /// where `pivot`'s focus lies on the sweepline.
    ///
    /// When the new arc lands between two arcs that already share an edge
    /// pair, that adjacency is gone: its halves keep their faces and are
    /// retwinned against two new half edges for the middle cell, one per
    /// new adjacency. Otherwise a single new pair joins the new arc to
    /// the pivot.
    fn insert_beside(&mut self, pivot: ArcKey, site: SiteKey, before: bool, sweep_y: f64) {
        let arc = if before {
            self.beachline.insert_before(pivot, site)
        } else {
            self.beachline.insert_after(pivot, site)
        };

        let prev = self.beachline.prev(arc);
        let next = self.beachline.next(arc);
        let face = self.diagram.get_site_face(site);

        match (prev, next) {
            (Some(prev), Some(next)) => {
                if let Some(event) = self.beachline.get_event(prev) {
                    self.events.invalidate(event);
                    self.beachline.set_event(prev, None);
                }
                if let Some(event) = self.beachline.get_event(next) {
                    self.events.invalidate(event);
                    self.beachline.set_event(next, None);
                }
                let prev_half_edge = self.beachline.get_right_half_edge(prev).unwrap();
                let next_half_edge = self.beachline.get_left_half_edge(next).unwrap();
                let half_edge_1 = self.diagram.add_half_edge(face);
                let half_edge_2 = self.diagram.add_half_edge(face);
                self.diagram.set_half_edge_twins(prev_half_edge, half_edge_1);
                self.diagram.set_half_edge_twins(half_edge_2, next_half_edge);
                self.beachline.set_left_half_edge(arc, Some(half_edge_1));
                self.beachline.set_right_half_edge(arc, Some(half_edge_2));
            }
            (Some(prev), None) => {
                let prev_face = self.diagram.get_site_face(self.beachline.get_site(prev));
                let (half_edge_1, half_edge_2) = self.diagram.add_edge(prev_face, face);
                self.beachline.set_right_half_edge(prev, Some(half_edge_1));
                self.beachline.set_left_half_edge(arc, Some(half_edge_2));
            }
            (None, Some(next)) => {
                let next_face = self.diagram.get_site_face(self.beachline.get_site(next));
                let (half_edge_1, half_edge_2) = self.diagram.add_edge(face, next_face);
                self.beachline.set_right_half_edge(arc, Some(half_edge_1));
                self.beachline.set_left_half_edge(next, Some(half_edge_2));
            }
            (None, None) => unreachable!("insert_beside needs a pivot arc"),
        }

        if let Some(prev) = prev {
            if let Some(prev_prev) = self.beachline.prev(prev) {
                self.add_circle_event(prev_prev, prev, arc, sweep_y);
            }
        }
        if let (Some(prev), Some(next)) = (prev, next) {
            self.add_circle_event(prev, arc, next, sweep_y);
        }
        if let Some(next) = next {
            if let Some(next_next) = self.beachline.next(next) {
                self.add_circle_event(arc, next, next_next, sweep_y);
            }
        }
    }

    fn handle_circle_event(&mut self, arc: ArcKey, point: Point, sweep_y: f64) {
        let vertex = self.diagram.add_vertex(point);

        let left = self.beachline.prev(arc).unwrap();
        let right = self.beachline.next(arc).unwrap();
        if let Some(event) = self.beachline.get_event(left) {
            self.events.invalidate(event);
            self.beachline.set_event(left, None);
        }
        if let Some(event) = self.beachline.get_event(right) {
            self.events.invalidate(event);
            self.beachline.set_event(right, None);
        }

        let left_half_edge = self.beachline.get_left_half_edge(arc).unwrap();
        let right_half_edge = self.beachline.get_right_half_edge(arc).unwrap();
        let prev_right_half_edge = self.beachline.get_right_half_edge(left).unwrap();
        let next_left_half_edge = self.beachline.get_left_half_edge(right).unwrap();

        // Terminate the four half edges meeting at the new vertex.
        self.diagram
            .set_half_edge_origin(prev_right_half_edge, Some(vertex));
        self.diagram
            .set_half_edge_destination(left_half_edge, Some(vertex));
        self.diagram
            .set_half_edge_origin(right_half_edge, Some(vertex));
        self.diagram
            .set_half_edge_destination(next_left_half_edge, Some(vertex));

        // The squeezed arc's two edges become consecutive around its face.
        self.diagram.link_half_edges(left_half_edge, right_half_edge);

        self.beachline.delete(arc);

        // The newly adjacent pair starts tracing an edge out of the vertex.
        let left_face = self.diagram.get_site_face(self.beachline.get_site(left));
        let right_face = self.diagram.get_site_face(self.beachline.get_site(right));
        let (half_edge_1, half_edge_2) = self.diagram.add_edge(left_face, right_face);
        self.beachline.set_right_half_edge(left, Some(half_edge_1));
        self.beachline.set_left_half_edge(right, Some(half_edge_2));
        self.diagram.set_half_edge_destination(half_edge_1, Some(vertex));
        self.diagram.set_half_edge_origin(half_edge_2, Some(vertex));
        self.diagram.link_half_edges(half_edge_1, prev_right_half_edge);
        self.diagram.link_half_edges(next_left_half_edge, half_edge_2);

        if let Some(prev) = self.beachline.prev(left) {
            self.add_circle_event(prev, left, right, sweep_y);
        }
        if let Some(next) = self.beachline.next(right) {
            self.add_circle_event(left, right, next, sweep_y);
        }
    }

    /// Checks three consecutive arcs for a circle event and enqueues it if
    /// it is valid.
    fn add_circle_event(&mut self, left: ArcKey, middle: ArcKey, right: ArcKey, sweep_y: f64) {
        let left_point = self.diagram.get_site_point(self.beachline.get_site(left));
        let middle_point = self.diagram.get_site_point(self.beachline.get_site(middle));
        let right_point = self.diagram.get_site_point(self.beachline.get_site(right));

        let convergence =
            match self
                .metric
                .compute_convergence_point(left_point, middle_point, right_point)
            {
                Some(convergence) => convergence,
                None => {
                    debug!("degenerate convergence point, no circle event");
                    return;
                }
            };

        // The circle must complete below the sweepline. A NaN event y
        // fails the comparison and is dropped.
        if !(convergence.event_y <= sweep_y) {
            return;
        }

        let left_moving_right = left_point.y < middle_point.y;
        let right_moving_right = middle_point.y < right_point.y;
        let left_initial_x = if left_moving_right {
            left_point.x
        } else {
            middle_point.x
        };
        let right_initial_x = if right_moving_right {
            middle_point.x
        } else {
            right_point.x
        };

        // Each breakpoint must start on its own side of the convergence x.
        // Equality counts as converging only for a breakpoint moving
        // right: a split at a coinciding breakpoint leaves its zero-width
        // arc to the right of the new arc, never to the left.
        let left_valid = if left_moving_right {
            left_initial_x <= convergence.center.x
        } else {
            left_initial_x > convergence.center.x
        };
        let right_valid = if right_moving_right {
            right_initial_x <= convergence.center.x
        } else {
            right_initial_x > convergence.center.x
        };

        if left_valid && right_valid {
            let event =
                self.events
                    .push_circle_event(convergence.event_y, convergence.center, middle);
            self.beachline.set_event(middle, Some(event));
        }
    }

    /// Closes the edges still dangling after the sweep against `bbox`,
    /// first expanded to contain every site and vertex.
    ///
    /// Each adjacent pair of surviving arcs traces the bisector ray of its
    /// two sites; the ray is cut at the box and the pair's half edges are
    /// terminated there. A half edge still missing its far endpoint after
    /// that walk is unbounded in its direction of travel (a full bisector
    /// line from a same-y site pair, or the upward edge between the
    /// topmost cells when several sites share the maximal y); it is cut
    /// with the ray out of its known endpoint. Unbounded cells stay open
    /// along the box side.
    pub fn bound(&mut self, bbox: BoundingBox) {
        let mut bbox = bbox;
        for site in self.diagram.site_keys() {
            bbox.expand_to_contain(self.diagram.get_site_point(site));
        }
        for point in self.diagram.get_vertex_points() {
            bbox.expand_to_contain(point);
        }

        if self.beachline.is_empty() {
            return;
        }

        let mut left = self.beachline.leftmost().unwrap();
        while let Some(right) = self.beachline.next(left) {
            let left_point = self.diagram.get_site_point(self.beachline.get_site(left));
            let right_point = self.diagram.get_site_point(self.beachline.get_site(right));
            let origin = left_point.midpoint(right_point);
            let direction = get_orthogonal(left_point - right_point);

            let vertex = self.diagram.add_vertex(bbox.intersect(origin, direction));
            self.diagram.set_half_edge_origin(
                self.beachline.get_right_half_edge(left).unwrap(),
                Some(vertex),
            );
            self.diagram.set_half_edge_destination(
                self.beachline.get_left_half_edge(right).unwrap(),
                Some(vertex),
            );

            left = right;
        }

        // A half edge runs with its incident face on the left, so it
        // travels along the orthogonal of (twin's site - own site). Every
        // half edge has at least one endpoint by now: circle events set
        // both ends of interior edges and the walk above set one end of
        // every edge still held by the beachline.
        for half_edge in self.diagram.half_edge_keys() {
            let origin = self.diagram.get_half_edge_origin(half_edge);
            if self.diagram.get_half_edge_destination(half_edge).is_some() || origin.is_none() {
                continue;
            }
            let twin = self.diagram.get_half_edge_twin(half_edge).unwrap();
            let own_site =
                self.diagram.get_face_point(self.diagram.get_half_edge_incident_face(half_edge));
            let twin_site =
                self.diagram.get_face_point(self.diagram.get_half_edge_incident_face(twin));
            let direction = get_orthogonal(twin_site - own_site);
            let start = self.diagram.get_vertex_point(origin.unwrap());

            let vertex = self.diagram.add_vertex(bbox.intersect(start, direction));
            self.diagram.set_half_edge_destination(half_edge, Some(vertex));
            self.diagram.set_half_edge_origin(twin, Some(vertex));
        }
    }
}

fn all_sites_collinear(diagram: &Diagram) -> bool {
    let points: Vec<Point> = diagram
        .site_keys()
        .into_iter()
        .map(|site| diagram.get_site_point(site))
        .collect();
    if points.len() < 3 {
        return false;
    }
    let origin = points[0];
    let base = match points.iter().find(|&&point| point != origin) {
        Some(&base) => base - origin,
        None => return true,
    };
    points
        .iter()
        .all(|&point| get_det(base, point - origin) == 0.0)
}
