use crate::geometry::Point;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct SiteKey;
    pub struct VertexKey;
    pub struct HalfEdgeKey;
    pub struct FaceKey;
}

/// An input site.
///
/// Stores its position in the input slice, its location and the face that
/// grows around it. Immutable once the site and face are linked.
pub struct Site {
    index: usize,
    point: Point,
    face: Option<FaceKey>,
}

/// A vertex of the diagram, equidistant from three or more sites or
/// produced by clipping an edge against the bounding box.
pub struct Vertex {
    point: Point,
}

/// A half edge of the diagram.
///
/// Stores the origin and destination vertices, the incident face, the twin
/// half edge running in the opposite direction, and the previous and next
/// half edges around the incident face. Everything except the incident
/// face is filled in incrementally as the sweep progresses.
#[derive(Debug)]
pub struct HalfEdge {
    origin: Option<VertexKey>,
    destination: Option<VertexKey>,
    incident_face: FaceKey,
    twin: Option<HalfEdgeKey>,
    prev: Option<HalfEdgeKey>,
    next: Option<HalfEdgeKey>,
}

/// A cell of the diagram, bijective with its site. Holds one arbitrary
/// boundary half edge; the rest of the boundary is reached through the
/// `next` links.
pub struct Face {
    site: SiteKey,
    edge: Option<HalfEdgeKey>,
}

/// The diagram as a doubly connected edge list: append-only arenas of
/// sites, faces, vertices and half edges plus the methods to link them.
pub struct Diagram {
    sites: SlotMap<SiteKey, Site>,
    faces: SlotMap<FaceKey, Face>,
    vertices: SlotMap<VertexKey, Vertex>,
    half_edges: SlotMap<HalfEdgeKey, HalfEdge>,
}

impl Diagram {
    /// Creates a diagram seeded with one site and one empty face per input
    /// point.
    pub fn new(points: &[Point]) -> Self {
        let mut diagram = Diagram {
            sites: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            vertices: SlotMap::with_key(),
            half_edges: SlotMap::with_key(),
        };
        for (index, &point) in points.iter().enumerate() {
            let site = diagram.sites.insert(Site {
                index,
                point,
                face: None,
            });
            let face = diagram.faces.insert(Face { site, edge: None });
            diagram.sites[site].face = Some(face);
        }
        diagram
    }

    /// Returns the key of every site, in insertion order.
    pub fn site_keys(&self) -> Vec<SiteKey> {
        self.sites.keys().collect()
    }

    pub fn face_keys(&self) -> Vec<FaceKey> {
        self.faces.keys().collect()
    }

    pub fn half_edge_keys(&self) -> Vec<HalfEdgeKey> {
        self.half_edges.keys().collect()
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_half_edges(&self) -> usize {
        self.half_edges.len()
    }

    pub fn get_site_point(&self, site: SiteKey) -> Point {
        self.sites[site].point
    }

    pub fn get_site_index(&self, site: SiteKey) -> usize {
        self.sites[site].index
    }

    pub fn get_site_face(&self, site: SiteKey) -> FaceKey {
        self.sites[site].face.unwrap()
    }

    pub fn get_face_site(&self, face: FaceKey) -> SiteKey {
        self.faces[face].site
    }

    /// Returns the location of the site a face grew around.
    pub fn get_face_point(&self, face: FaceKey) -> Point {
        self.get_site_point(self.faces[face].site)
    }

    pub fn get_face_edge(&self, face: FaceKey) -> Option<HalfEdgeKey> {
        self.faces[face].edge
    }

    pub fn get_vertex_point(&self, vertex: VertexKey) -> Point {
        self.vertices[vertex].point
    }

    /// Returns the location of every vertex in the diagram.
    pub fn get_vertex_points(&self) -> Vec<Point> {
        self.vertices.values().map(|vertex| vertex.point).collect()
    }

    /// Adds a new vertex to the diagram.
    pub fn add_vertex(&mut self, point: Point) -> VertexKey {
        self.vertices.insert(Vertex { point })
    }

    /// Adds a new half edge incident to `face`, binding it as the face's
    /// boundary edge if the face does not have one yet.
    pub fn add_half_edge(&mut self, face: FaceKey) -> HalfEdgeKey {
        let half_edge = self.half_edges.insert(HalfEdge {
            origin: None,
            destination: None,
            incident_face: face,
            twin: None,
            prev: None,
            next: None,
        });
        if self.faces[face].edge.is_none() {
            self.faces[face].edge = Some(half_edge);
        }
        half_edge
    }

    /// Adds a new edge between two faces as a twinned pair of half edges.
    ///
    /// The half edges only know their incident face and twin; endpoints
    /// and ring links are filled in by the caller as they become known.
    pub fn add_edge(
        &mut self,
        left_face: FaceKey,
        right_face: FaceKey,
    ) -> (HalfEdgeKey, HalfEdgeKey) {
        let half_edge_1 = self.add_half_edge(left_face);
        let half_edge_2 = self.add_half_edge(right_face);
        self.half_edges[half_edge_1].twin = Some(half_edge_2);
        self.half_edges[half_edge_2].twin = Some(half_edge_1);
        (half_edge_1, half_edge_2)
    }

    pub fn get_half_edge_origin(&self, half_edge: HalfEdgeKey) -> Option<VertexKey> {
        self.half_edges[half_edge].origin
    }

    pub fn set_half_edge_origin(&mut self, half_edge: HalfEdgeKey, origin: Option<VertexKey>) {
        self.half_edges[half_edge].origin = origin;
    }

    pub fn get_half_edge_destination(&self, half_edge: HalfEdgeKey) -> Option<VertexKey> {
        self.half_edges[half_edge].destination
    }

    pub fn set_half_edge_destination(
        &mut self,
        half_edge: HalfEdgeKey,
        destination: Option<VertexKey>,
    ) {
        self.half_edges[half_edge].destination = destination;
    }

    pub fn get_half_edge_twin(&self, half_edge: HalfEdgeKey) -> Option<HalfEdgeKey> {
        self.half_edges[half_edge].twin
    }

    /// Pairs two half edges as twins of each other.
    pub fn set_half_edge_twins(&mut self, half_edge_1: HalfEdgeKey, half_edge_2: HalfEdgeKey) {
        self.half_edges[half_edge_1].twin = Some(half_edge_2);
        self.half_edges[half_edge_2].twin = Some(half_edge_1);
    }

    pub fn get_half_edge_incident_face(&self, half_edge: HalfEdgeKey) -> FaceKey {
        self.half_edges[half_edge].incident_face
    }

    pub fn get_half_edge_prev(&self, half_edge: HalfEdgeKey) -> Option<HalfEdgeKey> {
        self.half_edges[half_edge].prev
    }

    pub fn get_half_edge_next(&self, half_edge: HalfEdgeKey) -> Option<HalfEdgeKey> {
        self.half_edges[half_edge].next
    }

    /// Links two half edges so that they are consecutive around their
    /// incident face.
    pub fn link_half_edges(&mut self, prev: HalfEdgeKey, next: HalfEdgeKey) {
        self.half_edges[prev].next = Some(next);
        self.half_edges[next].prev = Some(prev);
    }

    /// Returns an iterator over the boundary of a face, following `next`
    /// links from the face's bound edge until the walk closes or runs off
    /// an unbounded cell. Empty for a face with no edges.
    pub fn face_edges(&self, face: FaceKey) -> FaceEdgeIterator {
        FaceEdgeIterator {
            diagram: self,
            start_edge: self.faces[face].edge,
            current_edge: None,
            started: false,
        }
    }

    /// Returns the endpoint pairs of every fully terminated edge, one
    /// entry per twinned pair.
    pub fn edge_segments(&self) -> Vec<(Point, Point)> {
        let mut segments = vec![];
        for (key, half_edge) in &self.half_edges {
            // Visit each pair once, from its lower-keyed half.
            if let Some(twin) = half_edge.twin {
                if twin < key {
                    continue;
                }
            }
            if let (Some(origin), Some(destination)) = (half_edge.origin, half_edge.destination) {
                segments.push((
                    self.get_vertex_point(origin),
                    self.get_vertex_point(destination),
                ));
            }
        }
        segments
    }
}

/// Iterator over the half edges bounding a single face.
pub struct FaceEdgeIterator<'a> {
    diagram: &'a Diagram,
    start_edge: Option<HalfEdgeKey>,
    current_edge: Option<HalfEdgeKey>,
    started: bool,
}

impl<'a> Iterator for FaceEdgeIterator<'a> {
    type Item = HalfEdgeKey;

    fn next(&mut self) -> Option<HalfEdgeKey> {
        if !self.started {
            self.started = true;
            self.current_edge = self.start_edge;
        } else if let Some(current) = self.current_edge {
            self.current_edge = self.diagram.get_half_edge_next(current);
            if self.current_edge == self.start_edge {
                self.current_edge = None;
            }
        }
        self.current_edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sites_and_faces_are_linked_both_ways() {
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let diagram = Diagram::new(&points);
        assert_eq!(diagram.num_sites(), 2);
        assert_eq!(diagram.num_faces(), 2);
        for (position, site) in diagram.site_keys().into_iter().enumerate() {
            let face = diagram.get_site_face(site);
            assert_eq!(diagram.get_face_site(face), site);
            // Sites remember their position in the input slice.
            assert_eq!(diagram.get_site_index(site), position);
            assert_eq!(diagram.get_site_point(site), points[position]);
        }
    }

    #[test]
    fn add_edge_creates_twins() {
        let mut diagram = Diagram::new(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        let faces = diagram.face_keys();
        let (a, b) = diagram.add_edge(faces[0], faces[1]);
        assert_eq!(diagram.get_half_edge_twin(a), Some(b));
        assert_eq!(diagram.get_half_edge_twin(b), Some(a));
        assert_eq!(diagram.get_half_edge_incident_face(a), faces[0]);
        assert_eq!(diagram.get_half_edge_incident_face(b), faces[1]);
        // The first half edge incident to each face becomes its bound edge.
        assert_eq!(diagram.get_face_edge(faces[0]), Some(a));
        assert_eq!(diagram.get_face_edge(faces[1]), Some(b));
    }

    #[test]
    fn face_walk_follows_next_links() {
        let mut diagram = Diagram::new(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        let faces = diagram.face_keys();
        let e1 = diagram.add_half_edge(faces[0]);
        let e2 = diagram.add_half_edge(faces[0]);
        let e3 = diagram.add_half_edge(faces[0]);
        diagram.link_half_edges(e1, e2);
        diagram.link_half_edges(e2, e3);
        diagram.link_half_edges(e3, e1);
        let walk: Vec<_> = diagram.face_edges(faces[0]).collect();
        assert_eq!(walk, vec![e1, e2, e3]);
    }
}
