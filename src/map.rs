//! Route rendering: itinerary → validated map primitives.
//!
//! Turns an itinerary's abstract steps and segment geometries into station
//! markers, track polylines, and a bounding box, degrading gracefully when
//! geometry is incomplete: a segment without enough shape points is not
//! drawn as a line, but its endpoint stations still get markers.

use crate::defaults::MIN_GEOMETRY_POINTS;
use crate::query::{GeoPoint, Itinerary, Segment, VehicleClass};
use crate::stations;

/// A station marker on the map.
///
/// Terminal markers (the itinerary's first and last station) are rendered
/// distinctly from intermediate transfer stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub position: GeoPoint,
    pub terminal: bool,
}

/// A drawable track polyline for one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLine {
    pub vehicle_class: VehicleClass,
    pub points: Vec<GeoPoint>,
}

/// Axis-aligned bounding box over every rendered coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    fn from_point(point: GeoPoint) -> Self {
        Self {
            min_lat: point.lat,
            min_lon: point.lon,
            max_lat: point.lat,
            max_lon: point.lon,
        }
    }

    fn extend(&mut self, point: GeoPoint) {
        self.min_lat = self.min_lat.min(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lat = self.max_lat.max(point.lat);
        self.max_lon = self.max_lon.max(point.lon);
    }

    /// Accumulate a bounding box over a point sequence.
    ///
    /// Returns `None` when the sequence is empty; the caller should skip
    /// any viewport-fitting step rather than fail.
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lon: (self.min_lon + self.max_lon) / 2.0,
        }
    }
}

/// Everything needed to draw one itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub markers: Vec<Marker>,
    pub lines: Vec<TrackLine>,
    pub bounds: Option<Bounds>,
}

/// Whether a segment's geometry has enough points to draw as a line.
pub fn has_drawable_geometry(segment: &Segment) -> bool {
    segment
        .geometry
        .as_ref()
        .is_some_and(|g| g.len() >= MIN_GEOMETRY_POINTS)
}

/// Resolve itinerary steps into markers.
///
/// Lazy and restartable: the returned iterator borrows the steps and can
/// be re-created (or cloned) to consume the sequence again. Steps the
/// resolver does not know are silently dropped.
pub fn markers(steps: &[String]) -> impl Iterator<Item = Marker> + Clone + '_ {
    let last = steps.len().saturating_sub(1);
    steps.iter().enumerate().filter_map(move |(index, name)| {
        stations::resolve(name).map(|position| Marker {
            name: name.clone(),
            position,
            terminal: index == 0 || index == last,
        })
    })
}

/// Build drawable polylines from segments with sufficient geometry.
pub fn track_lines(segments: &[Segment]) -> Vec<TrackLine> {
    segments
        .iter()
        .filter(|segment| has_drawable_geometry(segment))
        .map(|segment| TrackLine {
            vehicle_class: segment.vehicle_class,
            points: segment.geometry.clone().unwrap_or_default(),
        })
        .collect()
}

/// Assemble the full map view for an itinerary.
///
/// The bounding box accumulates every rendered coordinate, marker
/// positions and line geometry points alike.
pub fn render(itinerary: &Itinerary) -> MapView {
    let markers: Vec<Marker> = markers(&itinerary.steps).collect();
    let lines = track_lines(&itinerary.segments);

    let all_points = markers
        .iter()
        .map(|m| m.position)
        .chain(lines.iter().flat_map(|line| line.points.iter().copied()));
    let bounds = Bounds::from_points(all_points);

    MapView {
        markers,
        lines,
        bounds,
    }
}
