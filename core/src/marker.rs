use crate::form::PopupSpec;
use crate::geo::LatLng;

pub type MarkerId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerOrigin {
    /// Seeded from the server-rendered coordinate list at load time.
    Seeded,
    /// Dropped by a double-click; lives in the user overlay layer.
    UserPlaced,
}

/// A pin at a fixed geographic coordinate. The position is set at creation
/// and never changes; every marker owns exactly one popup.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub origin: MarkerOrigin,
    pub popup: PopupSpec,
}

/// Ordered collection of placed markers. Insertion order is display order
/// only and carries no other meaning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkerRegistry {
    markers: Vec<Marker>,
    next_id: MarkerId,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add_seed_marker(&mut self, position: LatLng) -> MarkerId {
        self.insert(position, MarkerOrigin::Seeded, PopupSpec::seed())
    }

    pub fn add_user_marker(&mut self, position: LatLng) -> MarkerId {
        self.insert(position, MarkerOrigin::UserPlaced, PopupSpec::user_placed())
    }

    fn insert(&mut self, position: LatLng, origin: MarkerOrigin, popup: PopupSpec) -> MarkerId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.markers.push(Marker {
            id,
            position,
            origin,
            popup,
        });
        id
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id == id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn seed_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|marker| marker.origin == MarkerOrigin::Seeded)
            .count()
    }

    pub fn user_layer(&self) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(|marker| marker.origin == MarkerOrigin::UserPlaced)
    }

    /// Removes the whole user overlay layer. There is no per-marker removal;
    /// clearing the layer is the only way a marker leaves the registry.
    pub fn clear_user_layer(&mut self) -> usize {
        let before = self.markers.len();
        self.markers
            .retain(|marker| marker.origin == MarkerOrigin::Seeded);
        before - self.markers.len()
    }
}
