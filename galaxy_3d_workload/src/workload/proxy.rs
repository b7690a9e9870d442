/// Proxy types: identifiers and bounding-sphere payloads.
///
/// A proxy is the lightweight stand-in the spatial index tracks for an
/// object. The workload only manipulates its bounding sphere; every other
/// attribute belongs to whoever owns the spatial index.

use std::fmt;
use glam::Vec3;
use crate::utils::{Index, INVALID_INDEX};

// ===== PROXY ID =====

/// Identifier of a proxy.
///
/// `0` is reserved and never handed out, so the first valid id is `1`.
/// Ids are recycled after their proxy is removed: an id is unique among
/// live proxies only, not across the whole history of a Collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProxyId(u32);

impl ProxyId {
    /// The reserved invalid id
    pub const INVALID: ProxyId = ProxyId(0);

    /// Wrap a raw id
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw integer value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is not the reserved id `0`
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Slot of this id in dense storage
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }

    /// Convert an allocator index; negative indices map to [`ProxyId::INVALID`]
    pub(crate) fn from_index(index: Index) -> Self {
        u32::try_from(index).map(Self).unwrap_or(Self::INVALID)
    }

    /// Convert back to an allocator index
    pub(crate) fn index(self) -> Index {
        Index::try_from(self.0).unwrap_or(INVALID_INDEX)
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ===== SPHERE =====

/// Bounding sphere: the payload carried by transactions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sphere {
    /// World-space center
    pub center: Vec3,
    /// Radius (non-negative)
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies inside or on the sphere
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Whether the two spheres overlap or touch
    pub fn intersects(&self, other: &Sphere) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Axis-aligned bounds as `(min, max)` corners
    pub fn to_aabb(&self) -> (Vec3, Vec3) {
        let extent = Vec3::splat(self.radius);
        (self.center - extent, self.center + extent)
    }
}

// ===== PROXY =====

/// A proxy as held by the authoritative [`super::ProxyStore`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proxy {
    /// Current bounding sphere
    pub sphere: Sphere,
    /// Frame whose transaction last wrote this proxy
    pub frame: u32,
}
