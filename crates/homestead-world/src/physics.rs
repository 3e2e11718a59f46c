//! Physics capability seam.
//!
//! The world core never talks to a physics engine directly. Structures
//! describe a [`CollisionShape`]; the registry drives an injected
//! [`PhysicsBackend`] around structure placement and removal, and holds
//! the returned [`BodyHandle`] on the structure cell.

use std::sync::atomic::{AtomicU64, Ordering};

use homestead_common::PixelCoord;

/// Collision geometry for a structure, in pixels relative to the cell's
/// bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    /// Convex polygon given as vertex positions.
    Polygon(&'static [[f32; 2]]),
    /// Axis-aligned box.
    Box {
        /// Half extents on each axis.
        half_extents: [f32; 2],
        /// Box center relative to the cell corner.
        center: [f32; 2],
    },
}

/// Opaque handle to an externally owned physics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(u64);

impl BodyHandle {
    /// Creates a handle from a raw backend value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw backend value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// External physics collaborator.
///
/// One body per physics-bearing structure: attached when the registry
/// places the structure, detached before the cell is cleared or its
/// chunk unloaded. Implementations needing mutable state use interior
/// mutability.
pub trait PhysicsBackend: Send + Sync {
    /// Creates a static body with the given shape at a world position.
    fn attach_body(&self, shape: &CollisionShape, origin: PixelCoord) -> BodyHandle;

    /// Destroys a previously attached body.
    fn detach_body(&self, handle: BodyHandle);
}

/// Backend for worlds without a physics engine.
///
/// Hands out distinct handles and forgets them; useful for tools, tests,
/// and purely visual worlds.
#[derive(Debug, Default)]
pub struct NullPhysics {
    next: AtomicU64,
}

impl PhysicsBackend for NullPhysics {
    fn attach_body(&self, _shape: &CollisionShape, _origin: PixelCoord) -> BodyHandle {
        BodyHandle::from_raw(self.next.fetch_add(1, Ordering::Relaxed))
    }

    fn detach_body(&self, _handle: BodyHandle) {}
}
