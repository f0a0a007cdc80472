//! Visual proxy abstraction
//!
//! The engine owns simulation state only. Whatever draws the board (a
//! canvas sprite layer, a terminal, nothing at all in tests) implements
//! `VisualProxies` and receives positions once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::BoardLayout;

/// Opaque handle to a host-side visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyHandle(pub u64);

/// Host-side factory and sink for ball visuals
pub trait VisualProxies {
    /// Create a visual for a new ball at `pos`
    fn create(&mut self, pos: Vec2) -> ProxyHandle;

    /// Move a visual to the ball's simulated position
    fn set_position(&mut self, handle: ProxyHandle, pos: Vec2);

    /// Destroy a visual (ball landed or was cleared)
    fn destroy(&mut self, handle: ProxyHandle);

    /// Static geometry changed; redraw pegs, slot lines and labels
    fn board_rebuilt(&mut self, _layout: &BoardLayout) {}

    /// Engine teardown; release anything still held
    fn release(&mut self) {}
}

impl<T: VisualProxies + ?Sized> VisualProxies for Box<T> {
    fn create(&mut self, pos: Vec2) -> ProxyHandle {
        (**self).create(pos)
    }

    fn set_position(&mut self, handle: ProxyHandle, pos: Vec2) {
        (**self).set_position(handle, pos)
    }

    fn destroy(&mut self, handle: ProxyHandle) {
        (**self).destroy(handle)
    }

    fn board_rebuilt(&mut self, layout: &BoardLayout) {
        (**self).board_rebuilt(layout)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Headless proxies: hands out sequential handles and draws nothing
#[derive(Debug, Default)]
pub struct NullProxies {
    next: u64,
}

impl VisualProxies for NullProxies {
    fn create(&mut self, _pos: Vec2) -> ProxyHandle {
        self.next += 1;
        ProxyHandle(self.next)
    }

    fn set_position(&mut self, _handle: ProxyHandle, _pos: Vec2) {}

    fn destroy(&mut self, _handle: ProxyHandle) {}
}

/// Handles for balls whose visual the host failed to create
///
/// They start above every integer a JS number can represent exactly, so
/// they never collide with a real host handle or with each other.
#[derive(Debug)]
pub struct DetachedHandles {
    next: u64,
}

impl DetachedHandles {
    const BASE: u64 = 1 << 53;

    pub fn new() -> Self {
        Self { next: Self::BASE }
    }

    pub fn next_handle(&mut self) -> ProxyHandle {
        let handle = ProxyHandle(self.next);
        self.next += 1;
        handle
    }

    /// True when `handle` has no host-side visual behind it
    pub fn is_detached(handle: ProxyHandle) -> bool {
        handle.0 >= Self::BASE
    }
}

impl Default for DetachedHandles {
    fn default() -> Self {
        Self::new()
    }
}

/// Push every live ball's position to its visual, once
pub fn sync_positions<'a, P, I>(proxies: &mut P, balls: I)
where
    P: VisualProxies + ?Sized,
    I: IntoIterator<Item = &'a crate::sim::Ball>,
{
    for ball in balls {
        proxies.set_position(ball.proxy, ball.pos);
    }
}
