/*!
 * Host Runtime
 * Shared facilities the sandbox governs: namespace, event bus, timers,
 * render tree, network handles and window state
 */

pub mod events;
pub mod namespace;
pub mod network;
pub mod render;
pub mod timers;
pub mod window;

pub use events::{
    DomEvent, EventBus, EventHandler, KeyInput, ListenerOptions, ListenerTarget,
};
pub use namespace::{GlobalNamespace, NativeFn, NativeFunction, Slot};
pub use network::{ConnectionState, NetworkStatus, SocketInfo, SocketTable};
pub use render::{Element, ElementTree};
pub use timers::{EventLoopTimers, TimerCallback, TimerKind};
pub use window::{ForegroundState, WindowState};

/// Handles to every shared facility, cloned into the subsystems that govern them
#[derive(Clone, Default)]
pub struct HostRuntime {
    pub namespace: GlobalNamespace,
    pub events: EventBus,
    pub timers: EventLoopTimers,
    pub render: ElementTree,
    pub network: SocketTable,
    pub window: WindowState,
}

impl HostRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}
