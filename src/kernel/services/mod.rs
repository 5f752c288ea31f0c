//! Services layer (ports + adapters).
//!
//! - `ports`: contracts and data types the kernel speaks.
//! - `adapters`: OS/runtime specific implementations (IO/async).

pub mod adapters;
pub mod bus;
pub mod host;
pub mod ports;

pub use bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
pub use host::{KernelServiceContext, KernelServiceHost};
