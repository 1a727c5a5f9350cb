//! Control link and radio transports

pub mod radio;
pub mod serial;
pub mod tcp;
pub mod traits;

pub use radio::UdpRadio;
pub use serial::SerialConnector;
pub use tcp::TcpConnector;
pub use traits::{
    ControlConnector, ControlStream, ControlSurface, RadioError, RadioEvent, RadioLink,
};
