//! Concrete byte sources

pub mod replay;
pub mod tcp;

pub use replay::ReplaySource;
pub use tcp::TcpSource;
