mod client;
mod remote;
mod retry;
mod stub;

pub use client::*;
pub use remote::RemoteStore;
pub use retry::RetryConfig;
pub use stub::StubStore;
