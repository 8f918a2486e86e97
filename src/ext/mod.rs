mod async_conversion;
mod host_path_ext;

pub use async_conversion::{AsyncTryFrom, AsyncTryInto};
pub use host_path_ext::HostPathExt;
