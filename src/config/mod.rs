#[allow(clippy::module_inception)]
mod config;

pub use self::config::{
    builtin_chains, CacheSettings, ChainSettings, ProtocolSettings, RpcSettings, ServerSettings,
    Settings,
};
