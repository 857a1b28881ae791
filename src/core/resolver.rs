//! Host name and newline lookups
//!
//! Formatters never call the platform directly; they go through
//! [`ResolverFacade`] so tests can substitute fixed values.

use parking_lot::RwLock;
use std::net::ToSocketAddrs;

/// Platform information consumed by the formatters
pub trait ResolverFacade: Send + Sync {
    /// Local host name, or `None` when neither lookup mechanism works
    fn local_host_name(&self) -> Option<String>;

    /// Newline sequence of the platform, constant for the process lifetime
    fn new_line(&self) -> &'static str {
        platform_new_line()
    }
}

#[cfg(windows)]
pub const fn platform_new_line() -> &'static str {
    "\r\n"
}

#[cfg(not(windows))]
pub const fn platform_new_line() -> &'static str {
    "\n"
}

/// Resolver backed by the operating system
///
/// The host name is looked up with `gethostname(2)` first. When that fails
/// the `HOSTNAME` / `COMPUTERNAME` environment value is used, but only if the
/// system resolver can resolve it. A successful lookup is cached.
#[derive(Debug, Default)]
pub struct SystemResolver {
    cached: RwLock<Option<String>>,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(unix)]
    fn primary_host_name() -> Option<String> {
        match nix::unistd::gethostname() {
            Ok(name) => name.into_string().ok().filter(|n| !n.trim().is_empty()),
            Err(e) => {
                eprintln!("[LOGGER WARNING] gethostname failed: {}", e);
                None
            }
        }
    }

    #[cfg(not(unix))]
    fn primary_host_name() -> Option<String> {
        None
    }

    fn fallback_host_name() -> Option<String> {
        let name = ["HOSTNAME", "COMPUTERNAME"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())?;

        // Only trust the name when DNS knows about it
        let resolvable = (name.as_str(), 0)
            .to_socket_addrs()
            .map(|mut addrs| addrs.next().is_some())
            .unwrap_or(false);

        resolvable.then_some(name)
    }
}

impl ResolverFacade for SystemResolver {
    fn local_host_name(&self) -> Option<String> {
        if let Some(name) = self.cached.read().as_ref() {
            return Some(name.clone());
        }

        let name = Self::primary_host_name().or_else(Self::fallback_host_name)?;
        *self.cached.write() = Some(name.clone());
        Some(name)
    }
}

/// Resolver returning fixed values
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    host_name: Option<String>,
}

impl StaticResolver {
    pub fn new(host_name: Option<String>) -> Self {
        Self { host_name }
    }
}

impl ResolverFacade for StaticResolver {
    fn local_host_name(&self) -> Option<String> {
        self.host_name.clone()
    }
}
