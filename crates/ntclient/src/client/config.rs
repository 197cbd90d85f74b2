// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Configuration defaulting: server address and client identity.

/// Identity advertised when neither the embedder nor the OS provides
/// one. Servers key on identity strings across sessions, so this exact
/// literal is load-bearing.
pub(crate) const FALLBACK_IDENTITY: &str = "networktables-go";

/// Resolve the configured address into a dialable `host:port`. Empty
/// means the default port on the local host, as does a bare `:port`.
pub(crate) fn dial_addr(addr: &str) -> String {
    let addr = if addr.is_empty() {
        crate::DEFAULT_ADDR
    } else {
        addr
    };

    match addr.strip_prefix(':') {
        Some(port) => format!("127.0.0.1:{}", port),
        None => addr.to_string(),
    }
}

/// Resolve the advertised identity: configured string, else host name,
/// else the back-compat literal.
pub(crate) fn resolve_identity(identity: &str) -> String {
    if !identity.is_empty() {
        return identity.to_string();
    }

    hostname().unwrap_or_else(|| FALLBACK_IDENTITY.to_string())
}

#[cfg(unix)]
fn hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY:
    // - buf is a valid mutable buffer of known size
    // - gethostname writes at most buf.len() bytes including the NUL
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if ret != 0 {
        return None;
    }

    // SAFETY: gethostname succeeded, so buf holds a NUL-terminated
    // string; we copy it out immediately.
    let name = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr() as *const libc::c_char) }
        .to_string_lossy()
        .into_owned();

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(windows)]
fn hostname() -> Option<String> {
    let name = std::env::var("COMPUTERNAME").ok()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(not(any(unix, windows)))]
fn hostname() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_addr_defaults_to_local_1735() {
        assert_eq!(dial_addr(""), "127.0.0.1:1735");
    }

    #[test]
    fn bare_port_dials_the_local_host() {
        assert_eq!(dial_addr(":4040"), "127.0.0.1:4040");
    }

    #[test]
    fn full_addr_passes_through() {
        assert_eq!(dial_addr("10.0.0.2:1735"), "10.0.0.2:1735");
    }

    #[test]
    fn configured_identity_wins() {
        assert_eq!(resolve_identity("vision"), "vision");
    }

    #[test]
    fn derived_identity_is_never_empty() {
        // Host name when available, the back-compat literal otherwise.
        assert!(!resolve_identity("").is_empty());
    }
}
