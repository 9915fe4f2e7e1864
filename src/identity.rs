//! Caller identity used to attribute log entries
//!
//! Entries are tagged `domain\user`. Local accounts (domain equal to the machine name)
//! render with `.` as the domain, matching the Windows local-account convention.

use std::fmt;

/// Domain and user of the account writing a log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub domain: String,
    pub user: String,
}

impl Identity {
    /// Build an identity, normalizing `domain` to `.` when it names the local machine
    pub fn new(domain: impl Into<String>, user: impl Into<String>, machine: &str) -> Self {
        let domain = domain.into();
        let domain = if !machine.is_empty() && domain.eq_ignore_ascii_case(machine) {
            ".".to_string()
        } else {
            domain
        };
        Self {
            domain,
            user: user.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.domain, self.user)
    }
}

/// Source of the identity attached to each entry
pub trait IdentityProvider {
    fn identity(&self) -> Identity;
}

/// Reads the identity from the process environment on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn identity(&self) -> Identity {
        let machine = machine_name();
        let user = env_first(&["USERNAME", "USER", "LOGNAME"]).unwrap_or_else(|| "unknown".into());
        let domain = env_first(&["USERDOMAIN"]).unwrap_or_else(|| machine.clone());
        Identity::new(domain, user, &machine)
    }
}

/// Fixed identity, for tests and for callers that attribute entries themselves
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub Identity);

impl FixedIdentity {
    pub fn new(domain: &str, user: &str) -> Self {
        Self(Identity {
            domain: domain.to_string(),
            user: user.to_string(),
        })
    }
}

impl IdentityProvider for FixedIdentity {
    fn identity(&self) -> Identity {
        self.0.clone()
    }
}

fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| std::env::var(k).ok())
        .find(|v| !v.is_empty())
}

/// Name of the local machine
pub fn machine_name() -> String {
    if let Some(name) = env_first(&["COMPUTERNAME"]) {
        return name;
    }
    os_hostname().unwrap_or_default()
}

#[cfg(unix)]
fn os_hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY: buf is valid for buf.len() bytes; gethostname NUL-terminates on success
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..end]).into_owned();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(unix))]
fn os_hostname() -> Option<String> {
    None
}
