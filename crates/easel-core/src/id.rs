//! Component identifiers.
//!
//! Ids are interned so lifecycle logs and error messages can carry them by
//! value. Authored ids come from configuration; the rest are generated from
//! the component kind.

use lasso::{Spur, ThreadedRodeo};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);
static GENERATED: AtomicU64 = AtomicU64::new(0);

/// Interned name of one component instance. Displayed as `@name`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(Spur);

impl ComponentId {
    pub fn intern(name: &str) -> Self {
        Self(NAMES.get_or_intern(name))
    }

    /// Checked form of [`intern`](Self::intern) for authored ids: the name
    /// must be non-empty and free of whitespace.
    pub fn parse(name: &str) -> Result<Self, String> {
        if name.is_empty() {
            return Err("component id is empty".to_string());
        }
        if name.chars().any(char::is_whitespace) {
            return Err(format!("component id `{name}` contains whitespace"));
        }
        Ok(Self::intern(name))
    }

    pub fn as_str(&self) -> &'static str {
        NAMES.resolve(&self.0)
    }

    /// A fresh id of the form `{prefix}_{n}`, unique for the process.
    pub fn with_prefix(prefix: &str) -> Self {
        let n = GENERATED.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.as_str())
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// Serialized as the bare name, without the `@`.
impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).map_err(D::Error::custom)
    }
}
