use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex};

static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Next counter value per kind prefix.
static COUNTERS: LazyLock<Mutex<HashMap<String, u64>>> = LazyLock::new(Default::default);

/// Interned name of one object in the scene.
///
/// Copying and comparing is a 4-byte `Spur` operation. Names are kept
/// verbatim across snapshot capture and restore, so undo brings objects
/// back under the name they had.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

impl ObjectId {
    pub fn intern(s: &str) -> Self {
        ObjectId(NAMES.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        NAMES.resolve(&self.0)
    }

    /// Id for a restored record that carried none.
    pub fn anonymous() -> Self {
        Self::with_prefix("object")
    }

    /// A fresh `<prefix>_<n>` id.
    ///
    /// Names already interned are skipped, so an id taken from a restored
    /// or hand-written snapshot is never handed out a second time.
    pub fn with_prefix(prefix: &str) -> Self {
        let mut counters = match COUNTERS.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = counters.entry(prefix.to_string()).or_insert(0);
        loop {
            let candidate = format!("{prefix}_{next}");
            *next += 1;
            if NAMES.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }

    /// The part before the trailing `_<n>` counter, if any.
    pub fn prefix(&self) -> &str {
        let name = self.as_str();
        match name.rsplit_once('_') {
            Some((head, tail)) if !head.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
                head
            }
            _ => name,
        }
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ObjectId::intern(&s))
    }
}
