/// Stable identity of a player across sessions
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(transparent)]
#[serde(transparent)] // JSON = plain UUID string
pub struct UserId(pub uuid::Uuid);

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl UserId {
    #[inline]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle for an item type, handed out by the host's type registry.
/// Stable for the lifetime of the process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ItemTypeId(pub u32);

impl core::fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_are_unique_and_display_as_uuid() {
        let a = UserId::new();
        let b = UserId::default();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.0.to_string());
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn item_type_displays_with_hash() {
        assert_eq!(ItemTypeId(7).to_string(), "#7");
    }
}
