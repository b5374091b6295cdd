//! Stand-in for the runtime that owns loaded maps.
//!
//! The exporter never holds map references across ticks; it looks maps up
//! here by handle when a job is processed, so maps loaded or unloaded
//! between enqueue and render are handled gracefully.

use crate::queue::MapHandle;
use crate::types::TileMap;

/// Owned collection of loaded maps plus an optional "current" map.
#[derive(Debug, Default)]
pub struct Host {
    maps: Vec<TileMap>,
    current: Option<String>,
}

impl Host {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a loaded map. The first map inserted becomes current.
    pub fn insert(&mut self, map: TileMap) {
        if self.current.is_none() {
            self.current = Some(map.name.clone());
        }
        self.maps.push(map);
    }

    /// Unload a map by name. Clears "current" if it pointed at it.
    pub fn remove(&mut self, name: &str) -> Option<TileMap> {
        let idx = self.maps.iter().position(|m| m.name == name)?;
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        Some(self.maps.remove(idx))
    }

    /// Look up a map by display name or unique name.
    pub fn get(&self, name: &str) -> Option<&TileMap> {
        self.maps
            .iter()
            .find(|m| m.name == name || m.unique_name.as_deref() == Some(name))
    }

    /// Mark a loaded map as current. Returns false for unknown names.
    pub fn set_current(&mut self, name: &str) -> bool {
        match self.get(name) {
            Some(map) => {
                self.current = Some(map.name.clone());
                true
            }
            None => false,
        }
    }

    /// The current map, if one is set and still loaded.
    pub fn current(&self) -> Option<&TileMap> {
        self.current.as_deref().and_then(|name| self.get(name))
    }

    /// Mint a queueable handle for a map.
    pub fn handle_for(&self, map: &TileMap) -> MapHandle {
        MapHandle::new(map.name.clone())
    }

    /// Handles for every loaded map, in load order.
    ///
    /// This is a snapshot: maps unloaded afterwards make their handles
    /// stale, which render-time resolution reports per job.
    pub fn handles(&self) -> Vec<MapHandle> {
        self.maps.iter().map(|m| self.handle_for(m)).collect()
    }

    /// Display names of every loaded map, in load order.
    pub fn names(&self) -> Vec<String> {
        self.maps.iter().map(|m| m.name.clone()).collect()
    }

    /// Number of loaded maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Check whether no maps are loaded.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(name: &str) -> TileMap {
        TileMap::new(name, 2, 2, 16, 16)
    }

    #[test]
    fn test_first_insert_becomes_current() {
        let mut host = Host::new();
        host.insert(map("Farm"));
        host.insert(map("Town"));

        assert_eq!(host.current().unwrap().name, "Farm");
    }

    #[test]
    fn test_get_by_unique_name() {
        let mut host = Host::new();
        host.insert(map("Farm").with_unique_name("Farm_Riverland"));

        assert!(host.get("Farm").is_some());
        assert!(host.get("Farm_Riverland").is_some());
        assert!(host.get("Desert").is_none());
    }

    #[test]
    fn test_set_current() {
        let mut host = Host::new();
        host.insert(map("Farm"));
        host.insert(map("Town"));

        assert!(host.set_current("Town"));
        assert_eq!(host.current().unwrap().name, "Town");
        assert!(!host.set_current("Desert"));
    }

    #[test]
    fn test_remove_clears_current() {
        let mut host = Host::new();
        host.insert(map("Farm"));

        assert!(host.remove("Farm").is_some());
        assert!(host.current().is_none());
        assert!(host.is_empty());
        assert!(host.remove("Farm").is_none());
    }

    #[test]
    fn test_handles_snapshot() {
        let mut host = Host::new();
        host.insert(map("Farm"));
        host.insert(map("Town"));

        let handles = host.handles();
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0].name(), "Farm");

        // Unloading afterwards does not touch the snapshot.
        host.remove("Farm");
        assert_eq!(handles[0].name(), "Farm");
        assert!(host.get(handles[0].name()).is_none());
    }

    #[test]
    fn test_names_in_load_order() {
        let mut host = Host::new();
        host.insert(map("Town"));
        host.insert(map("Beach"));

        assert_eq!(host.names(), vec!["Town", "Beach"]);
    }
}
