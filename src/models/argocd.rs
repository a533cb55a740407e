// Raw Argo CD API records
//
// Every field is optional; absent values are filled in by the converters.

use serde::Deserialize;

/// List envelope returned by Argo CD collection endpoints
///
/// Argo CD sends `"items": null` for empty collections.
#[derive(Debug, Deserialize)]
pub struct ItemList<T> {
    pub items: Option<Vec<T>>,
}

impl<T> ItemList<T> {
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

/// Kubernetes object metadata (only the fields we read)
#[derive(Debug, Default, Deserialize)]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

/// Argo CD Application
#[derive(Debug, Default, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub metadata: Option<ObjectMeta>,
    #[serde(default)]
    pub status: Option<AppStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppStatus {
    #[serde(default)]
    pub sync: Option<SyncStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncStatus {
    pub status: Option<String>,
}

/// Argo CD AppProject
#[derive(Debug, Default, Deserialize)]
pub struct AppProject {
    #[serde(default)]
    pub metadata: Option<ObjectMeta>,
}
