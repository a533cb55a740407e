// Converters module - reshapes raw Argo CD records into the compact API format
//
// - argocd_to_api: Argo CD → exposed response records

pub mod argocd_to_api;

pub use argocd_to_api::{convert_application, convert_project};
