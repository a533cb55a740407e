// Data models for the upstream and exposed API formats

pub mod api;
pub mod argocd;
