// ─── OpenMRS SDK Server Core ───
// Persisted configuration of SDK-managed OpenMRS servers.
//
// Architecture:
//   core/
//     maven/      — Artifact identity, filename classifier, version parsing
//     project.rs  — Watched source project references
//     properties/ — `.properties` file format + delimited-list codec
//     server/     — Server configuration store + servers root manager
//     error.rs    — Error taxonomy

pub mod error;
pub mod maven;
pub mod project;
pub mod properties;
pub mod server;
