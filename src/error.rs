use thiserror::Error;

/// Fatal errors that abort a stage before any network work is done.
///
/// Transport failures, empty search results and single-record update
/// failures are deliberately not represented here: those are absorbed into
/// the per-item outcomes of each stage summary so the batch keeps going.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The credential is unset, empty, or still the template placeholder.
    #[error("missing or placeholder credential: {0}")]
    MissingCredential(&'static str),

    #[error("unknown series slug: '{0}'")]
    UnknownSeries(String),

    #[error("failed to connect to the catalog database: {0}")]
    CatalogConnect(#[source] sqlx::Error),
}
