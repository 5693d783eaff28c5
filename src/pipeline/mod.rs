// Batch pipeline stages. Each stage is idempotent against its target
// (filesystem, bucket, catalog) and keeps going past per-item failures;
// the retry unit is "re-run the whole batch".

pub mod download;
pub mod sync;
pub mod upload;
