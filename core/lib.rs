/*!
This crate turns the raw prediction artifacts written by automated modeling runs into normalized score records, and accumulates those records in an append-only ledger that can be reloaded and merged across runs.

The pieces, leaves first:

- [`results`](results/index.html) interprets a loaded predictions table as a classification or regression result and computes named metrics with per-metric failure isolation.
- [`identity`](identity/index.html) derives task, framework, benchmark, constraint and fold identity from file naming conventions.
- [`task`](task/index.html) orchestrates one (task, fold, constraint) triple: it loads the predictions and metadata artifacts, scores them, and emits one [`ScoreRecord`](scoreboard/struct.ScoreRecord.html).
- [`scoreboard`](scoreboard/index.html) stores, reloads, deduplicates and schema-migrates the accumulated records.
*/

pub mod config;
pub mod identity;
pub mod metadata;
pub mod predictions;
pub mod results;
pub mod scoreboard;
pub mod task;
