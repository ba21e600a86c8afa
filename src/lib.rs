/*!
# Overview
s3purge-rs empties versioned Amazon S3 buckets as a deployment-lifecycle
step, so infrastructure tooling that refuses to remove non-empty buckets can
tear them down or replace them.

## Features
- **Complete emptying**: Deletes every object version and delete marker,
  following the ListObjectVersions cursor chain to the end
- **Batched deletion**: Uses the S3 DeleteObjects API (up to 1000 objects per
  request), with all batches for a bucket issued concurrently
- **Independent buckets**: All confirmed, existing buckets are emptied
  concurrently; one bucket's failure never affects another
- **Lifecycle aware**: Pre-deploy, pre-removal, and on-demand phases draw
  from two independent bucket lists
- **Safety**: Optional per-bucket confirmation prompts and a reachability
  probe that skips stale configuration entries
- **Library-First**: The s3purge CLI is a thin wrapper over this library

## As a Library

```toml
[dependencies]
s3purge-rs = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
// use s3purge_rs::{Config, PurgePipeline, RunMode};
//
// #[tokio::main]
// async fn main() {
//     let config = Config::for_buckets(["my-stack-assets", "my-stack-logs"]);
//     let pipeline = PurgePipeline::new(config).await;
//     pipeline.run(RunMode::OnDemand).await.unwrap();
//
//     let stats = pipeline.stats();
//     println!("emptied {} buckets", stats.buckets_emptied);
// }
```
*/

pub mod config;
pub mod deleter;
pub mod lister;
pub mod pipeline;
pub mod resolver;
pub mod safety;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use config::args::CLIArgs;
pub use pipeline::PurgePipeline;
pub use types::error::{PurgeError, exit_code_from_error, is_invalid_config_error};
pub use types::{PurgeStats, RunMode};
