// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tokio-based file reading for awsnano.
//!
//! `TokioFileRead` implements `FileRead` from `awsnano_core` with
//! `tokio::fs`, which is what `Config::from_profile` needs to read
//! `~/.aws/config` and `~/.aws/credentials`.
//!
//! ## Example
//!
//! ```no_run
//! use awsnano_core::{Config, Context, OsEnv};
//! use awsnano_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() -> awsnano_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     let config = Config::load(&ctx).await?;
//!     println!("signing for region {}", config.region());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use awsnano_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to read file {path}")).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        tokio::fs::write(&path, "[default]\nregion = eu-west-1\n")
            .await
            .unwrap();

        let content = TokioFileRead
            .file_read(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(content, b"[default]\nregion = eu-west-1\n");

        let err = TokioFileRead
            .file_read(dir.path().join("missing").to_str().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), awsnano_core::ErrorKind::Unexpected);
    }
}
