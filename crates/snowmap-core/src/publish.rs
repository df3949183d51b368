// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use log::{debug, info};
use serde::Serialize;
use ssh2::Session;
use std::fs::File;
use std::io;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SSH_PORT: u16 = 22;
const SESSION_TIMEOUT_MS: u32 = 30_000;
const REMOTE_FILE_MODE: i32 = 0o644;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: '{value}'")]
    InvalidVar { var: &'static str, value: String },
    #[error("failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    #[error("local file not found: {0}")]
    LocalFileMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),
    #[error("authentication failed for user {0}")]
    AuthFailed(String),
}

/// Remote target for the generated map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub key_path: Option<PathBuf>,
    /// Destination directory on the remote host.
    pub remote_dir: String,
}

impl PublishConfig {
    /// Reads the target from the process environment.
    pub fn from_env() -> Result<Self, PublishError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `TARGET_HOST`, `TARGET_PORT`, `SSH_USER`, `SSH_PASSWORD`,
    /// `SSH_KEY_PATH` and `REMOTE_DEST_PATH` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PublishError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(PublishError::MissingVar(key));

        let port = match get("TARGET_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| PublishError::InvalidVar {
                var: "TARGET_PORT",
                value: raw,
            })?,
            None => DEFAULT_SSH_PORT,
        };

        Ok(Self {
            host: required("TARGET_HOST")?,
            port,
            user: required("SSH_USER")?,
            password: get("SSH_PASSWORD"),
            key_path: get("SSH_KEY_PATH").map(PathBuf::from),
            remote_dir: required("REMOTE_DEST_PATH")?,
        })
    }

    /// Remote destination for `local`: the remote directory joined with the
    /// local file name.
    pub fn remote_path_for(&self, local: &Path) -> String {
        let file_name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = self.remote_dir.trim_end_matches('/');
        if dir.is_empty() && self.remote_dir.starts_with('/') {
            format!("/{}", file_name)
        } else if dir.is_empty() {
            file_name
        } else {
            format!("{}/{}", dir, file_name)
        }
    }
}

/// Loads `KEY=value` lines from `path`, or from `.env` in the working
/// directory (or a parent) when no path is given. A missing default file is
/// not an error.
pub fn load_env_file(path: Option<&Path>) -> Result<(), PublishError> {
    match path {
        Some(p) => {
            dotenvy::from_path(p)?;
            debug!("Loaded env file — path={}", p.display());
        }
        None => match dotenvy::dotenv() {
            Ok(p) => debug!("Loaded env file — path={}", p.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

/// Copies `local` to the remote host over SCP, overwriting any existing file.
/// No retries: the copy either succeeds or returns the first error.
pub fn publish_file(local: &Path, config: &PublishConfig) -> Result<(), PublishError> {
    if !local.is_file() {
        return Err(PublishError::LocalFileMissing(local.to_path_buf()));
    }

    info!("Connecting — host={} port={}", config.host, config.port);
    let tcp = TcpStream::connect((config.host.as_str(), config.port))?;
    let mut session = Session::new()?;
    session.set_timeout(SESSION_TIMEOUT_MS);
    session.set_tcp_stream(tcp);
    session.handshake()?;

    if let Some(hash) = session.host_key_hash(ssh2::HashType::Sha256) {
        debug!("Host key — sha256={}", hex_string(hash));
    }

    authenticate(&session, config)?;

    let remote_path = config.remote_path_for(local);
    let mut file = File::open(local)?;
    let size = file.metadata()?.len();

    info!(
        "Uploading — file={} remote={} bytes={}",
        local.display(),
        remote_path,
        size
    );
    let mut channel = session.scp_send(Path::new(&remote_path), REMOTE_FILE_MODE, size, None)?;
    io::copy(&mut file, &mut channel)?;
    channel.send_eof()?;
    channel.wait_eof()?;
    channel.close()?;
    channel.wait_close()?;

    info!("Upload complete — remote={}", remote_path);
    Ok(())
}

fn authenticate(session: &Session, config: &PublishConfig) -> Result<(), PublishError> {
    let user = config.user.as_str();

    if let Some(key) = &config.key_path {
        debug!("Authenticating with key — user={} key={}", user, key.display());
        session.userauth_pubkey_file(user, None, key, None)?;
    } else if let Some(password) = &config.password {
        debug!("Authenticating with password — user={}", user);
        session.userauth_password(user, password)?;
    } else {
        debug!("Authenticating with ssh-agent — user={}", user);
        session.userauth_agent(user)?;
    }

    if session.authenticated() {
        Ok(())
    } else {
        Err(PublishError::AuthFailed(user.to_string()))
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
