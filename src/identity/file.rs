//! Identity provider backed by a JSON file in the data directory

use super::{validate_principal, AuthError, Identity, IdentityProvider, LoginOptions};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct FileIdentityProvider {
    path: PathBuf,
    current: RwLock<Option<Identity>>,
}

impl FileIdentityProvider {
    /// Open the provider, restoring any identity persisted by a previous run.
    ///
    /// A missing or unreadable file means logged out.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = load(&path).await;
        if let Some(identity) = &current {
            tracing::info!(principal = %identity.principal, "Restored persisted identity");
        }
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    async fn persist(&self, identity: &Identity) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(identity)
            .map_err(|e| AuthError::Storage(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        // Write then rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn load(path: &Path) -> Option<Identity> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read identity file");
            return None;
        }
    };

    match serde_json::from_slice::<Identity>(&bytes) {
        Ok(identity) if validate_principal(&identity.principal).is_ok() => Some(identity),
        Ok(identity) => {
            tracing::warn!(principal = %identity.principal, "Ignoring persisted identity with invalid principal");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt identity file");
            None
        }
    }
}

#[async_trait]
impl IdentityProvider for FileIdentityProvider {
    async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    async fn identity(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    async fn login(&self, options: &LoginOptions) -> Result<Identity, AuthError> {
        let principal = validate_principal(&options.credential)?;
        let identity = Identity::new(principal);

        self.persist(&identity).await?;
        *self.current.write().await = Some(identity.clone());

        tracing::info!(
            principal = %identity.principal,
            identity_provider = %options.identity_provider,
            "Login succeeded"
        );
        Ok(identity)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        // Forget in memory first; a failed delete still ends this process's login
        let previous = self.current.write().await.take();

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(identity) = previous {
            tracing::info!(principal = %identity.principal, "Logged out");
        }
        Ok(())
    }
}
