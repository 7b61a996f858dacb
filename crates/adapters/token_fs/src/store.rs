//! File implementation of [`TokenStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use plugdash_app::ports::TokenStore;
use plugdash_domain::error::PlugDashError;
use plugdash_domain::user::AccessToken;

use crate::error::TokenStoreError;

/// Stores the token as JSON at a fixed path.
///
/// A file holding only the raw token string is also accepted on load.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse(raw: &str) -> Option<AccessToken> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<AccessToken>(raw) {
        Ok(token) => Some(token),
        Err(_) if !raw.starts_with('{') => Some(AccessToken::bearer(raw)),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable token file");
            None
        }
    }
}

async fn write_private(path: &Path, contents: Vec<u8>) -> Result<(), TokenStoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> impl Future<Output = Result<Option<AccessToken>, PlugDashError>> + Send {
        let path = self.path.clone();
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(raw) => Ok(parse(&raw)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(TokenStoreError::from(err).into()),
            }
        }
    }

    fn save(&self, token: &AccessToken) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        let path = self.path.clone();
        let encoded = serde_json::to_vec(token);
        async move {
            let encoded = encoded.map_err(TokenStoreError::from)?;
            write_private(&path, encoded).await?;
            tracing::debug!(path = %path.display(), "token saved");
            Ok(())
        }
    }

    fn clear(&self) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        let path = self.path.clone();
        async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(TokenStoreError::from(err).into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileTokenStore {
        FileTokenStore::new(dir.path().join("nested").join("token.json"))
    }

    #[tokio::test]
    async fn should_return_none_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_load_saved_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&AccessToken::bearer("abc")).await.unwrap();

        let loaded = FileTokenStore::new(store.path()).load().await.unwrap();
        assert_eq!(loaded, Some(AccessToken::bearer("abc")));
    }

    #[tokio::test]
    async fn should_accept_raw_token_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "abc.def.ghi\n").unwrap();

        let loaded = FileTokenStore::new(&path).load().await.unwrap();
        assert_eq!(loaded.map(|t| t.access_token), Some("abc.def.ghi".to_string()));
    }

    #[tokio::test]
    async fn should_ignore_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{\"access_tok").unwrap();

        assert_eq!(FileTokenStore::new(&path).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_remove_file_on_clear_and_tolerate_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&AccessToken::bearer("abc")).await.unwrap();

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn should_restrict_token_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&AccessToken::bearer("abc")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
