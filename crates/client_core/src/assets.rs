//! Resolution of thumbnail and avatar references to displayable URLs.

use url::Url;

use crate::error::ClientResult;

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Clone)]
pub struct AssetResolver {
    storage_url: Url,
}

impl AssetResolver {
    pub fn new(storage_url: &str) -> ClientResult<Self> {
        let mut storage_url = Url::parse(storage_url.trim())?;
        if !storage_url.path().ends_with('/') {
            let path = format!("{}/", storage_url.path());
            storage_url.set_path(&path);
        }
        Ok(Self { storage_url })
    }

    /// `public/thumbs/a.png` → `<storage>/public/thumbs/a.png`. Absolute
    /// URLs are returned unchanged.
    pub fn resolve(&self, path: &str) -> String {
        if Url::parse(path).is_ok() {
            return path.to_string();
        }
        self.storage_url
            .join(path.trim_start_matches('/'))
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", self.storage_url, path.trim_start_matches('/')))
    }

    pub fn thumbnail(&self, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty()).map(|p| self.resolve(p))
    }

    /// The user's own avatar, or a generated initials avatar.
    pub fn avatar(&self, name: &str, avatar: Option<&str>) -> String {
        if let Some(avatar) = avatar.filter(|a| !a.is_empty()) {
            return self.resolve(avatar);
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("name", name)
            .append_pair("background", "1a237e")
            .append_pair("color", "fff")
            .finish();
        format!("{AVATAR_SERVICE}?{query}")
    }
}
