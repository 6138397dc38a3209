use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use url::Url;

/// Prefix the emoji API uses for entries that point at another emoji.
pub const ALIAS_PREFIX: &str = "alias";

/// One custom emoji as reported by the source API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmojiRecord {
    /// Emoji short name, unique within a workspace.
    pub name: String,
    /// Image URL, or an `alias:<other>` marker.
    pub image_ref: String,
}

impl EmojiRecord {
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_ref: image_ref.into(),
        }
    }

    /// True when the reference points at another emoji instead of an image.
    ///
    /// Compares the first five bytes against `alias`, case-sensitively.
    pub fn is_alias(&self) -> bool {
        self.image_ref.as_bytes().starts_with(ALIAS_PREFIX.as_bytes())
    }

    /// True when this record has its own image and can be migrated.
    pub fn is_migratable(&self) -> bool {
        !self.image_ref.is_empty() && !self.is_alias()
    }

    /// Local file name for the image: the final path segment of the URL.
    ///
    /// Query string and fragment are not part of the name. Returns `None`
    /// when the reference has no usable final segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use emoji_mover_core::models::EmojiRecord;
    ///
    /// let record = EmojiRecord::new("parrot", "https://emoji.slack-edge.com/T01/parrot/abc123.gif?v=2");
    /// assert_eq!(record.file_name().as_deref(), Some("abc123.gif"));
    /// ```
    pub fn file_name(&self) -> Option<String> {
        let segment = match Url::parse(&self.image_ref) {
            Ok(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(str::to_string),
            Err(_) => self.image_ref.rsplit('/').next().map(str::to_string),
        }?;

        if segment.is_empty() || segment == "." || segment == ".." {
            None
        } else {
            Some(segment)
        }
    }
}

/// Emoji reported by the source workspace, keyed by name.
pub type Inventory = HashMap<String, EmojiRecord>;

/// Names never to migrate (platform defaults).
pub type ExclusionSet = HashSet<String>;

/// Names already present on the destination when the run started.
pub type ExistingSet = HashSet<String>;

/// Emoji to migrate in this run.
pub type WorkSet = Vec<EmojiRecord>;

/// Builds an [`Inventory`] from the raw name → reference mapping.
pub fn inventory_from_map(map: HashMap<String, String>) -> Inventory {
    map.into_iter()
        .map(|(name, image_ref)| {
            let record = EmojiRecord::new(name.clone(), image_ref);
            (name, record)
        })
        .collect()
}

/// An emoji whose image is available in the download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    pub name: String,
    pub path: PathBuf,
}
