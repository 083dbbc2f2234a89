//! Mapping archive paths to storage categories.
//!
//! Rules are evaluated in order and the first match wins, so a media image
//! that also happens to sit under a fonts-looking path is still an image.

use serde::{Serialize, Serializer};
use std::fmt;

/// Storage category of an archive entry, declared in rule priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Images,
    Video,
    Audio,
    OtherMedia,
    EmbeddedFonts,
    Slides,
    Embeds,
    Structure,
}

impl Category {
    pub const COUNT: usize = 8;

    pub const ALL: [Category; Self::COUNT] = [
        Category::Images,
        Category::Video,
        Category::Audio,
        Category::OtherMedia,
        Category::EmbeddedFonts,
        Category::Slides,
        Category::Embeds,
        Category::Structure,
    ];

    /// Order of the breakdown when totals are equal; Other Media goes last.
    pub const DISPLAY_ORDER: [Category; Self::COUNT] = [
        Category::Images,
        Category::Video,
        Category::Audio,
        Category::EmbeddedFonts,
        Category::Slides,
        Category::Embeds,
        Category::Structure,
        Category::OtherMedia,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Video => "Video",
            Category::Audio => "Audio",
            Category::OtherMedia => "Other Media",
            Category::EmbeddedFonts => "Embedded Fonts",
            Category::Slides => "Slides (XML)",
            Category::Embeds => "Excel/Object Embeds",
            Category::Structure => "Structure/XML",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

const MEDIA_DIR: &str = "ppt/media/";
const FONTS_DIR: &str = "ppt/fonts/";
const SLIDES_DIR: &str = "ppt/slides/";
const EMBEDDINGS_DIR: &str = "ppt/embeddings/";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "tiff", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "m4v"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// True when `dir` occurs anywhere in `path` with something after it.
pub fn is_under(path: &str, dir: &str) -> bool {
    path.find(dir)
        .is_some_and(|start| start + dir.len() < path.len())
}

/// True when `path` ends in `.ext` for one of `extensions`, ignoring ASCII case.
pub fn has_extension(path: &str, extensions: &[&str]) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn is_media_image(path: &str) -> bool {
    is_under(path, MEDIA_DIR) && has_extension(path, IMAGE_EXTENSIONS)
}

fn is_media_video(path: &str) -> bool {
    is_under(path, MEDIA_DIR) && has_extension(path, VIDEO_EXTENSIONS)
}

fn is_media_audio(path: &str) -> bool {
    is_under(path, MEDIA_DIR) && has_extension(path, AUDIO_EXTENSIONS)
}

fn is_media(path: &str) -> bool {
    is_under(path, MEDIA_DIR)
}

fn is_font(path: &str) -> bool {
    is_under(path, FONTS_DIR)
}

fn is_slide(path: &str) -> bool {
    is_under(path, SLIDES_DIR)
}

fn is_embedding(path: &str) -> bool {
    is_under(path, EMBEDDINGS_DIR)
}

type Rule = (fn(&str) -> bool, Category);

/// Ordered rule table; anything unmatched is [`Category::Structure`].
const RULES: &[Rule] = &[
    (is_media_image, Category::Images),
    (is_media_video, Category::Video),
    (is_media_audio, Category::Audio),
    (is_media, Category::OtherMedia),
    (is_font, Category::EmbeddedFonts),
    (is_slide, Category::Slides),
    (is_embedding, Category::Embeds),
];

/// Categorize an archive entry path.
pub fn categorize(path: &str) -> Category {
    RULES
        .iter()
        .find(|(matches, _)| matches(path))
        .map_or(Category::Structure, |&(_, category)| category)
}
