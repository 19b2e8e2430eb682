//! Format label normalization and media-type classification.
//!
//! The storefront labels its files loosely ("PDF (HD)", "Download", "EPUB").
//! [`FormatTag::normalize`] folds those labels into a closed set of canonical tags,
//! and [`is_video`] recovers video lessons that were filed under the ebook platform.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const PLATFORM_EBOOK: &str = "ebook";
pub const PLATFORM_VIDEO: &str = "video";

/// Wildcard accepted in the requested-format set.
pub const ALL_FORMATS: &str = "all";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatTag {
    Epub,
    Pdf,
    /// High-definition PDF, offered next to the regular one for comics and art books.
    PdfHd,
    Mobi,
    Cbz,
    Cbr,
    Mp3,
    Video,
    /// Generic "Download" label. The content can be anything, usually an archive.
    Download,
    /// Bonus material archive.
    Supplement,
    /// Any label not in the table above, lower-cased. Requesting it by name is
    /// rejected; such variants are only downloaded under `all`.
    Other(String),
}

impl FormatTag {
    /// Tags that are known to the normalizer, i.e. everything except `Other`.
    pub const KNOWN: [FormatTag; 10] = [
        FormatTag::Epub,
        FormatTag::Pdf,
        FormatTag::PdfHd,
        FormatTag::Mobi,
        FormatTag::Cbz,
        FormatTag::Cbr,
        FormatTag::Mp3,
        FormatTag::Video,
        FormatTag::Download,
        FormatTag::Supplement,
    ];

    pub fn normalize(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "epub" => Self::Epub,
            "pdf" => Self::Pdf,
            "pdf (hd)" | "pdf_hd" | "pdf hd" | "hd pdf" => Self::PdfHd,
            "mobi" | "kindle" => Self::Mobi,
            "cbz" => Self::Cbz,
            "cbr" => Self::Cbr,
            "mp3" => Self::Mp3,
            "video" => Self::Video,
            "download" => Self::Download,
            "supplement" => Self::Supplement,
            _ => Self::Other(label),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Epub => "epub",
            Self::Pdf => "pdf",
            Self::PdfHd => "pdf_hd",
            Self::Mobi => "mobi",
            Self::Cbz => "cbz",
            Self::Cbr => "cbr",
            Self::Mp3 => "mp3",
            Self::Video => "video",
            Self::Download => "download",
            Self::Supplement => "supplement",
            Self::Other(label) => label,
        }
    }

    /// Tags whose media type can only be told from the subproduct URL.
    pub fn is_ambiguous_container(&self) -> bool {
        matches!(self, Self::Download | Self::Supplement)
    }

    /// File extension, including the leading dot.
    pub fn extension(&self) -> String {
        match self {
            Self::PdfHd => ".hd.pdf".to_string(),
            Self::Download | Self::Supplement => ".zip".to_string(),
            Self::Video => ".mp4".to_string(),
            other => format!(".{}", other.as_str()),
        }
    }
}

impl Display for FormatTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested format as given by the operator: either the wildcard or a known tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RequestedFormat {
    All,
    Tag(FormatTag),
}

impl FromStr for RequestedFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case(ALL_FORMATS) {
            return Ok(Self::All);
        }
        match FormatTag::normalize(value) {
            FormatTag::Other(label) => Err(format!(
                "unrecognized format '{label}', expected one of: {ALL_FORMATS}, {}",
                FormatTag::KNOWN.iter().map(FormatTag::as_str).collect::<Vec<_>>().join(", ")
            )),
            tag => Ok(Self::Tag(tag)),
        }
    }
}

/// Set of formats an operator asked for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatSelection {
    formats: Vec<RequestedFormat>,
}

impl FormatSelection {
    pub fn all() -> Self {
        Self {
            formats: vec![RequestedFormat::All],
        }
    }

    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self, String> {
        let mut formats = Vec::new();
        for value in values {
            let format = value.as_ref().parse::<RequestedFormat>()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(Self { formats })
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.formats.contains(&RequestedFormat::All)
    }

    pub fn admits(&self, tag: &FormatTag) -> bool {
        self.formats.iter().any(|format| match format {
            RequestedFormat::All => true,
            RequestedFormat::Tag(requested) => requested == tag,
        })
    }
}

/// Whether a variant is really a video.
///
/// The video platform always is. Ambiguous containers count as video when any
/// slash-delimited segment of the subproduct URL ends with "video", which catches
/// lessons like `https://.../intro-to-x-video/123` shelved under the ebook platform.
pub fn is_video(platform: &str, tag: &FormatTag, subproduct_url: Option<&str>) -> bool {
    if platform == PLATFORM_VIDEO {
        return true;
    }
    tag.is_ambiguous_container()
        && subproduct_url.is_some_and(|url| url.split('/').any(|segment| segment.ends_with("video")))
}

/// Canonical tag of a variant: the normalized label, replaced by `Video` when the
/// variant classifies as video.
pub fn canonical_tag(label: &str, platform: &str, subproduct_url: Option<&str>) -> FormatTag {
    let tag = FormatTag::normalize(label);
    if is_video(platform, &tag, subproduct_url) {
        FormatTag::Video
    } else {
        tag
    }
}
