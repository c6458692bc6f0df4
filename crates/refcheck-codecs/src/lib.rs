//! Concrete codecs for refcheck references.
//!
//! | Kind  | Extension            | Codec              | On disk                    |
//! |-------|----------------------|--------------------|----------------------------|
//! | Hash  | `sha256`             | [`HashCodec`]      | hex SHA-256 + newline      |
//! | Hash  | `blake3`, `hash`     | [`HashCodec`]      | hex BLAKE3 + newline       |
//! | Image | `png`                | [`PngCodec`]       | RGBA8 PNG                  |
//! | Image | anything else        | [`TextImageCodec`] | character-ramp rendering   |
//! | Text  | anything             | [`TextCodec`]      | natural text, UTF-8        |

pub mod canonical;
pub mod hash;
pub mod png;
pub mod text;
pub mod text_image;

pub use hash::{canonical_digest, HashCodec};
pub use self::png::{PngCodec, PngConfig};
pub use text::TextCodec;
pub use text_image::TextImageCodec;

use refcheck_core::{CodecRegistry, ContentKind};

/// Extensions of SHA-256 hash references.
pub const SHA256_EXTENSIONS: &[&str] = &["sha256"];

/// Extensions of BLAKE3 hash references.
pub const BLAKE3_EXTENSIONS: &[&str] = &["blake3", "hash"];

/// A registry with every codec in this crate.
pub fn default_registry() -> CodecRegistry {
    CodecRegistry::new()
        .with(ContentKind::Text, &[], TextCodec)
        .with(ContentKind::Image, &[], TextImageCodec::new())
        .with(ContentKind::Image, &["png"], PngCodec::default())
        .with(ContentKind::Hash, SHA256_EXTENSIONS, HashCodec::sha256())
        .with(ContentKind::Hash, BLAKE3_EXTENSIONS, HashCodec::blake3())
}
