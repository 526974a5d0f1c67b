//! # Wardrobe
//!
//! Service facade over the rendition pipeline and the store. An upload is
//! decoded, matted and classified concurrently on the blocking pool, then both
//! renditions are filed under the classified category:
//!
//! ```text
//! bytes -> decode -> stage temp file -+-> matting -> shadow -> {opaque, transparent}
//!                                     +-> classify -> category
//!                                         -> place under <category>/ -> drop temp file
//! ```
//!
//! Every boundary operation is also reachable through [`WardrobeCommand`],
//! a serializable command enum used by the CLI and by scripts.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rendition::{FixedClassifier, RenditionGenerator};
//! use wardrobe::{Wardrobe, WardrobeCommand};
//!
//! # async fn run() -> wardrobe_common::Result<()> {
//! let wardrobe = Wardrobe::new(
//!     "static",
//!     RenditionGenerator::builder().build(),
//!     Arc::new(FixedClassifier::new("shortsleeve")),
//! );
//!
//! let upload = wardrobe.process_file("shirt.jpg").await?;
//! wardrobe.add_item(&upload.opaque_url, &upload.category, "black")?;
//! wardrobe.execute(WardrobeCommand::ListOutfits).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod service;

pub use command::{CommandOutput, WardrobeCommand};
pub use service::{DeletedImage, Wardrobe};
