use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::debug;
use wardrobe_common::{CatalogEntry, OutfitBundle, OutfitPairing, ProcessedUpload, Result, SavedOutfit};

use crate::service::{DeletedImage, Wardrobe};

#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WardrobeCommand {
    /// Generate and store both renditions of an image file
    ProcessImage {
        path: String,
    },
    /// Delete an uploaded image and its catalog rows
    DeleteImage {
        image_url: String,
    },
    /// Record an item in the catalog
    AddItem {
        image_url: String,
        category: String,
        color: String,
    },
    /// List catalog rows, optionally filtered
    ListItems {
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
    /// Pair a catalogued item with items of another category
    SuggestOutfits {
        base_url: String,
        pair_category: String,
    },
    /// Copy a top and bottom into a named outfit folder
    SaveOutfit {
        name: String,
        top_url: String,
        bottom_url: String,
    },
    /// List saved outfits
    ListOutfits,
    /// Remove a saved outfit
    DeleteOutfit {
        name: String,
    },
}

impl WardrobeCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(WardrobeCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ProcessImage { .. } => "Matte, shadow and classify an image, storing opaque and transparent renditions",
            Self::DeleteImage { .. } => "Delete both renditions of an image and drop it from the catalog",
            Self::AddItem { .. } => "Append an item to the clothing catalog",
            Self::ListItems { .. } => "List catalogued items filtered by category and color",
            Self::SuggestOutfits { .. } => "Suggest outfits pairing an item with every item of another category",
            Self::SaveOutfit { .. } => "Save a top and bottom under a named outfit folder",
            Self::ListOutfits => "List saved outfit folders",
            Self::DeleteOutfit { .. } => "Delete a saved outfit folder",
        }
    }
}

/// What a [`WardrobeCommand`] produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "result", rename_all = "snake_case")]
pub enum CommandOutput {
    Processed(ProcessedUpload),
    Deleted(DeletedImage),
    ItemAdded(CatalogEntry),
    Items(Vec<CatalogEntry>),
    Pairings(Vec<OutfitPairing>),
    OutfitSaved(SavedOutfit),
    Outfits(Vec<OutfitBundle>),
    OutfitDeleted { name: String, existed: bool },
}

impl Wardrobe {
    /// Command-based entry point, used by scripts and the CLI
    pub async fn execute(&self, command: WardrobeCommand) -> Result<CommandOutput> {
        debug!(command = %command, "executing");

        let output = match command {
            WardrobeCommand::ProcessImage { path } => CommandOutput::Processed(self.process_file(path).await?),
            WardrobeCommand::DeleteImage { image_url } => CommandOutput::Deleted(self.delete_image(&image_url)?),
            WardrobeCommand::AddItem {
                image_url,
                category,
                color,
            } => CommandOutput::ItemAdded(self.add_item(&image_url, &category, &color)?),
            WardrobeCommand::ListItems { category, color } => {
                CommandOutput::Items(self.list_items(category.as_deref(), color.as_deref())?)
            }
            WardrobeCommand::SuggestOutfits {
                base_url,
                pair_category,
            } => CommandOutput::Pairings(self.suggest_outfits(&base_url, &pair_category)?),
            WardrobeCommand::SaveOutfit {
                name,
                top_url,
                bottom_url,
            } => CommandOutput::OutfitSaved(self.save_outfit(&name, &top_url, &bottom_url)?),
            WardrobeCommand::ListOutfits => CommandOutput::Outfits(self.list_outfits()?),
            WardrobeCommand::DeleteOutfit { name } => {
                let existed = self.delete_outfit(&name)?;
                CommandOutput::OutfitDeleted { name, existed }
            }
        };
        Ok(output)
    }

    /// Run commands in order, stopping at the first failure
    pub async fn execute_all(&self, commands: Vec<WardrobeCommand>) -> Result<Vec<CommandOutput>> {
        let mut outputs = Vec::with_capacity(commands.len());
        for command in commands {
            outputs.push(self.execute(command).await?);
        }
        Ok(outputs)
    }
}
