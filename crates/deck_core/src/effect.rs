use crate::history::ChangeData;
use crate::parser::PresentationMetadata;

/// Side effects requested by `update`; the platform layer carries them out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Session title or expected slide count changed.
    MetadataChanged(PresentationMetadata),
    /// A slide now has both its thinking and its markup.
    SlideReady { slide_number: u32 },
    /// Write `data` onto the element on the slide's render surface.
    ApplyChange {
        slide_id: String,
        element_id: String,
        data: ChangeData,
    },
}
