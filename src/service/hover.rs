//! Hover (quick info).

use tower_lsp_server::ls_types::{Location, Position, Uri};

use super::LanguageService;

/// A hover answer with the resolved span as a full location, because the
/// quick-info span can land in the companion file of the hovered document.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
    pub display: String,
    pub documentation: Option<String>,
    pub location: Location,
}

impl LanguageService {
    pub fn hover(&self, uri: &Uri, position: Position) -> Option<HoverInfo> {
        let target = self.resolve(uri)?;
        let offset = target.offset_at(position)?;
        let t = target.cached.table().to_synthetic(&target.path, offset)?;

        let info = self.analyzer().quick_info_at(target.synthetic_path(), t)?;
        let span = target.cached.table().to_original(info.start, info.end)?;
        if span.synthetic_only {
            return None;
        }

        Some(HoverInfo {
            display: info.display,
            documentation: info.documentation,
            location: self.location_for(&span.path, span.start, span.end)?,
        })
    }
}
