//! Intent router
//!
//! Pure table from [`ActionTag`] to the workflow the presentation layer
//! should offer. `generalAnswer` and unknown tags route nowhere.

use serde::{Deserialize, Serialize};

use super::types::ActionTag;
use crate::language::Language;

/// Navigation target offered alongside a chat answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    FirGenerator,
    NoticeGenerator,
    CaseSummary,
    DocumentAnalyzer,
    LawFinder,
    Timeline,
    Rights,
    Dictionary,
}

impl Workflow {
    /// Button label for the navigation affordance
    pub fn label(self, language: Language) -> &'static str {
        match self {
            Workflow::FirGenerator => language.pick("Go to FIR Generator", "FIR जनरेटर पर जाएं"),
            Workflow::NoticeGenerator => language.pick("Go to Notice Generator", "नोटिस जनरेटर पर जाएं"),
            Workflow::CaseSummary => language.pick("Go to Case Summary", "केस सारांश पर जाएं"),
            Workflow::DocumentAnalyzer => {
                language.pick("Go to Document Analyzer", "दस्तावेज़ विश्लेषक पर जाएं")
            }
            Workflow::LawFinder => language.pick("Go to Law Finder", "कानून खोजक पर जाएं"),
            Workflow::Timeline => language.pick("View Timeline", "समयरेखा देखें"),
            Workflow::Rights => language.pick("Read Rights", "अधिकार पढ़ें"),
            Workflow::Dictionary => language.pick("Open Dictionary", "शब्दकोश खोलें"),
        }
    }
}

/// Map an action to its workflow, `None` for no navigation
pub fn route(action: ActionTag) -> Option<Workflow> {
    match action {
        ActionTag::GenerateFir => Some(Workflow::FirGenerator),
        ActionTag::GenerateNotice => Some(Workflow::NoticeGenerator),
        ActionTag::SummarizeCase => Some(Workflow::CaseSummary),
        ActionTag::AnalyzeDocument => Some(Workflow::DocumentAnalyzer),
        ActionTag::OffenceChecker => Some(Workflow::LawFinder),
        ActionTag::TimelineInfo => Some(Workflow::Timeline),
        ActionTag::RightsInfo => Some(Workflow::Rights),
        ActionTag::DictionaryLookup => Some(Workflow::Dictionary),
        ActionTag::GeneralAnswer => None,
    }
}

/// Route a raw wire string; unknown tags are a no-op
pub fn route_tag(tag: &str) -> Option<Workflow> {
    ActionTag::from_wire(tag).and_then(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_tag_routes() {
        let targets: HashSet<_> = ActionTag::ALL.into_iter().filter_map(route).collect();
        // Eight workflows, each reached by exactly one tag
        assert_eq!(targets.len(), 8);
        assert_eq!(route(ActionTag::GeneralAnswer), None);
        assert_eq!(route(ActionTag::OffenceChecker), Some(Workflow::LawFinder));
    }

    #[test]
    fn test_unknown_tags_are_noop() {
        for tag in ["", "generalAnswer", "bookHearing", "GENERATEFIR", "generate_fir"] {
            assert_eq!(route_tag(tag), None, "{:?}", tag);
        }
        assert_eq!(route_tag("generateFIR"), Some(Workflow::FirGenerator));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Workflow::FirGenerator.label(Language::En), "Go to FIR Generator");
        assert_eq!(Workflow::FirGenerator.label(Language::Hi), "FIR जनरेटर पर जाएं");
    }
}
