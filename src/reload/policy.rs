//! Which filesystem events count as "something changed".

use notify::event::ModifyKind;
use notify::EventKind;
use serde::{Deserialize, Serialize};

/// Reload policy for watched filesystem events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReloadTrigger {
    /// Content or metadata modifications only. Renames, creations and
    /// deletions are ignored.
    #[default]
    Modify,
    /// Any creation, modification (including renames) or removal.
    Any,
}

impl ReloadTrigger {
    /// Whether an event of this kind should reload connected pages.
    pub fn qualifies(self, kind: &EventKind) -> bool {
        match self {
            ReloadTrigger::Modify => {
                matches!(kind, EventKind::Modify(modify) if !matches!(modify, ModifyKind::Name(_)))
            }
            ReloadTrigger::Any => matches!(
                kind,
                EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn test_modify_policy() {
        let policy = ReloadTrigger::Modify;
        assert!(policy.qualifies(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(policy.qualifies(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime))));
        assert!(policy.qualifies(&EventKind::Modify(ModifyKind::Any)));

        assert!(!policy.qualifies(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))));
        assert!(!policy.qualifies(&EventKind::Create(CreateKind::File)));
        assert!(!policy.qualifies(&EventKind::Remove(RemoveKind::File)));
        assert!(!policy.qualifies(&EventKind::Access(AccessKind::Any)));
    }

    #[test]
    fn test_any_policy() {
        let policy = ReloadTrigger::Any;
        assert!(policy.qualifies(&EventKind::Create(CreateKind::File)));
        assert!(policy.qualifies(&EventKind::Remove(RemoveKind::Folder)));
        assert!(policy.qualifies(&EventKind::Modify(ModifyKind::Name(RenameMode::From))));
        assert!(!policy.qualifies(&EventKind::Access(AccessKind::Any)));
        assert!(!policy.qualifies(&EventKind::Other));
    }
}
