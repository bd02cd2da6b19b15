//! Core entities and the relationship vocabulary.
//!
//! `RelationGroup` is the closed primary vocabulary (§3); `AmbiguousGroup` is
//! the second vocabulary emitted only by the [`crate::inference`] engine when
//! a composed edge is consistent with more than one primary group.

use std::fmt;

/// Opaque patient identifier (MRN).
pub type PatientId = String;

/// A patient record as loaded from the patient table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub mrn: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub zip: String,
}

/// A single emergency-contact entry: `owner` lists `ec_*` as a contact with
/// the declared relationship `declared_rel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcEntry {
    pub owner: PatientId,
    pub ec_first_name: String,
    pub ec_last_name: String,
    pub ec_phone: String,
    pub ec_zip: String,
    pub declared_rel: String,
}

/// Demographic record: birth year and sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demographic {
    pub birth_year: i32,
    pub sex: Sex,
}

/// Biological sex as recorded in the demographics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    F,
    M,
}

impl Sex {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.chars().next()?.to_ascii_uppercase() {
            'F' => Some(Sex::F),
            'M' => Some(Sex::M),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::F => write!(f, "F"),
            Sex::M => write!(f, "M"),
        }
    }
}

/// The closed primary relationship vocabulary (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationGroup {
    Parent,
    Child,
    Sibling,
    Spouse,
    AuntUncle,
    NephewNiece,
    Cousin,
    Grandparent,
    Grandchild,
    GrandauntGranduncle,
    GrandnephewGrandniece,
    GreatGrandparent,
    GreatGrandchild,
    GreatGreatGrandparent,
    GreatGreatGrandchild,
    FirstCousinOnceRemoved,
    GreatGrandauntGranduncle,
    GreatGrandnephewGrandniece,
}

impl RelationGroup {
    pub const ALL: [RelationGroup; 18] = [
        RelationGroup::Parent,
        RelationGroup::Child,
        RelationGroup::Sibling,
        RelationGroup::Spouse,
        RelationGroup::AuntUncle,
        RelationGroup::NephewNiece,
        RelationGroup::Cousin,
        RelationGroup::Grandparent,
        RelationGroup::Grandchild,
        RelationGroup::GrandauntGranduncle,
        RelationGroup::GrandnephewGrandniece,
        RelationGroup::GreatGrandparent,
        RelationGroup::GreatGrandchild,
        RelationGroup::GreatGreatGrandparent,
        RelationGroup::GreatGreatGrandchild,
        RelationGroup::FirstCousinOnceRemoved,
        RelationGroup::GreatGrandauntGranduncle,
        RelationGroup::GreatGrandnephewGrandniece,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationGroup::Parent => "Parent",
            RelationGroup::Child => "Child",
            RelationGroup::Sibling => "Sibling",
            RelationGroup::Spouse => "Spouse",
            RelationGroup::AuntUncle => "Aunt/Uncle",
            RelationGroup::NephewNiece => "Nephew/Niece",
            RelationGroup::Cousin => "Cousin",
            RelationGroup::Grandparent => "Grandparent",
            RelationGroup::Grandchild => "Grandchild",
            RelationGroup::GrandauntGranduncle => "Grandaunt/Granduncle",
            RelationGroup::GrandnephewGrandniece => "Grandnephew/Grandniece",
            RelationGroup::GreatGrandparent => "Great-grandparent",
            RelationGroup::GreatGrandchild => "Great-grandchild",
            RelationGroup::GreatGreatGrandparent => "Great-great-grandparent",
            RelationGroup::GreatGreatGrandchild => "Great-great-grandchild",
            RelationGroup::FirstCousinOnceRemoved => "First cousin once removed",
            RelationGroup::GreatGrandauntGranduncle => "Great-grandaunt/Great-granduncle",
            RelationGroup::GreatGrandnephewGrandniece => "Great-grandnephew/Great-grandniece",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        RelationGroup::ALL.iter().copied().find(|g| g.as_str() == s)
    }

    /// The declared opposite used for directional inversion (§3 Opposites).
    ///
    /// Sibling, Spouse and Cousin are self-opposite. Generations beyond what
    /// §3 spells out explicitly (great-great-*, first-cousin-once-removed,
    /// great-grandaunt/-nephew) extend the same up/down pairing; see
    /// DESIGN.md for the open-question resolution.
    pub fn opposite(&self) -> Option<RelationGroup> {
        use RelationGroup::*;
        Some(match self {
            Parent => Child,
            Child => Parent,
            Sibling => Sibling,
            Spouse => Spouse,
            AuntUncle => NephewNiece,
            NephewNiece => AuntUncle,
            Cousin => Cousin,
            Grandparent => Grandchild,
            Grandchild => Grandparent,
            GrandauntGranduncle => GrandnephewGrandniece,
            GrandnephewGrandniece => GrandauntGranduncle,
            GreatGrandparent => GreatGrandchild,
            GreatGrandchild => GreatGrandparent,
            GreatGreatGrandparent => GreatGreatGrandchild,
            GreatGreatGrandchild => GreatGreatGrandparent,
            FirstCousinOnceRemoved => FirstCousinOnceRemoved,
            GreatGrandauntGranduncle => GreatGrandnephewGrandniece,
            GreatGrandnephewGrandniece => GreatGrandauntGranduncle,
        })
    }
}

impl fmt::Display for RelationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The second vocabulary: labels produced only by composition, each
/// consistent with two or more primary groups (§3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AmbiguousGroup {
    ParentOrParentInLaw,
    ParentOrAuntUncle,
    SiblingOrSiblingInLaw,
    SiblingOrCousin,
    ChildOrNephewNiece,
    ChildOrChildInLaw,
    NephewNieceOrInLaw,
    GrandparentOrGrandparentInLaw,
    GrandchildOrGrandchildInLaw,
    GrandnephewGrandnieceOrInLaw,
    GrandauntGranduncleOrInLaw,
    GreatGrandparentOrInLaw,
    GreatGrandchildOrInLaw,
}

impl AmbiguousGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbiguousGroup::ParentOrParentInLaw => "Parent/Parent-in-law",
            AmbiguousGroup::ParentOrAuntUncle => "Parent/Aunt/Uncle",
            AmbiguousGroup::SiblingOrSiblingInLaw => "Sibling/Sibling-in-law",
            AmbiguousGroup::SiblingOrCousin => "Sibling/Cousin",
            AmbiguousGroup::ChildOrNephewNiece => "Child/Nephew/Niece",
            AmbiguousGroup::ChildOrChildInLaw => "Child/Child-in-law",
            AmbiguousGroup::NephewNieceOrInLaw => "Nephew/Niece/Nephew-in-law/Niece-in-law",
            AmbiguousGroup::GrandparentOrGrandparentInLaw => "Grandparent/Grandparent-in-law",
            AmbiguousGroup::GrandchildOrGrandchildInLaw => "Grandchild/Grandchild-in-law",
            AmbiguousGroup::GrandnephewGrandnieceOrInLaw => {
                "Grandnephew/Grandniece/Grandnephew-in-law/Grandniece-in-law"
            }
            AmbiguousGroup::GrandauntGranduncleOrInLaw => {
                "Grandaunt/Granduncle/Grandaunt-in-law/Granduncle-in-law"
            }
            AmbiguousGroup::GreatGrandparentOrInLaw => "Great-grandparent/Great-grandparent-in-law",
            AmbiguousGroup::GreatGrandchildOrInLaw => "Great-grandchild/Great-grandchild-in-law",
        }
    }

    /// Constituent primary groups this ambiguous label could resolve to, in
    /// priority order (§4.5).
    pub fn constituents(&self) -> &'static [RelationGroup] {
        use RelationGroup::*;
        match self {
            AmbiguousGroup::ParentOrParentInLaw => &[Parent],
            AmbiguousGroup::ParentOrAuntUncle => &[Parent, AuntUncle],
            AmbiguousGroup::SiblingOrSiblingInLaw => &[Sibling],
            AmbiguousGroup::SiblingOrCousin => &[Sibling, Cousin],
            AmbiguousGroup::ChildOrNephewNiece => &[Child, NephewNiece],
            AmbiguousGroup::ChildOrChildInLaw => &[Child],
            AmbiguousGroup::NephewNieceOrInLaw => &[NephewNiece],
            AmbiguousGroup::GrandparentOrGrandparentInLaw => &[Grandparent],
            AmbiguousGroup::GrandchildOrGrandchildInLaw => &[Grandchild],
            AmbiguousGroup::GrandnephewGrandnieceOrInLaw => &[GrandnephewGrandniece],
            AmbiguousGroup::GrandauntGranduncleOrInLaw => &[GrandauntGranduncle],
            AmbiguousGroup::GreatGrandparentOrInLaw => &[GreatGrandparent],
            AmbiguousGroup::GreatGrandchildOrInLaw => &[GreatGrandchild],
        }
    }
}

impl fmt::Display for AmbiguousGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A label attached to an edge during closure: either a primary group or an
/// ambiguous composed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Primary(RelationGroup),
    Ambiguous(AmbiguousGroup),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Primary(g) => write!(f, "{g}"),
            Label::Ambiguous(a) => write!(f, "{a}"),
        }
    }
}

impl From<RelationGroup> for Label {
    fn from(g: RelationGroup) -> Self {
        Label::Primary(g)
    }
}

impl From<AmbiguousGroup> for Label {
    fn from(a: AmbiguousGroup) -> Self {
        Label::Ambiguous(a)
    }
}
