//! Inference Engine (§4.4): the composition table and the fixed-point
//! closure over the cleaned edge set.

use crate::cleaner::CleanedEdge;
use crate::model::{AmbiguousGroup, Label, PatientId, RelationGroup};
use std::collections::{BTreeMap, BTreeSet};

/// `M : src ↦ (dst ↦ set of labels)`, the adjacency the engine closes over.
pub type EdgeMap = BTreeMap<PatientId, BTreeMap<PatientId, BTreeSet<Label>>>;

/// Inserts `(src, label, dst)` into `map`, enforcing the self-edge guard
/// (§4.4). Returns `true` if the label was newly added.
pub fn insert_label(map: &mut EdgeMap, src: &PatientId, label: Label, dst: &PatientId) -> bool {
    if src == dst {
        return false;
    }
    map.entry(src.clone())
        .or_default()
        .entry(dst.clone())
        .or_default()
        .insert(label)
}

/// Seeds the edge map from the cleaned candidate edges (`E₀`).
pub fn build_initial_state(cleaned: &[CleanedEdge]) -> EdgeMap {
    let mut map = EdgeMap::new();
    for edge in cleaned {
        insert_label(&mut map, &edge.src, Label::Primary(edge.declared_rel), &edge.dst);
    }
    map
}

/// The fixed composition function: "the L2 of my L1 is my L3" (§4.4).
/// Missing cells mean no inference is added.
pub fn compose(l1: RelationGroup, l2: RelationGroup) -> Option<Label> {
    use AmbiguousGroup::*;
    use RelationGroup::*;
    let primary = |g: RelationGroup| Some(Label::Primary(g));
    let ambiguous = |a: AmbiguousGroup| Some(Label::Ambiguous(a));

    match (l1, l2) {
        (Parent, Parent) => primary(Grandparent),
        (Parent, Child) => primary(Sibling),
        (Parent, Sibling) => primary(AuntUncle),
        (Parent, AuntUncle) => primary(GrandauntGranduncle),
        (Parent, NephewNiece) => primary(Cousin),
        (Parent, Grandparent) => primary(GreatGrandparent),
        (Parent, Grandchild) => ambiguous(ChildOrNephewNiece),

        (Child, Parent) => primary(Spouse),
        (Child, Child) => primary(Grandchild),
        (Child, Sibling) => primary(Child),
        (Child, AuntUncle) => ambiguous(SiblingOrSiblingInLaw),
        (Child, NephewNiece) => ambiguous(GrandchildOrGrandchildInLaw),
        (Child, Grandparent) => ambiguous(ParentOrParentInLaw),
        (Child, Grandchild) => primary(GreatGrandchild),

        (Sibling, Parent) => primary(Parent),
        (Sibling, Child) => primary(NephewNiece),
        (Sibling, Sibling) => primary(Sibling),
        (Sibling, AuntUncle) => primary(AuntUncle),
        (Sibling, NephewNiece) => ambiguous(ChildOrNephewNiece),
        (Sibling, Grandparent) => primary(Grandparent),
        (Sibling, Grandchild) => primary(GrandnephewGrandniece),

        (AuntUncle, Parent) => ambiguous(GrandparentOrGrandparentInLaw),
        (AuntUncle, Child) => primary(Cousin),
        (AuntUncle, Sibling) => ambiguous(ParentOrAuntUncle),
        (AuntUncle, AuntUncle) => ambiguous(GrandauntGranduncleOrInLaw),
        (AuntUncle, NephewNiece) => ambiguous(SiblingOrCousin),
        (AuntUncle, Grandparent) => ambiguous(GreatGrandparentOrInLaw),
        (AuntUncle, Grandchild) => primary(FirstCousinOnceRemoved),

        (NephewNiece, Parent) => ambiguous(SiblingOrSiblingInLaw),
        (NephewNiece, Child) => primary(GrandnephewGrandniece),
        (NephewNiece, Sibling) => ambiguous(NephewNieceOrInLaw),
        (NephewNiece, AuntUncle) => ambiguous(SiblingOrSiblingInLaw),
        (NephewNiece, NephewNiece) => ambiguous(GrandnephewGrandnieceOrInLaw),
        (NephewNiece, Grandparent) => ambiguous(ParentOrParentInLaw),
        (NephewNiece, Grandchild) => primary(GreatGrandnephewGrandniece),

        (Grandparent, Parent) => primary(GreatGrandparent),
        (Grandparent, Child) => ambiguous(ParentOrAuntUncle),
        (Grandparent, Sibling) => primary(GrandauntGranduncle),
        (Grandparent, AuntUncle) => primary(GreatGrandauntGranduncle),
        (Grandparent, NephewNiece) => primary(FirstCousinOnceRemoved),
        (Grandparent, Grandparent) => primary(GreatGreatGrandparent),
        (Grandparent, Grandchild) => ambiguous(SiblingOrCousin),

        (Grandchild, Parent) => ambiguous(ChildOrChildInLaw),
        (Grandchild, Child) => primary(GreatGrandchild),
        (Grandchild, Sibling) => primary(Grandchild),
        (Grandchild, AuntUncle) => ambiguous(ChildOrChildInLaw),
        (Grandchild, NephewNiece) => ambiguous(GreatGrandchildOrInLaw),
        (Grandchild, Grandparent) => primary(Spouse),
        (Grandchild, Grandchild) => primary(GreatGreatGrandchild),

        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ClosureStats {
    pub passes: usize,
    pub labels_inserted: usize,
}

/// Iterates the composition rule over every pair of outgoing edges at each
/// node until a full pass adds zero new triples (§4.4 Termination).
pub fn close(map: &mut EdgeMap) -> ClosureStats {
    let mut stats = ClosureStats::default();
    loop {
        // Snapshot outgoing edges per node so we can read `M[b]` while
        // accumulating inserts into a separate buffer, then apply them —
        // mutating `map` mid-scan would let a pass see its own inserts and
        // make termination pass-count dependent on iteration order.
        let snapshot: Vec<(PatientId, PatientId, Label)> = map
            .iter()
            .flat_map(|(a, dsts)| {
                dsts.iter()
                    .flat_map(move |(b, labels)| labels.iter().map(move |l| (a.clone(), b.clone(), *l)))
            })
            .collect();

        let mut to_insert: Vec<(PatientId, Label, PatientId)> = Vec::new();
        for (a, b, l1) in &snapshot {
            let l1 = match l1 {
                Label::Primary(g) => *g,
                Label::Ambiguous(_) => continue, // only primary labels compose further
            };
            let Some(b_edges) = map.get(b) else { continue };
            for (c, labels_bc) in b_edges {
                if a == c {
                    continue;
                }
                for l2 in labels_bc {
                    let l2 = match l2 {
                        Label::Primary(g) => *g,
                        Label::Ambiguous(_) => continue,
                    };
                    if let Some(label) = compose(l1, l2) {
                        to_insert.push((a.clone(), label, c.clone()));
                    }
                }
            }
        }

        let mut inserted_this_pass = 0;
        for (a, label, c) in to_insert {
            if insert_label(map, &a, label, &c) {
                inserted_this_pass += 1;
            }
        }
        stats.passes += 1;
        stats.labels_inserted += inserted_this_pass;
        if inserted_this_pass == 0 {
            break;
        }
    }
    stats
}
