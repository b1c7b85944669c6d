//! Relationship-graph scoring: shared parents, spouses, children.

use std::collections::HashSet;

use crate::model::{FamilyProvider, PersonId, PersonProvider};

/// One hop of relationship data resolved for a single person: their
/// parents (from families-as-child), spouses, and children (both from
/// families-as-spouse).
struct PersonRelations {
    parents: HashSet<PersonId>,
    spouses: HashSet<PersonId>,
    children: HashSet<PersonId>,
}

fn relations_for<P: PersonProvider, F: FamilyProvider>(person: &P, families: &F) -> PersonRelations {
    let mut parents = HashSet::new();
    for &family_id in person.families_as_child() {
        if let Some(family) = families.family(family_id) {
            if let Some(husband) = family.husband {
                parents.insert(husband);
            }
            if let Some(wife) = family.wife {
                parents.insert(wife);
            }
        }
    }

    let mut spouses = HashSet::new();
    let mut children = HashSet::new();
    for &family_id in person.families_as_spouse() {
        if let Some(family) = families.family(family_id) {
            if let Some(husband) = family.husband {
                if husband != person.stable_id() {
                    spouses.insert(husband);
                }
            }
            if let Some(wife) = family.wife {
                if wife != person.stable_id() {
                    spouses.insert(wife);
                }
            }
            children.extend(family.children.iter().copied());
        }
    }

    PersonRelations {
        parents,
        spouses,
        children,
    }
}

/// Score relationship overlap between two persons.
///
/// Only ever descends one hop from each person (parents, spouses,
/// children); never walks the family graph transitively, so a cycle
/// between families and their members can't trap this in a traversal.
pub fn score<P: PersonProvider, F: FamilyProvider>(a: &P, b: &P, families: &F) -> f64 {
    let ra = relations_for(a, families);
    let rb = relations_for(b, families);

    let common_parents = ra.parents.intersection(&rb.parents).count();
    let common_spouses = ra.spouses.intersection(&rb.spouses).count();
    let common_children = ra.children.intersection(&rb.children).count();

    let mut total = 0.0;
    total += match common_parents {
        0 => 0.0,
        1 => 0.1,
        _ => 0.2,
    };
    if common_spouses > 0 {
        total += 0.2;
    }
    total += (0.1 * common_children as f64).min(0.3);

    if total == 0.0 {
        return 0.0;
    }

    (total / 0.7).min(1.0)
}
