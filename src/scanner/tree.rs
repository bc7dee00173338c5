use crate::{
    layout::MARKETPLACE_PREFIX,
    types::{DiscoveredSkill, SkillTree},
};

/// Index of the repository name in a marketplace skill's path parts
/// (`plugins/marketplaces/<repo>/...`).
const REPO_SEGMENT: usize = 2;

/// Splits discovered skills into local ones and marketplace ones keyed by repository.
///
/// A skill is grouped when its id lies under `plugins/marketplaces/` and it has a
/// repository segment. Everything else, including a marker sitting directly in
/// the marketplaces directory, is listed with the local skills so no skill is lost.
pub fn build_skill_tree(skills: &[DiscoveredSkill]) -> SkillTree {
    let mut tree = SkillTree::default();

    for skill in skills {
        match repo_key(skill) {
            Some(repo) => tree.plugins.entry(repo.to_string()).or_default().push(skill.clone()),
            None => tree.skills.push(skill.clone()),
        }
    }

    tree
}

fn repo_key(skill: &DiscoveredSkill) -> Option<&str> {
    if !skill.id.starts_with(MARKETPLACE_PREFIX) {
        return None;
    }
    skill.path_parts.get(REPO_SEGMENT).map(String::as_str)
}
